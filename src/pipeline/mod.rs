// pipeline/mod.rs — The client-side data-presentation pipeline.
//
//   collection ──filter──▶ subset ──sort──▶ ordered ──paginate──▶ page
//                                   └──────aggregate──────▶ stats
//
// Every stage is a pure function over slices. Nothing here touches the
// network or fails; controllers own the state and re-run the stages.

pub mod aggregate;
pub mod filter;
pub mod paginate;
pub mod sort;

pub use aggregate::{percent, CountShare};
pub use filter::{CollectionFilter, FilterCriteria, Filterable, PlayedFilter};
pub use paginate::{page_numbers, Page, PageMarker, PageState};
pub use sort::{SortDirection, SortKey, SortSpec, Sortable};

/// Filter then sort. The result is what gets paginated and aggregated.
pub fn view<T>(collection: &[T], criteria: &FilterCriteria, spec: &SortSpec) -> Vec<T>
where
    T: Filterable + Sortable + Clone,
{
    let mut rows = filter::apply(collection, criteria);
    sort::sort_in_place(&mut rows, spec);
    tracing::debug!(
        total = collection.len(),
        visible = rows.len(),
        key = ?spec.key,
        direction = ?spec.direction,
        "pipeline recomputed"
    );
    rows
}
