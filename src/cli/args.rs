// cli/args.rs — Command-line surface.

use clap::{Args, Parser, Subcommand, ValueEnum};

use gameshelf_lib::controllers::GameForm;
use gameshelf_lib::models::{GamePlatform, GameStatus};
use gameshelf_lib::pipeline::aggregate::GenreOrder;
use gameshelf_lib::pipeline::filter::{CollectionFilter, PlayedFilter};
use gameshelf_lib::Result;

#[derive(Parser)]
#[command(name = "gameshelf")]
#[command(about = "Track, browse and import your video game library", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend API root; overrides GAMESHELF_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Keep view preferences in memory only.
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// In-progress, recently completed, favorites and backlog at a glance.
    Dashboard,

    /// Browse the catalog.
    List(ListArgs),

    /// Show one game.
    Show { id: i64 },

    /// Add a game by hand.
    Add(GameFields),

    /// Edit a game; only the given fields change.
    Edit {
        id: i64,
        #[command(flatten)]
        fields: GameFields,
    },

    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Toggle the favorite flag.
    Favorite { id: i64 },

    /// Set a game's status (not-started, in-progress, completed, on-hold, dropped).
    Status { id: i64, status: String },

    /// Move a backlog game to "currently playing".
    Start { id: i64 },

    /// Pull playtime and achievements from Steam.
    Sync { id: i64 },

    /// Refresh a game's details from IGDB.
    Refresh { id: i64 },

    /// Search IGDB, or show one of its curated lists.
    Search {
        query: Option<String>,
        #[arg(long, value_enum)]
        tab: Option<FeedArg>,
    },

    /// Import an IGDB game into the catalog.
    Import { metadata_id: i64 },

    /// Browse the Steam library.
    Library(LibraryArgs),

    /// Add a Steam library game to the catalog.
    LibraryImport { app_id: String },

    /// Playtime statistics for the Steam library.
    LibraryStats {
        /// Leave out games with at least this many hours.
        #[arg(long)]
        cap_hours: Option<u32>,
    },
}

#[derive(Args, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub platform: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub favorites: bool,
    /// title, release-year, rating, playtime, status, date-added
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long)]
    pub desc: bool,
    /// One-based page number.
    #[arg(long, default_value = "1")]
    pub page: usize,
    /// 6, 12, 24 or 48; remembered for next time.
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Switch between grid and list layout; remembered for next time.
    #[arg(long)]
    pub toggle_view: bool,
    /// Print the summary of the filtered list.
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Default)]
pub struct LibraryArgs {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_enum, default_value = "all")]
    pub played: PlayedArg,
    #[arg(long, value_enum, default_value = "all")]
    pub collection: CollectionArg,
    /// Repeatable; a game matches if it has any of the tags.
    #[arg(long = "genre")]
    pub genres: Vec<String>,
    /// name, playtime or recent. Names default to ascending, numbers to descending.
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,
    #[arg(long)]
    pub desc: bool,
    #[arg(long, default_value = "1")]
    pub page: usize,
    /// Switch between grid and list layout; remembered for next time.
    #[arg(long)]
    pub toggle_view: bool,
    /// Print genre statistics instead of the game list.
    #[arg(long)]
    pub genre_stats: bool,
    #[arg(long, value_enum, default_value = "count")]
    pub genre_order: GenreOrderArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FeedArg {
    Popular,
    Recent,
    Upcoming,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum PlayedArg {
    #[default]
    All,
    Played,
    Unplayed,
}

impl From<PlayedArg> for PlayedFilter {
    fn from(arg: PlayedArg) -> Self {
        match arg {
            PlayedArg::All => PlayedFilter::All,
            PlayedArg::Played => PlayedFilter::Played,
            PlayedArg::Unplayed => PlayedFilter::Unplayed,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum CollectionArg {
    #[default]
    All,
    In,
    NotIn,
}

impl From<CollectionArg> for CollectionFilter {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::All => CollectionFilter::All,
            CollectionArg::In => CollectionFilter::InCollection,
            CollectionArg::NotIn => CollectionFilter::NotInCollection,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum GenreOrderArg {
    #[default]
    Count,
    Playtime,
    Name,
}

impl From<GenreOrderArg> for GenreOrder {
    fn from(arg: GenreOrderArg) -> Self {
        match arg {
            GenreOrderArg::Count => GenreOrder::Count,
            GenreOrderArg::Playtime => GenreOrder::Playtime,
            GenreOrderArg::Name => GenreOrder::Name,
        }
    }
}

/// Form fields shared by `add` and `edit`.
#[derive(Args, Default)]
pub struct GameFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub developer: Option<String>,
    #[arg(long)]
    pub publisher: Option<String>,
    #[arg(long)]
    pub release_year: Option<i32>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub cover_url: Option<String>,
    #[arg(long)]
    pub platform: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub rating: Option<i32>,
    #[arg(long)]
    pub playtime: Option<f64>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub favorite: Option<bool>,
}

impl GameFields {
    /// Overwrite the form fields that were given on the command line.
    pub fn apply(self, form: &mut GameForm) -> Result<()> {
        if let Some(v) = self.title { form.title = v; }
        if let Some(v) = self.description { form.description = v; }
        if let Some(v) = self.developer { form.developer = v; }
        if let Some(v) = self.publisher { form.publisher = v; }
        if let Some(v) = self.release_year { form.release_year = Some(v); }
        if let Some(v) = self.genre { form.genre = v; }
        if let Some(v) = self.cover_url { form.cover_image_url = v; }
        if let Some(v) = self.platform { form.platform = Some(v.parse::<GamePlatform>()?); }
        if let Some(v) = self.status { form.status = v.parse::<GameStatus>()?; }
        if let Some(v) = self.rating { form.rating = Some(v); }
        if let Some(v) = self.playtime { form.playtime_hours = v; }
        if let Some(v) = self.notes { form.notes = v; }
        if let Some(v) = self.favorite { form.favorite = v; }
        Ok(())
    }
}
