// dates.rs — Normalizing the backend's date encodings.
//
// The backend serializes timestamps either as ISO-8601 strings or as
// `[year, month, day, hour, minute, second, nanos?]` arrays (month 1-based).
// Both become a `chrono::NaiveDateTime` before anything sorts or formats them.
// chrono months are 1-based as well, so the array maps across unchanged.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

/// Format used when we send a timestamp back to the backend.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Normalize any wire encoding to a timestamp. Unknown shapes yield `None`.
pub fn normalize(value: &Value) -> Option<NaiveDateTime> {
    let parsed = match value {
        Value::Null => return None,
        Value::String(s) => parse_iso(s),
        Value::Array(parts) => from_parts(parts),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!(%value, "unrecognized date encoding, treating as absent");
    }
    parsed
}

/// Parse the string forms the backend is known to emit.
pub fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `[y, m, d]` is accepted as a date at midnight; missing time parts are zero.
fn from_parts(parts: &[Value]) -> Option<NaiveDateTime> {
    if parts.len() < 3 {
        return None;
    }
    let nums: Vec<i64> = parts.iter().map(|p| p.as_i64()).collect::<Option<_>>()?;
    let part = |i: usize| nums.get(i).copied().unwrap_or(0);

    let year = i32::try_from(part(0)).ok()?;
    let month = u32::try_from(part(1)).ok()?;
    let day = u32::try_from(part(2)).ok()?;
    let hour = u32::try_from(part(3)).ok()?;
    let minute = u32::try_from(part(4)).ok()?;
    let second = u32::try_from(part(5)).ok()?;
    let nanos = u32::try_from(part(6)).ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_nano_opt(hour, minute, second, nanos)
}

/// Unix seconds → local timestamp. Zero and negative values mean "never".
pub fn from_unix(secs: i64) -> Option<NaiveDateTime> {
    if secs <= 0 {
        return None;
    }
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.naive_local())
}

/// Serde adapter for `Option<NaiveDateTime>` fields on wire models.
///
/// Use as `#[serde(default, with = "crate::dates::wire")]`.
pub mod wire {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => s.serialize_str(&dt.format(super::ISO_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(super::normalize(&value))
    }
}
