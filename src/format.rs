// format.rs — Human-readable renderings shared by the screens.

use chrono::NaiveDateTime;

/// Catalog playtime, stored in hours: `0h`, `45m`, `12h`.
pub fn format_hours(hours: f64) -> String {
    if hours <= 0.0 || !hours.is_finite() {
        return "0h".to_string();
    }
    if hours < 1.0 {
        return format!("{}m", (hours * 60.0).round() as i64);
    }
    format!("{}h", hours.round() as i64)
}

/// Long form used on the detail screen: `3 hours`, `20 minutes`.
pub fn format_hours_long(hours: f64) -> String {
    if hours <= 0.0 || !hours.is_finite() {
        return "0 hours".to_string();
    }
    if hours < 1.0 {
        return format!("{} minutes", (hours * 60.0).round() as i64);
    }
    format!("{} hours", hours.round() as i64)
}

/// Library playtime, stored in minutes. Zero reads "Never played".
pub fn format_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "Never played".to_string();
    }
    compact_minutes(minutes, false)
}

/// Statistics-screen variant: zero reads `0h` and large hour counts get
/// thousands separators.
pub fn format_minutes_stat(minutes: i64) -> String {
    if minutes <= 0 {
        return "0h".to_string();
    }
    compact_minutes(minutes, true)
}

fn compact_minutes(minutes: i64, separators: bool) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours < 100 {
        return if mins > 0 { format!("{hours}h {mins}m") } else { format!("{hours}h") };
    }
    if separators {
        format!("{}h", thousands(hours))
    } else {
        format!("{hours}h")
    }
}

/// `1234567` → `1,234,567`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Relative "last played" label for a unix timestamp, measured from `now`.
pub fn format_last_played(rtime: i64, now: NaiveDateTime) -> String {
    match crate::dates::from_unix(rtime) {
        Some(then) => format_since(then, now),
        None => "Never".to_string(),
    }
}

/// Whole days between `then` and `now`, bucketed into days / weeks / months / years.
pub fn format_since(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let days = (now - then).num_days();
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => format!("{} weeks ago", d / 7),
        d if d < 365 => format!("{} months ago", d / 30),
        d => format!("{} years ago", d / 365),
    }
}

/// Metadata-service ratings are 0 – 100; shown on a ten-point scale.
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r.is_finite() => format!("{:.1}", r / 10.0),
        _ => "N/A".to_string(),
    }
}

/// `Fri, Mar 15, 2024`
pub fn format_date(dt: Option<NaiveDateTime>) -> String {
    dt.map(|d| d.format("%a, %b %-d, %Y").to_string()).unwrap_or_default()
}

/// `Fri, Mar 15, 2024, 3:07 PM`
pub fn format_datetime(dt: Option<NaiveDateTime>) -> String {
    dt.map(|d| d.format("%a, %b %-d, %Y, %-I:%M %p").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "Never played");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(125), "2h 5m");
        assert_eq!(format_minutes(100 * 60 + 59), "100h");
        assert_eq!(format_minutes_stat(0), "0h");
        assert_eq!(format_minutes_stat(1500 * 60), "1,500h");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(0.0), "0h");
        assert_eq!(format_hours(0.5), "30m");
        assert_eq!(format_hours(12.4), "12h");
        assert_eq!(format_hours_long(2.6), "3 hours");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(-1234567), "-1,234,567");
    }

    #[test]
    fn test_format_since_buckets() {
        let now = noon(2024, 6, 30);
        assert_eq!(format_since(now, now), "Today");
        assert_eq!(format_since(now - Duration::days(1), now), "Yesterday");
        assert_eq!(format_since(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_since(now - Duration::days(15), now), "2 weeks ago");
        assert_eq!(format_since(now - Duration::days(95), now), "3 months ago");
        assert_eq!(format_since(now - Duration::days(800), now), "2 years ago");
        assert_eq!(format_last_played(0, now), "Never");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(Some(87.46)), "8.7");
        assert_eq!(format_rating(None), "N/A");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(noon(2024, 3, 15))), "Fri, Mar 15, 2024");
        assert_eq!(format_datetime(Some(noon(2024, 3, 15))), "Fri, Mar 15, 2024, 12:00 PM");
        assert_eq!(format_date(None), "");
    }
}
