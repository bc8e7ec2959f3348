//! Timestamp rendering pinned to a single civil time zone.
//!
//! Stored timestamps come back from the store as text. Naive values are taken
//! to already be local to the display zone; offset-carrying values are
//! converted into it. Nothing in here fails: unreadable input is echoed back.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Display format shared by every reminder body
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Render an instant as `YYYY-MM-DD HH:MM <abbrev>`
pub fn format_instant(instant: &DateTime<Tz>) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

/// Render a stored reminder timestamp in the display zone.
///
/// `None` and blank values render as an empty string.
pub fn format_stored_timestamp(value: Option<&str>, tz: Tz) -> String {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return String::new(),
    };

    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return format_instant(&aware.with_timezone(&tz));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| format_instant(&local))
        .unwrap_or_else(|| raw.to_string())
}

/// Combine a stored calendar date and time-of-day into a display string.
///
/// Falls back to `"{date} {time} {zone_label}"` when the pair does not parse.
pub fn format_date_time(date: &str, time: &str, tz: Tz, zone_label: &str) -> String {
    parse_date_time(date, time, tz)
        .map(|local| format_instant(&local))
        .unwrap_or_else(|| format!("{} {} {}", date.trim(), time.trim(), zone_label))
}

fn parse_date_time(date: &str, time: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M"))
        .ok()?;
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    #[test]
    fn test_format_instant() {
        let dt = Kolkata.with_ymd_and_hms(2025, 3, 14, 9, 5, 42).unwrap();
        assert_eq!(format_instant(&dt), "2025-03-14 09:05 IST");
    }

    #[test]
    fn test_naive_timestamp_is_assumed_local() {
        assert_eq!(
            format_stored_timestamp(Some("2025-03-14 18:30:00"), Kolkata),
            "2025-03-14 18:30 IST"
        );
        assert_eq!(
            format_stored_timestamp(Some("2025-03-14 18:30"), Kolkata),
            "2025-03-14 18:30 IST"
        );
    }

    #[test]
    fn test_aware_timestamp_is_converted() {
        assert_eq!(
            format_stored_timestamp(Some("2025-03-14T13:00:00Z"), Kolkata),
            "2025-03-14 18:30 IST"
        );
    }

    #[test]
    fn test_missing_timestamp_renders_empty() {
        assert_eq!(format_stored_timestamp(None, Kolkata), "");
        assert_eq!(format_stored_timestamp(Some("  "), Kolkata), "");
    }

    #[test]
    fn test_unparseable_timestamp_echoes_raw() {
        assert_eq!(
            format_stored_timestamp(Some("next tuesday"), Kolkata),
            "next tuesday"
        );
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(
            format_date_time("2025-03-14", "18:30", Kolkata, "IST"),
            "2025-03-14 18:30 IST"
        );
        assert_eq!(
            format_date_time("2025-03-14", "18:30:00", Kolkata, "IST"),
            "2025-03-14 18:30 IST"
        );
    }

    #[test]
    fn test_format_date_time_fallback() {
        assert_eq!(
            format_date_time("14/03/2025", "half past six", Kolkata, "IST"),
            "14/03/2025 half past six IST"
        );
        assert_eq!(
            format_date_time("2025-03-14", "25:99", Kolkata, "IST"),
            "2025-03-14 25:99 IST"
        );
    }
}
