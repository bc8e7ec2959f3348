//! Polling windows for the two reminder stages.
//!
//! Recomputed from the wall clock every iteration. There is no carried-over
//! watermark, so a window that passes while the daemon is down is not revisited.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Stored reminder timestamps use this naive-local layout, so string
/// comparison in the store orders them correctly.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// The band `[now - width, now + width]` in the display zone
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub now: DateTime<Tz>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl TimeWindow {
    pub fn around(now: DateTime<Tz>, half_width: Duration) -> Self {
        TimeWindow {
            now,
            start: now - half_width,
            end: now + half_width,
        }
    }

    /// Stage-1 bounds against the absolute reminder timestamp
    pub fn timestamp_bounds(&self) -> (String, String) {
        (
            self.start.format(TIMESTAMP_FORMAT).to_string(),
            self.end.format(TIMESTAMP_FORMAT).to_string(),
        )
    }

    /// Stage-2 calendar date (the date of `now`, not of the window edges)
    pub fn date(&self) -> String {
        self.now.format(DATE_FORMAT).to_string()
    }

    /// Stage-2 bounds against the time-of-day column, minute resolution
    pub fn time_of_day_bounds(&self) -> (String, String) {
        (
            self.start.format(TIME_OF_DAY_FORMAT).to_string(),
            self.end.format(TIME_OF_DAY_FORMAT).to_string(),
        )
    }

    /// Zone abbreviation used in message bodies
    pub fn zone_label(&self) -> String {
        self.now.format("%Z").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Kolkata;

    fn window_at(h: u32, m: u32, s: u32) -> TimeWindow {
        let now = Kolkata.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap();
        TimeWindow::around(now, Duration::minutes(1))
    }

    #[test]
    fn test_timestamp_bounds() {
        let window = window_at(10, 30, 15);
        assert_eq!(
            window.timestamp_bounds(),
            (
                "2025-06-01 10:29:15".to_string(),
                "2025-06-01 10:31:15".to_string()
            )
        );
    }

    #[test]
    fn test_date_and_time_of_day_bounds() {
        let window = window_at(10, 30, 15);
        assert_eq!(window.date(), "2025-06-01");
        assert_eq!(
            window.time_of_day_bounds(),
            ("10:29".to_string(), "10:31".to_string())
        );
        assert_eq!(window.zone_label(), "IST");
    }

    #[test]
    fn test_window_spanning_midnight_keeps_todays_date() {
        let window = window_at(0, 0, 30);
        assert_eq!(window.date(), "2025-06-01");
        assert_eq!(
            window.timestamp_bounds(),
            (
                "2025-05-31 23:59:30".to_string(),
                "2025-06-01 00:01:30".to_string()
            )
        );
    }
}
