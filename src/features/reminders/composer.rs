//! Message bodies for both reminder stages.

use chrono_tz::Tz;

use super::event::{DueEvent, EventSchedule};
use crate::core::timefmt::{format_date_time, format_stored_timestamp};

/// Rendered text for both channels of one reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub chat: String,
    pub email_subject: String,
    pub email_body: String,
}

/// Display string for whichever trigger field the event was selected on
pub fn format_schedule(schedule: &EventSchedule, tz: Tz, zone_label: &str) -> String {
    match schedule {
        EventSchedule::At(timestamp) => format_stored_timestamp(timestamp.as_deref(), tz),
        EventSchedule::On { date, time } => format_date_time(date, time, tz, zone_label),
    }
}

/// First reminder, sent when the absolute reminder timestamp comes due
pub fn compose_early(
    event: &DueEvent,
    when: &str,
    zone_label: &str,
    enrichment: &str,
) -> Notification {
    let title = &event.title;
    Notification {
        chat: format!("Reminder for '{title}' at {when}.\n\n{enrichment}"),
        email_subject: format!("Reminder: {title}"),
        email_body: format!(
            "Hello,\n\nThis is a friendly reminder for your upcoming event: '{title}'.\n\n\
             Date & Time ({zone_label}): {when}\nDescription: {}\n\n{enrichment}",
            event.description
        ),
    }
}

/// Final "happening now" reminder, sent at the event's date and time
pub fn compose_final(
    event: &DueEvent,
    when: &str,
    zone_label: &str,
    enrichment: &str,
) -> Notification {
    let title = &event.title;
    Notification {
        chat: format!(
            "Final Reminder! Your event '{title}' is happening now ({when}).\n\n{enrichment}"
        ),
        email_subject: format!("Event Happening Now: {title}"),
        email_body: format!(
            "Hello,\n\nYour event '{title}' is scheduled for now.\n\n\
             Time ({zone_label}): {when}\nDescription: {}\n\n{enrichment}",
            event.description
        ),
    }
}
