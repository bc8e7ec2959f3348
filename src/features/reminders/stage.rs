//! # Feature: Reminder Stages
//!
//! The two reminder stages as one descriptor. Each stage knows its candidate
//! query, its completion write and its message template, so the scheduler
//! drives both through a single code path.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Replace the separate early and final passes with one stage descriptor

use anyhow::Result;
use chrono_tz::Tz;

use super::composer::{compose_early, compose_final, format_schedule, Notification};
use super::event::{DueEvent, StoreSession};
use super::window::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderStage {
    /// Fires on the absolute reminder timestamp
    Early,
    /// Fires on the event's date and time; completes the event
    Final,
}

impl ReminderStage {
    /// Processing order within one iteration
    pub const ALL: [ReminderStage; 2] = [ReminderStage::Early, ReminderStage::Final];

    pub fn label(&self) -> &'static str {
        match self {
            ReminderStage::Early => "first reminder",
            ReminderStage::Final => "second reminder",
        }
    }

    pub fn fetch_candidates<S: StoreSession>(
        &self,
        session: &mut S,
        window: &TimeWindow,
    ) -> Result<Vec<DueEvent>> {
        match self {
            ReminderStage::Early => session.fetch_stage1_candidates(window),
            ReminderStage::Final => session.fetch_stage2_candidates(window),
        }
    }

    pub fn complete<S: StoreSession>(&self, session: &mut S, event_id: i64) -> Result<()> {
        match self {
            ReminderStage::Early => session.mark_stage1_sent(event_id),
            ReminderStage::Final => session.mark_stage2_done(event_id),
        }
    }

    pub fn compose(
        &self,
        event: &DueEvent,
        tz: Tz,
        zone_label: &str,
        enrichment: &str,
    ) -> Notification {
        let when = format_schedule(&event.schedule, tz, zone_label);
        match self {
            ReminderStage::Early => compose_early(event, &when, zone_label, enrichment),
            ReminderStage::Final => compose_final(event, &when, zone_label, enrichment),
        }
    }
}

impl std::fmt::Display for ReminderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
