//! Reminder candidates and the store seam the scheduler drives.

use anyhow::Result;

use super::window::TimeWindow;

/// Delivery identity of the event owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub email: String,
    /// Local-format digits; the country code is added at dispatch
    pub phone: String,
}

/// The trigger field(s) a candidate was selected on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSchedule {
    /// Stage 1: absolute reminder timestamp, as stored
    At(Option<String>),
    /// Stage 2: calendar date plus time-of-day, as stored
    On { date: String, time: String },
}

/// An event due for a reminder, joined with its owner's contact data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueEvent {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub schedule: EventSchedule,
    pub contact: Contact,
}

/// Source of per-iteration store sessions.
///
/// Each call to `connect` yields a fresh session; dropping the session
/// releases the underlying connection.
pub trait EventStore {
    type Session: StoreSession;

    fn connect(&self) -> Result<Self::Session>;
}

/// Candidate queries and stage-completion writes. Every write commits on its
/// own before returning.
pub trait StoreSession {
    /// Undone events whose reminder timestamp falls inside the window and
    /// whose first reminder has not gone out
    fn fetch_stage1_candidates(&mut self, window: &TimeWindow) -> Result<Vec<DueEvent>>;

    /// Undone events dated today whose time-of-day falls inside the window
    /// and whose final reminder has not gone out
    fn fetch_stage2_candidates(&mut self, window: &TimeWindow) -> Result<Vec<DueEvent>>;

    fn mark_stage1_sent(&mut self, event_id: i64) -> Result<()>;

    /// Sets the final-reminder flag and `done` in one update
    fn mark_stage2_done(&mut self, event_id: i64) -> Result<()>;
}
