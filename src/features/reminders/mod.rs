//! # Reminders Feature
//!
//! Two-stage event reminders: an early notice on the event's reminder
//! timestamp and a final notice at its date and time. Each stage is delivered
//! at most once per event.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Both stages driven through a single `ReminderStage` descriptor
//! - 1.1.0: Per-stage reports and store-error isolation between stages
//! - 1.0.0: Initial release

pub mod composer;
pub mod event;
pub mod scheduler;
pub mod stage;
pub mod window;

pub use composer::Notification;
pub use event::{Contact, DueEvent, EventSchedule, EventStore, StoreSession};
pub use scheduler::{IterationOutcome, ReminderScheduler, StageReport};
pub use stage::ReminderStage;
pub use window::TimeWindow;
