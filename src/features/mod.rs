//! # Features
//!
//! - `reminders`: window evaluation, composition and the polling loop
//! - `enrichment`: AI-written reminder snippets
//! - `delivery`: chat and email relays

pub mod delivery;
pub mod enrichment;
pub mod reminders;

pub use delivery::{DeliveryReport, Dispatcher, HttpDispatcher};
pub use enrichment::{Enricher, OpenAiEnricher, StaticEnricher};
pub use reminders::ReminderScheduler;
