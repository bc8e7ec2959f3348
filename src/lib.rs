// Core layer - configuration and time formatting
pub mod core;

// Features layer - reminders, enrichment, delivery
pub mod features;

// Infrastructure - SQLite event store
pub mod database;

// Re-export core config
pub use crate::core::Config;

pub use database::Database;
pub use features::{
    // Delivery
    DeliveryReport, Dispatcher, HttpDispatcher,
    // Enrichment
    Enricher, OpenAiEnricher, StaticEnricher,
    // Reminders
    ReminderScheduler,
};
