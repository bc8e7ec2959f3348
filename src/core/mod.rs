//! # Core Module
//!
//! Core configuration and time formatting shared by every reminder component.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add timefmt module with zone-pinned timestamp rendering
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod timefmt;

// Re-export commonly used items
pub use config::Config;
pub use timefmt::{format_date_time, format_instant, format_stored_timestamp};
