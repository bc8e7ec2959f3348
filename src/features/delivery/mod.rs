//! # Delivery Feature
//!
//! Best-effort dispatch of reminders to the chat-message relay and the email
//! relay. Channel failures are logged and reported, never raised.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod dispatcher;

pub use dispatcher::{DeliveryReport, Dispatcher, HttpDispatcher};
