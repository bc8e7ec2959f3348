//! # Enrichment Feature
//!
//! Short AI-written encouragement appended to every reminder, with a fixed
//! fallback whenever the text service is unavailable.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Bound requests with a timeout and treat blank completions as failures
//! - 1.0.0: Initial release with OpenAI chat completions

pub mod generator;

pub use generator::{build_prompt, Enricher, OpenAiEnricher, StaticEnricher, FALLBACK_MESSAGE};
