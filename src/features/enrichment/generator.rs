//! # Feature: Reminder Enrichment
//!
//! Asks a chat-completion model for a few encouraging sentences about the
//! event. Every failure path (transport error, error status, unparseable
//! body, empty answer, timeout) resolves to [`FALLBACK_MESSAGE`].
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Pass credentials per request instead of through the process environment
//! - 1.1.0: Bound requests with a timeout and treat blank completions as failures
//! - 1.0.0: Initial release with OpenAI chat completions

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use log::{debug, warn};
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use openai::Credentials;
use std::time::Duration;

/// Substituted whenever the text service fails or returns nothing usable
pub const FALLBACK_MESSAGE: &str =
    "You got this! Wishing you a great day ahead. All the best for your upcoming event.";

const SYSTEM_PROMPT: &str = "You are a motivational assistant. \
     Only use the information provided to craft the response. Do not invent details.";

/// Produces the snippet appended to a reminder. Never fails: implementations
/// absorb their own errors and return [`FALLBACK_MESSAGE`].
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn generate(&self, title: &str, description: &str, now: &DateTime<Tz>) -> String;
}

/// Used when no AI credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEnricher;

#[async_trait]
impl Enricher for StaticEnricher {
    async fn generate(&self, _title: &str, _description: &str, _now: &DateTime<Tz>) -> String {
        FALLBACK_MESSAGE.to_string()
    }
}

/// Chat-completion backed enrichment
#[derive(Clone)]
pub struct OpenAiEnricher {
    credentials: Credentials,
    openai_model: String,
    timeout: Duration,
}

impl OpenAiEnricher {
    /// An empty `base_url` selects the public OpenAI endpoint
    pub fn new(api_key: &str, base_url: &str, openai_model: String, timeout: Duration) -> Self {
        Self {
            credentials: Credentials::new(api_key, base_url),
            openai_model,
            timeout,
        }
    }

    async fn request(&self, prompt: String) -> Result<String> {
        let messages = vec![
            ChatCompletionMessage {
                role: ChatCompletionMessageRole::System,
                content: Some(SYSTEM_PROMPT.to_string()),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            },
            ChatCompletionMessage {
                role: ChatCompletionMessageRole::User,
                content: Some(prompt),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            },
        ];

        let completion = tokio::time::timeout(
            self.timeout,
            ChatCompletion::builder(&self.openai_model, messages)
                .credentials(self.credentials.clone())
                .create(),
        )
        .await
        .map_err(|_| anyhow::anyhow!("AI request timed out after {:?}", self.timeout))??;

        completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("AI response contained no message"))
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    async fn generate(&self, title: &str, description: &str, now: &DateTime<Tz>) -> String {
        let prompt = build_prompt(title, description, now);
        debug!("Requesting enrichment for '{title}'");
        or_fallback(self.request(prompt).await)
    }
}

/// Unwrap a completion, substituting the fallback on error or blank text
fn or_fallback(result: Result<String>) -> String {
    match result {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("Error generating AI content: empty completion");
            FALLBACK_MESSAGE.to_string()
        }
        Err(e) => {
            warn!("Error generating AI content: {e}");
            FALLBACK_MESSAGE.to_string()
        }
    }
}

/// The user prompt for one event.
///
/// The current time is given as context only; the model is told not to repeat
/// it or use relative day words, since the reminder body carries the time.
pub fn build_prompt(title: &str, description: &str, now: &DateTime<Tz>) -> String {
    let now_str = now.format("%Y-%m-%d %H:%M %Z");
    let today = now.format("%Y-%m-%d");
    let zone = now.format("%Z");

    format!(
        "Write a short, encouraging reminder for a user about an event happening soon, \
         and include 1-2 practical suggestions or ideas relevant to the event.\n\
         Keep it friendly, positive, and concise (3-5 sentences).\n\
         Do not mention the current time, any clock time, or words like today, tomorrow or yesterday.\n\n\
         Current Time ({zone}): {now_str}\n\
         Today's Date ({zone}): {today}\n\
         Event Title: {title}\n\
         Event Description: {description}"
    )
}
