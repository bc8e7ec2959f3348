//! # Feature: Reminder Dispatch
//!
//! Posts each reminder to the WhatsApp relay and the email relay. The two
//! channels are attempted independently and report success as a flag.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Skip a channel when the contact field is blank
//! - 1.0.0: Initial release with JSON relay requests

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info, warn};
use serde::Serialize;
use std::time::Duration;

use crate::features::reminders::composer::Notification;
use crate::features::reminders::event::Contact;

/// Per-channel outcome of one reminder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub chat: bool,
    pub email: bool,
}

impl DeliveryReport {
    pub fn failures(&self) -> usize {
        usize::from(!self.chat) + usize::from(!self.email)
    }
}

/// Two independent delivery channels.
///
/// Both sends return `false` on failure instead of an error; a failed chat
/// message never prevents the email attempt.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// `phone` is in local format; implementations add the country code
    async fn send_chat(&self, phone: &str, message: &str) -> bool;

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> bool;

    async fn deliver(&self, contact: &Contact, notification: &Notification) -> DeliveryReport {
        let chat = self.send_chat(&contact.phone, &notification.chat).await;
        let email = self
            .send_email(
                &contact.email,
                &notification.email_subject,
                &notification.email_body,
            )
            .await;
        DeliveryReport { chat, email }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    number: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    to: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// JSON-over-HTTP relays for WhatsApp and email
#[derive(Clone)]
pub struct HttpDispatcher {
    client: reqwest::Client,
    chat_url: String,
    email_url: String,
    country_code: String,
}

impl HttpDispatcher {
    pub fn new(
        chat_url: String,
        email_url: String,
        country_code: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            chat_url,
            email_url,
            country_code,
        })
    }

    /// Prefix a local number with the configured country code
    pub fn international_number(&self, phone: &str) -> String {
        format!("{}{}", self.country_code, phone.trim())
    }

    async fn post<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<()> {
        self.client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn send_chat(&self, phone: &str, message: &str) -> bool {
        if phone.trim().is_empty() {
            warn!("Skipping WhatsApp message: no phone number on file");
            return false;
        }

        let number = self.international_number(phone);
        let request = ChatRequest {
            number: &number,
            message,
        };
        match self.post(&self.chat_url, &request).await {
            Ok(()) => {
                info!("Successfully sent WhatsApp message to {number}");
                true
            }
            Err(e) => {
                error!("Error sending WhatsApp message to {number}: {e}");
                false
            }
        }
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> bool {
        if address.trim().is_empty() {
            warn!("Skipping email: no address on file");
            return false;
        }

        let request = EmailRequest {
            to: address,
            subject,
            message: body,
        };
        match self.post(&self.email_url, &request).await {
            Ok(()) => {
                info!("Successfully sent email to {address}");
                true
            }
            Err(e) => {
                error!("Error sending email to {address}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn dispatcher(server: &MockServer) -> HttpDispatcher {
        HttpDispatcher::new(
            server.url("/send-message"),
            server.url("/sendEmail"),
            "91".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn notification() -> Notification {
        Notification {
            chat: "Reminder for 'Standup'".to_string(),
            email_subject: "Reminder: Standup".to_string(),
            email_body: "Hello,\n\nStandup soon".to_string(),
        }
    }

    fn contact() -> Contact {
        Contact {
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_chat_posts_prefixed_number() {
        let server = MockServer::start();
        let chat = server.mock(|when, then| {
            when.method(POST).path("/send-message").json_body(json!({
                "number": "919876543210",
                "message": "hi"
            }));
            then.status(200).json_body(json!({ "ok": true }));
        });

        assert!(dispatcher(&server).send_chat("9876543210", "hi").await);
        chat.assert();
    }

    #[tokio::test]
    async fn test_send_email_posts_relay_contract() {
        let server = MockServer::start();
        let email = server.mock(|when, then| {
            when.method(POST).path("/sendEmail").json_body(json!({
                "to": "asha@example.com",
                "subject": "Reminder: Standup",
                "message": "body"
            }));
            then.status(200);
        });

        assert!(
            dispatcher(&server)
                .send_email("asha@example.com", "Reminder: Standup", "body")
                .await
        );
        email.assert();
    }

    #[tokio::test]
    async fn test_error_status_is_reported_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/sendEmail");
            then.status(500).body("smtp down");
        });

        assert!(!dispatcher(&server).send_email("asha@example.com", "s", "b").await);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_reported_not_raised() {
        let dispatcher = HttpDispatcher::new(
            "http://127.0.0.1:1/send-message".to_string(),
            "http://127.0.0.1:1/sendEmail".to_string(),
            "91".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();

        let report = dispatcher.deliver(&contact(), &notification()).await;
        assert_eq!(report, DeliveryReport { chat: false, email: false });
        assert_eq!(report.failures(), 2);
    }

    #[tokio::test]
    async fn test_chat_failure_does_not_block_email() {
        let server = MockServer::start();
        let chat = server.mock(|when, then| {
            when.method(POST).path("/send-message");
            then.status(502);
        });
        let email = server.mock(|when, then| {
            when.method(POST).path("/sendEmail");
            then.status(200);
        });

        let report = dispatcher(&server).deliver(&contact(), &notification()).await;

        assert_eq!(report, DeliveryReport { chat: false, email: true });
        chat.assert();
        email.assert();
    }

    #[tokio::test]
    async fn test_missing_contact_skips_channel() {
        let server = MockServer::start();
        let chat = server.mock(|when, then| {
            when.method(POST).path("/send-message");
            then.status(200);
        });

        let contact = Contact {
            email: String::new(),
            phone: "  ".to_string(),
        };
        let report = dispatcher(&server).deliver(&contact, &notification()).await;

        assert_eq!(report.failures(), 2);
        assert_eq!(chat.calls(), 0);
    }
}
