//! Notification dispatch for alerts
//!
//! One notifier per run: the SMTP transport is built once and reused for the
//! whole batch, and a single HTTP client serves every webhook post. Email and
//! webhook dispatches are independent; a failed email never suppresses the
//! webhook attempt for the same alert.

use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::Alert;
use crate::config::SmtpSettings;

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("Webhook delivery failed: {0}")]
    Webhook(String),
}

/// Outcome of both dispatch attempts for one alert
#[derive(Debug)]
pub struct DispatchOutcome {
    pub email: Result<(), NotifierError>,
    pub webhook: Result<(), NotifierError>,
}

impl DispatchOutcome {
    /// True when both channels accepted the alert
    pub fn fully_delivered(&self) -> bool {
        self.email.is_ok() && self.webhook.is_ok()
    }
}

/// The chat payload is exactly `{"text": <body>}`
pub fn webhook_payload(body: &str) -> serde_json::Value {
    serde_json::json!({ "text": body })
}

/// Sends alerts over email and a chat webhook
pub struct Notifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
    client: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    /// Create a notifier holding one SMTP transport for the batch
    pub fn new(smtp: &SmtpSettings, webhook_url: impl Into<String>) -> Result<Self, NotifierError> {
        let credentials = Credentials::new(smtp.username.clone(), smtp.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| NotifierError::Email(format!("Failed to create SMTP transport: {}", e)))?
            .port(smtp.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            sender: smtp.sender.clone(),
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        })
    }

    /// Attempt both channels for one alert, independently
    pub async fn dispatch(&self, alert: &Alert) -> DispatchOutcome {
        DispatchOutcome {
            email: self.send_email(alert).await,
            webhook: self.post_webhook(&alert.body).await,
        }
    }

    /// Send one alert email over the encrypted relay.
    ///
    /// The message is multipart/alternative with a single plain-text part, to
    /// a single recipient.
    pub async fn send_email(&self, alert: &Alert) -> Result<(), NotifierError> {
        let from: Mailbox = self
            .sender
            .parse()
            .map_err(|e| NotifierError::Email(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = alert
            .recipient
            .parse()
            .map_err(|e| NotifierError::Email(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(alert.subject.clone())
            .multipart(MultiPart::alternative().singlepart(SinglePart::plain(alert.body.clone())))
            .map_err(|e| NotifierError::Email(format!("Failed to build message: {}", e)))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifierError::Email(e.to_string()))?;

        tracing::debug!(recipient = %alert.recipient, "Alert email sent");
        Ok(())
    }

    /// POST the alert body to the chat webhook
    pub async fn post_webhook(&self, body: &str) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&webhook_payload(body))
            .send()
            .await
            .map_err(|e| NotifierError::Webhook(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::Webhook(format!(
                "Webhook returned status {}",
                response.status()
            )));
        }

        tracing::debug!(url = %self.webhook_url, "Webhook notification sent");
        Ok(())
    }
}
