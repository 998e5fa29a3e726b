//! Outgoing email providers

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::{AppEnvironment, AuthConfig};

const RESEND_API_BASE: &str = "https://api.resend.com";

/// Receipt id returned by the console provider
pub const CONSOLE_RECEIPT_ID: &str = "test_console";

/// An outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement of a sent email
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailReceipt {
    pub id: String,
}

/// Email dispatch error
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Provider is missing credentials; nothing was sent
    #[error("email provider not configured: {0}")]
    NotConfigured(String),

    /// Request never got a response
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with an error status
    #[error("email provider error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Email provider trait
///
/// Abstracts delivery so development builds can log instead of sending.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Send a message
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError>;
}

/// Logs messages instead of sending them
#[derive(Debug, Default)]
pub struct ConsoleEmailProvider {
    last: Mutex<Option<EmailMessage>>,
}

impl ConsoleEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently "sent" message
    pub fn last_message(&self) -> Option<EmailMessage> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EmailProvider for ConsoleEmailProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Email (console provider, not sent)"
        );
        debug!(html = %message.html, "Email body");

        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.clone());

        Ok(EmailReceipt {
            id: CONSOLE_RECEIPT_ID.to_string(),
        })
    }
}

/// Resend API error body
#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

/// Sends email through the Resend HTTP API
#[derive(Clone)]
pub struct ResendEmailProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl ResendEmailProvider {
    /// Keys of this length or shorter are treated as placeholders
    const MIN_KEY_LENGTH: usize = 10;

    /// Create a provider against the public Resend API
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: RESEND_API_BASE.to_string(),
        }
    }

    /// Point the provider at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn api_key(&self) -> Result<&str, EmailError> {
        match self.api_key.as_deref() {
            Some(key) if key.len() > Self::MIN_KEY_LENGTH => Ok(key),
            _ => Err(EmailError::NotConfigured(
                "RESEND_API_KEY is missing or invalid".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for ResendEmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendEmailProvider")
            .field("base_url", &self.base_url)
            .field("configured", &self.api_key().is_ok())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmailProvider for ResendEmailProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        let api_key = self.api_key().inspect_err(|e| error!(error = %e, "Cannot send email"))?;

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(message)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Resend API request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            error!(status = %status, message = %message, "Resend API error");
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let receipt: EmailReceipt = response.json().await?;
        debug!(id = %receipt.id, "Email sent");
        Ok(receipt)
    }
}

/// Pick the provider for the configured environment
pub fn provider_for(config: &AuthConfig) -> Arc<dyn EmailProvider> {
    match config.environment {
        AppEnvironment::Development => Arc::new(ConsoleEmailProvider::new()),
        AppEnvironment::Test | AppEnvironment::Production => {
            Arc::new(ResendEmailProvider::new(config.resend_api_key.clone()))
        }
    }
}
