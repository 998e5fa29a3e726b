//! Email provider that records instead of sending
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hyperwave_auth_core::{EmailError, EmailMessage, EmailProvider, EmailReceipt};

#[derive(Default, Clone)]
pub struct RecordingEmailProvider {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Token from the link in the most recent email
    pub fn last_token(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let html = &sent.last()?.html;
        let start = html.find("token=")? + "token=".len();
        let end = html[start..].find('"')? + start;
        Some(html[start..end].to_string())
    }
}

#[async_trait]
impl EmailProvider for RecordingEmailProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::Api {
                status: 500,
                message: "provider down".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(EmailReceipt {
            id: format!("email-{}", sent.len()),
        })
    }
}
