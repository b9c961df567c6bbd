use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::email::{Email, EmailError, EmailSender};

/// Captures sent emails in memory
///
/// Clones share the same record, so keep one clone for assertions and hand
/// another to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingMailer {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emails sent
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Every email sent, oldest first
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().clone()
    }

    /// The most recent email
    #[must_use]
    pub fn last(&self) -> Option<Email> {
        self.sent.lock().last().cloned()
    }

    /// Forget every recorded email
    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;
        self.sent.lock().push(email);
        Ok(())
    }
}
