//! Email sender trait abstraction

use async_trait::async_trait;

use super::{Email, EmailError};

/// Delivers report emails
///
/// Implemented by the Graph and console backends, and by the recording
/// mailer in [`crate::testing`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email is invalid or cannot be delivered
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
