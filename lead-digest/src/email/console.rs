//! Console backend for dry runs
//!
//! Logs report emails instead of sending them, so a report can be checked
//! end to end without mail credentials.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Email, EmailError, EmailSender};

/// Logs emails instead of sending them
///
/// Headers are logged at `info`; the HTML body at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend;

impl ConsoleBackend {
    /// Create a console backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let attachment = email
            .attachment
            .as_ref()
            .map(|a| format!("{} ({} bytes)", a.name, a.size));

        info!(
            to = ?email.to,
            cc = ?email.cc,
            subject = ?email.subject,
            attachment = ?attachment,
            "Console email (not sent)"
        );

        if let Some(html) = &email.html {
            debug!(html = %html, "Email HTML content");
        }

        Ok(())
    }
}
