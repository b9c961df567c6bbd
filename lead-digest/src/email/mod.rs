//! Report email delivery
//!
//! [`Email`] is a backend-neutral message; an [`EmailSender`] delivers it.
//! Production uses [`GraphMailBackend`]; [`ConsoleBackend`] logs instead of
//! sending.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lead_digest::email::{Email, EmailSender, GraphMailBackend};
//! use lead_digest::oauth2::StaticTokenProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = GraphMailBackend::new(
//!     "https://graph.microsoft.com/v1.0",
//!     "support@example.com",
//!     Arc::new(StaticTokenProvider::new("token")),
//! );
//!
//! let email = Email::new()
//!     .to("ops@example.com")
//!     .subject("Daily Job Postings")
//!     .html("<p>No surprises today</p>");
//!
//! backend.send(email).await?;
//! # Ok(())
//! # }
//! ```

mod attachment;
mod builder;
mod console;
mod error;
mod graph;
mod sender;

pub use attachment::{Attachment, ATTACHMENT_SOFT_LIMIT_BYTES};
pub use builder::Email;
pub use console::ConsoleBackend;
pub use error::EmailError;
pub use graph::GraphMailBackend;
pub use sender::EmailSender;

#[cfg(test)]
pub use sender::MockEmailSender;
