//! Email error types

use thiserror::Error;

use crate::oauth2::AuthError;

/// Errors that can occur when building or sending an email
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no primary recipient
    #[error("email must have a recipient")]
    NoRecipient,

    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no HTML body
    #[error("email must have HTML content")]
    NoContent,

    /// Address is not usable
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Attachment could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Mail API unreachable
    #[error("mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Mail API answered with a non-success status
    #[error("mail API rejected the message with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, usually a Graph error object
        body: String,
    },

    /// No token for the mail API
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Payload could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
