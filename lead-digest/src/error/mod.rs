//! Error types and error handling
//!
//! Each pipeline stage owns its error type; [`DigestError`] wraps them so a
//! handler can return any stage failure as a single service error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::db::DatabaseError;
use crate::email::EmailError;
use crate::oauth2::AuthError;
use crate::report::ReportError;

/// Top-level error for one report invocation
#[derive(Debug, Error)]
pub enum DigestError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection or query failure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Token acquisition failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Mail dispatch failure
    #[error(transparent)]
    Send(EmailError),

    /// Template rendering or spreadsheet failure
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Caller supplied unusable parameters
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl DigestError {
    /// Pipeline stage the error came from
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Database(_) => "database",
            Self::Auth(_) => "auth",
            Self::Send(_) => "send",
            Self::Report(_) => "report",
            Self::BadRequest(_) => "request",
        }
    }

    /// HTTP status reported to the caller
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EmailError> for DigestError {
    fn from(err: EmailError) -> Self {
        // Token failures surface from inside the mail backend
        match err {
            EmailError::Auth(auth) => Self::Auth(auth),
            other => Self::Send(other),
        }
    }
}

impl IntoResponse for DigestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "success": false,
            "message": self.to_string(),
            "stage": self.stage(),
        });
        (status, Json(body)).into_response()
    }
}
