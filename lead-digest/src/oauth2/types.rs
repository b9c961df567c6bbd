//! Token and error types

use oauth2::basic::BasicClient;
use oauth2::{EndpointNotSet, EndpointSet};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Client with only the token endpoint configured
///
/// Client-credentials grants never visit the authorization endpoint.
pub type TokenClient = BasicClient<
    EndpointNotSet, // HasAuthUrl
    EndpointNotSet, // HasDeviceAuthUrl
    EndpointNotSet, // HasIntrospectionUrl
    EndpointNotSet, // HasRevocationUrl
    EndpointSet,    // HasTokenUrl
>;

/// Token acquisition failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials or endpoint settings are unusable
    #[error("Invalid OAuth2 configuration: {0}")]
    Config(String),

    /// Identity provider refused the request
    #[error("Token request rejected: {error}{}", parenthesized(.description.as_deref()))]
    Rejected {
        /// OAuth2 error code, e.g. `invalid_client`
        error: String,
        /// Provider's description, when present
        description: Option<String>,
    },

    /// Token endpoint unreachable
    #[error("Token request failed: {0}")]
    Transport(String),

    /// Token endpoint answered with something other than a token response
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Response carried no access token
    #[error("Token response did not contain an access token")]
    MissingToken,
}

fn parenthesized(detail: Option<&str>) -> String {
    detail.map(|d| format!(" ({d})")).unwrap_or_default()
}

/// A bearer token for the mail API
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    /// Wrap `secret`, expiring `expires_in` from now when known
    #[must_use]
    pub fn new(secret: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: expires_in.map(|ttl| Instant::now() + ttl),
        }
    }

    /// Raw token value for the `Authorization` header
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether the token remains valid for at least `skew`
    ///
    /// Tokens without a known lifetime are never considered fresh.
    #[must_use]
    pub fn is_fresh(&self, skew: Duration) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() + skew < expires_at)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
