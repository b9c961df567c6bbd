//! OAuth2 client-credentials tokens for the mail API
//!
//! The service authenticates as itself, with no user present, so the only
//! grant needed is client credentials against the tenant's token endpoint.
//! By default every report run requests a new token; wrap the provider in
//! [`CachingTokenProvider`] to reuse one until shortly before it expires.
//!
//! # Example
//!
//! ```rust,no_run
//! use lead_digest::oauth2::{ClientCredentialsProvider, TokenProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ClientCredentialsProvider::new(
//!     "https://login.microsoftonline.com/contoso/oauth2/v2.0/token",
//!     "client-id",
//!     "client-secret",
//!     "https://graph.microsoft.com/.default",
//! )?;
//! let token = provider.access_token().await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod http;
pub mod provider;
pub mod types;

pub use cache::CachingTokenProvider;
pub use provider::{ClientCredentialsProvider, StaticTokenProvider, TokenProvider};
pub use types::{AccessToken, AuthError};

use std::sync::Arc;

use crate::config::AzureSettings;

/// Build the token provider described by `settings`
///
/// # Errors
///
/// Returns [`AuthError::Config`] if the token URL is invalid.
pub fn provider_from_settings(settings: &AzureSettings) -> Result<Arc<dyn TokenProvider>, AuthError> {
    let provider = ClientCredentialsProvider::from_settings(settings)?;
    if settings.cache_tokens {
        Ok(Arc::new(CachingTokenProvider::new(provider)))
    } else {
        Ok(Arc::new(provider))
    }
}
