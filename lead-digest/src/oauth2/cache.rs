//! Token reuse across report runs

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::oauth2::provider::TokenProvider;
use crate::oauth2::types::{AccessToken, AuthError};

/// Tokens are refreshed this long before they expire
pub const REFRESH_SKEW: Duration = Duration::from_secs(60);

/// Wraps a provider and reuses its token until shortly before expiry
///
/// Concurrent callers wait on the same refresh rather than each requesting
/// their own token.
#[derive(Debug)]
pub struct CachingTokenProvider<P> {
    inner: P,
    cached: Mutex<Option<AccessToken>>,
}

impl<P: TokenProvider> CachingTokenProvider<P> {
    /// Cache tokens from `inner`
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<P: TokenProvider> TokenProvider for CachingTokenProvider<P> {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(REFRESH_SKEW)) {
            tracing::trace!("Reusing cached access token");
            return Ok(token.clone());
        }

        let token = self.inner.access_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}
