//! Client-credentials token acquisition

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, ClientId, ClientSecret, RequestTokenError, Scope, TokenResponse, TokenUrl,
};

use crate::config::AzureSettings;
use crate::oauth2::http::async_http_client;
use crate::oauth2::types::{AccessToken, AuthError, TokenClient};

/// Source of bearer tokens for the mail API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain a token valid for at least one request
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// Requests a fresh token from the identity provider on every call
pub struct ClientCredentialsProvider {
    client: TokenClient,
    scope: String,
}

impl std::fmt::Debug for ClientCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsProvider")
            .field("token_url", &self.client.token_uri().as_str())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ClientCredentialsProvider {
    /// Create a provider for an explicit token endpoint
    ///
    /// Credentials are sent in the request body.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if `token_url` is not a valid URL.
    pub fn new(
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> Result<Self, AuthError> {
        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(
                TokenUrl::new(token_url.to_string())
                    .map_err(|e| AuthError::Config(format!("Invalid token URL: {e}")))?,
            );

        Ok(Self {
            client,
            scope: scope.to_string(),
        })
    }

    /// Create a provider for the configured tenant
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the derived token URL is invalid.
    pub fn from_settings(settings: &AzureSettings) -> Result<Self, AuthError> {
        Self::new(
            &settings.token_url(),
            &settings.client_id,
            &settings.client_secret,
            &settings.scope,
        )
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let response = self
            .client
            .exchange_client_credentials()
            .add_scope(Scope::new(self.scope.clone()))
            .request_async(&async_http_client)
            .await
            .map_err(|err| match err {
                RequestTokenError::ServerResponse(response) => AuthError::Rejected {
                    error: response.error().to_string(),
                    description: response.error_description().cloned(),
                },
                RequestTokenError::Request(err) => AuthError::Transport(err.to_string()),
                RequestTokenError::Parse(err, _) => AuthError::InvalidResponse(err.to_string()),
                RequestTokenError::Other(message) => AuthError::InvalidResponse(message),
            })?;

        let secret = response.access_token().secret();
        if secret.is_empty() {
            return Err(AuthError::MissingToken);
        }

        tracing::debug!(
            expires_in = ?response.expires_in(),
            "Acquired mail API access token"
        );
        Ok(AccessToken::new(secret.clone(), response.expires_in()))
    }
}

/// Hands out a fixed token
///
/// Used by the console backend and tests that stub the mail API.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Always return `token`
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(AccessToken::new(self.token.clone(), None))
    }
}
