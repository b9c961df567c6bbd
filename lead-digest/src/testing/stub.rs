use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// How the stub answers
#[derive(Debug, Clone)]
pub struct StubBehavior {
    /// Status of the token endpoint
    pub token_status: StatusCode,
    /// Body of the token endpoint
    pub token_body: Value,
    /// Status of the `sendMail` endpoint
    pub send_status: StatusCode,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            token_status: StatusCode::OK,
            token_body: json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "stub-access-token",
            }),
            send_status: StatusCode::ACCEPTED,
        }
    }
}

/// One `sendMail` call received by the stub
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSend {
    /// Mailbox in the request path
    pub sender: String,
    /// `Authorization` header, if any
    pub authorization: Option<String>,
    /// Parsed JSON body, `Null` if it was not JSON
    pub body: Value,
}

#[derive(Debug, Default)]
struct StubState {
    behavior: StubBehavior,
    token_requests: Mutex<Vec<String>>,
    sends: Mutex<Vec<RecordedSend>>,
}

/// Local stand-in for the identity provider and the Graph mail API
///
/// Serves `POST /{tenant}/oauth2/v2.0/token` and
/// `POST /v1.0/users/{sender}/sendMail` on an ephemeral port. The server
/// stops when the stub is dropped.
#[derive(Debug)]
pub struct MailApiStub {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl MailApiStub {
    /// Start with default behavior: tokens granted, mail accepted
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(StubBehavior::default()).await
    }

    /// Start with custom behavior
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start_with(behavior: StubBehavior) -> std::io::Result<Self> {
        let state = Arc::new(StubState {
            behavior,
            ..StubState::default()
        });

        let app = Router::new()
            .route("/{tenant}/oauth2/v2.0/token", post(token))
            .route("/v1.0/users/{sender}/sendMail", post(send_mail))
            // Graph accepts messages well above axum's default limit
            .layer(DefaultBodyLimit::disable())
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "Mail API stub stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Value for `azure.authority`
    #[must_use]
    pub fn authority(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Value for `mail.graph_base_url`
    #[must_use]
    pub fn graph_base_url(&self) -> String {
        format!("http://{}/v1.0", self.addr)
    }

    /// Token endpoint for `tenant`
    #[must_use]
    pub fn token_url(&self, tenant: &str) -> String {
        format!("http://{}/{tenant}/oauth2/v2.0/token", self.addr)
    }

    /// Raw form bodies received by the token endpoint
    #[must_use]
    pub fn token_requests(&self) -> Vec<String> {
        self.state.token_requests.lock().clone()
    }

    /// Calls received by the `sendMail` endpoint
    #[must_use]
    pub fn sends(&self) -> Vec<RecordedSend> {
        self.state.sends.lock().clone()
    }
}

impl Drop for MailApiStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[allow(clippy::unused_async)]
async fn token(State(state): State<Arc<StubState>>, body: String) -> impl IntoResponse {
    state.token_requests.lock().push(body);
    (
        state.behavior.token_status,
        Json(state.behavior.token_body.clone()),
    )
}

#[allow(clippy::unused_async)]
async fn send_mail(
    State(state): State<Arc<StubState>>,
    Path(sender): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    state.sends.lock().push(RecordedSend {
        sender,
        authorization,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    state.behavior.send_status
}
