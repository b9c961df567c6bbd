//! Health check endpoints
//!
//! - `GET /`: static service status, no dependencies touched
//! - `GET /health`: component health including a database ping
//! - `GET /health/live`: liveness check

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::{Instant, SystemTime};

use crate::state::AppState;

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is working
    Healthy,
    /// Component is not working
    Unhealthy,
}

/// Individual component health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: HealthStatus,
    /// Optional message with details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    /// Create a healthy component
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms: None,
        }
    }

    /// Create an unhealthy component
    #[must_use]
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            response_time_ms: None,
        }
    }

    /// Add response time
    #[must_use]
    pub const fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Application version
    pub version: String,
    /// Timestamp of the check (Unix epoch seconds)
    pub timestamp: u64,
    /// Individual component health
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthCheckResponse {
    /// Create a healthy response with no components
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: service.into(),
            version: version.into(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            components: BTreeMap::new(),
        }
    }

    /// Add component health and recompute the overall status
    pub fn add_component(&mut self, name: impl Into<String>, health: ComponentHealth) {
        self.components.insert(name.into(), health);
        self.status = if self.components.values().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };
    }

    /// HTTP status for the overall health
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for HealthCheckResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

/// `GET /`: service name and version
#[allow(clippy::unused_async)]
pub async fn service_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.config().service.name,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /health/live`: the process is up
#[allow(clippy::unused_async)]
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// `GET /health`: ping the reporting database
pub async fn health_check(State(state): State<AppState>) -> HealthCheckResponse {
    let mut response =
        HealthCheckResponse::new(&state.config().service.name, env!("CARGO_PKG_VERSION"));
    response.add_component("application", ComponentHealth::healthy());

    let started = Instant::now();
    let database = match state.pipeline().source().ping().await {
        Ok(()) => ComponentHealth::healthy(),
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            ComponentHealth::unhealthy(err.to_string())
        }
    };
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    response.add_component("database", database.with_response_time(elapsed));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_health_unhealthy() {
        let health = ComponentHealth::unhealthy("Connection failed");
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.message, Some("Connection failed".to_string()));
    }

    #[test]
    fn test_health_check_response_unhealthy_status() {
        let mut response = HealthCheckResponse::new("svc", "1.0.0");
        response.add_component("application", ComponentHealth::healthy());
        response.add_component("database", ComponentHealth::unhealthy("Connection failed"));
        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_health_check_response_healthy() {
        let mut response = HealthCheckResponse::new("svc", "1.0.0");
        response.add_component("database", ComponentHealth::healthy().with_response_time(3));
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.components["database"].response_time_ms, Some(3));
    }

    #[test]
    fn test_health_status_has_two_states() {
        assert_eq!(serde_json::to_value(HealthStatus::Healthy).unwrap(), json!("healthy"));
        assert_eq!(serde_json::to_value(HealthStatus::Unhealthy).unwrap(), json!("unhealthy"));
        assert!(serde_json::from_value::<HealthStatus>(json!("degraded")).is_err());
    }

    #[tokio::test]
    async fn test_liveness_handler() {
        let response = liveness().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
