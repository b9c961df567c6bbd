//! HTTP handlers
//!
//! Every report route is a `POST` with optional `date` (`YYYY-MM-DD`) and,
//! for lead shortfall, `threshold` query parameters. Successful runs answer
//! with the report summary; failures with the JSON body from
//! [`DigestError`].

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::DigestError;
use crate::health;
use crate::pipeline::{HighVolumePostersReport, JobPostingsReport, LeadShortfallReport, ReportRequest};
use crate::state::AppState;

/// Build the service router
///
/// `/get-linkedin-jobs` is kept as an alias for `/reports/job-postings` so
/// existing cron entries keep working.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::service_status))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness))
        .route("/reports/job-postings", post(job_postings))
        .route("/get-linkedin-jobs", post(job_postings))
        .route("/reports/lead-shortfall", post(lead_shortfall))
        .route("/reports/high-volume-posters", post(high_volume_posters))
        .with_state(state)
}

fn request_params(
    query: Result<Query<ReportRequest>, QueryRejection>,
) -> Result<ReportRequest, DigestError> {
    query
        .map(|Query(request)| request)
        .map_err(|rejection| DigestError::BadRequest(rejection.body_text()))
}

/// `POST /reports/job-postings`
///
/// # Errors
///
/// Returns [`DigestError`] for bad parameters or any failed stage.
pub async fn job_postings(
    State(state): State<AppState>,
    query: Result<Query<ReportRequest>, QueryRejection>,
) -> Result<Json<JobPostingsReport>, DigestError> {
    let request = request_params(query)?;
    let report = state.pipeline().job_postings(request.date).await?;
    Ok(Json(report))
}

/// `POST /reports/lead-shortfall`
///
/// # Errors
///
/// Returns [`DigestError`] for bad parameters or any failed stage.
pub async fn lead_shortfall(
    State(state): State<AppState>,
    query: Result<Query<ReportRequest>, QueryRejection>,
) -> Result<Json<LeadShortfallReport>, DigestError> {
    let request = request_params(query)?;
    let report = state
        .pipeline()
        .lead_shortfall(request.date, request.threshold)
        .await?;
    Ok(Json(report))
}

/// `POST /reports/high-volume-posters`
///
/// # Errors
///
/// Returns [`DigestError`] for bad parameters or any failed stage.
pub async fn high_volume_posters(
    State(state): State<AppState>,
    query: Result<Query<ReportRequest>, QueryRejection>,
) -> Result<Json<HighVolumePostersReport>, DigestError> {
    let request = request_params(query)?;
    let report = state.pipeline().high_volume_posters(request.date).await?;
    Ok(Json(report))
}
