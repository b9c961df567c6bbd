//! Read-only reporting database access
//!
//! Every call opens its own connection and closes it before returning, so a
//! failed query never leaves a connection behind. Reports run a handful of
//! times a day; a pool would sit idle between runs.

mod models;
mod query;

pub use models::{JobPosting, LeadActivity, LeadShortfall};
pub use query::{IngestionWindow, QueryParam, ReportQuery, HIGH_VOLUME_TITLE_CUTOFF};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, Connection, FromRow, PgConnection};
use thiserror::Error;

/// Database failures
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Could not open a connection
    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    /// Query failed or returned undecodable rows
    #[error("Database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Source of report rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Postings with `source_tag` posted on `date`
    async fn job_postings(
        &self,
        date: NaiveDate,
        source_tag: &str,
    ) -> Result<Vec<JobPosting>, DatabaseError>;

    /// Leads with fewer than `threshold` jobs recorded on `date`
    async fn lead_activity(
        &self,
        date: NaiveDate,
        threshold: i64,
    ) -> Result<Vec<LeadActivity>, DatabaseError>;

    /// Postings from high-volume posters ingested inside `window`
    async fn high_volume_postings(
        &self,
        window: IngestionWindow,
    ) -> Result<Vec<JobPosting>, DatabaseError>;

    /// Check that the database is reachable
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Postgres-backed [`ReportSource`]
#[derive(Clone)]
pub struct PgReportSource {
    database_url: String,
}

impl std::fmt::Debug for PgReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgReportSource").finish_non_exhaustive()
    }
}

impl PgReportSource {
    /// Create a source for `database_url`; no connection is made yet
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    async fn connect(&self) -> Result<PgConnection, DatabaseError> {
        PgConnection::connect(&self.database_url)
            .await
            .map_err(DatabaseError::Connect)
    }

    async fn fetch<T>(&self, query: ReportQuery) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut conn = self.connect().await?;
        let rows = query.fetch_all(&mut conn).await;

        if let Err(err) = conn.close().await {
            tracing::warn!(error = %err, "Failed to close database connection");
        }

        let rows = rows.map_err(DatabaseError::Query)?;
        tracing::debug!(rows = rows.len(), "Report query complete");
        Ok(rows)
    }
}

#[async_trait]
impl ReportSource for PgReportSource {
    async fn job_postings(
        &self,
        date: NaiveDate,
        source_tag: &str,
    ) -> Result<Vec<JobPosting>, DatabaseError> {
        self.fetch(ReportQuery::job_postings_on(date, source_tag)).await
    }

    async fn lead_activity(
        &self,
        date: NaiveDate,
        threshold: i64,
    ) -> Result<Vec<LeadActivity>, DatabaseError> {
        self.fetch(ReportQuery::lead_shortfall(date, threshold)).await
    }

    async fn high_volume_postings(
        &self,
        window: IngestionWindow,
    ) -> Result<Vec<JobPosting>, DatabaseError> {
        self.fetch(ReportQuery::high_volume_posters(window, HIGH_VOLUME_TITLE_CUTOFF))
            .await
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        let mut conn = self.connect().await?;
        let result = conn.ping().await;

        if let Err(err) = conn.close().await {
            tracing::warn!(error = %err, "Failed to close database connection");
        }

        result.map_err(DatabaseError::Query)
    }
}
