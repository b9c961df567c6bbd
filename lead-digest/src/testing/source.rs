use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::db::{DatabaseError, IngestionWindow, JobPosting, LeadActivity, ReportSource};

/// Serves fixed rows, applying the same filters the SQL would
///
/// Postings are filtered by source tag and non-empty poster profile; leads
/// by the threshold. Dates are recorded but not filtered on, so fixtures do
/// not need to match the clock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportSource {
    jobs: Vec<JobPosting>,
    leads: Vec<LeadActivity>,
    high_volume: Vec<JobPosting>,
    unavailable: bool,
    dates: Arc<Mutex<Vec<NaiveDate>>>,
}

impl InMemoryReportSource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows for the job-postings query
    #[must_use]
    pub fn with_jobs(mut self, jobs: Vec<JobPosting>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Rows for the lead-shortfall query
    #[must_use]
    pub fn with_leads(mut self, leads: Vec<LeadActivity>) -> Self {
        self.leads = leads;
        self
    }

    /// Rows for the high-volume-posters query
    #[must_use]
    pub fn with_high_volume(mut self, jobs: Vec<JobPosting>) -> Self {
        self.high_volume = jobs;
        self
    }

    /// Fail every call as if the database were down
    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Dates requested so far
    #[must_use]
    pub fn requested_dates(&self) -> Vec<NaiveDate> {
        self.dates.lock().clone()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.unavailable {
            return Err(DatabaseError::Connect(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportSource for InMemoryReportSource {
    async fn job_postings(
        &self,
        date: NaiveDate,
        source_tag: &str,
    ) -> Result<Vec<JobPosting>, DatabaseError> {
        self.check()?;
        self.dates.lock().push(date);
        Ok(self
            .jobs
            .iter()
            .filter(|job| job.source.as_deref() == Some(source_tag))
            .filter(|job| job.posted_by_profile.as_deref().is_some_and(|p| !p.is_empty()))
            .cloned()
            .collect())
    }

    async fn lead_activity(
        &self,
        date: NaiveDate,
        threshold: i64,
    ) -> Result<Vec<LeadActivity>, DatabaseError> {
        self.check()?;
        self.dates.lock().push(date);
        Ok(self
            .leads
            .iter()
            .filter(|lead| lead.jobs_today < threshold)
            .cloned()
            .collect())
    }

    async fn high_volume_postings(
        &self,
        window: IngestionWindow,
    ) -> Result<Vec<JobPosting>, DatabaseError> {
        self.check()?;
        self.dates.lock().push(window.start.date());
        Ok(self.high_volume.clone())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }
}
