//! Report pipeline: query, format, send
//!
//! One [`ReportPipeline`] is built at startup and shared by the HTTP
//! handlers, the `run` command and the scheduler. Each invocation is
//! independent: it queries, formats and sends exactly once, or returns a
//! zero-count summary without touching the mailer when the query is empty.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DigestConfig, MAX_LEAD_THRESHOLD};
use crate::db::{IngestionWindow, JobPosting, LeadShortfall, ReportSource};
use crate::email::{Attachment, Email, EmailSender};
use crate::error::DigestError;
use crate::report::{
    self, group_by_poster, poster_rows, subject_for, write_spreadsheet, xlsx_mime,
    PosterActivity, ReportKind, ReportMeta, SpreadsheetRow,
};

/// Caller-supplied overrides for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Report date; today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Lead job target; the configured threshold when absent
    #[serde(default)]
    pub threshold: Option<i64>,
}

/// Outcome of a job-postings run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPostingsReport {
    /// Always true; failures are returned as errors
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Date the report covers
    pub report_date: NaiveDate,
    /// Number of postings found
    pub jobs_count: usize,
    /// The postings found
    pub jobs: Vec<JobPosting>,
    /// Whether an email went out
    pub email_sent: bool,
    /// Primary recipient when an email went out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_to: Option<String>,
    /// Attached spreadsheet file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// Outcome of a lead-shortfall run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadShortfallReport {
    /// Always true; failures are returned as errors
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Date the report covers
    pub report_date: NaiveDate,
    /// Threshold in effect
    pub threshold: i64,
    /// Number of leads below the threshold
    pub leads_count: usize,
    /// Leads below the threshold, fewest jobs first
    pub leads: Vec<LeadShortfall>,
    /// Whether an email went out
    pub email_sent: bool,
    /// Primary recipient when an email went out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_to: Option<String>,
    /// Attached spreadsheet file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// Outcome of a high-volume-posters run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighVolumePostersReport {
    /// Always true; failures are returned as errors
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Ingestion date the report covers
    pub report_date: NaiveDate,
    /// Number of high-volume posters
    pub posters_count: usize,
    /// Number of postings by those posters
    pub jobs_count: usize,
    /// Postings grouped by poster
    pub posters: Vec<PosterActivity>,
    /// Whether an email went out
    pub email_sent: bool,
    /// Primary recipient when an email went out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_to: Option<String>,
    /// Attached spreadsheet file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

/// Outcome of any report run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportSummary {
    /// Job postings
    JobPostings(JobPostingsReport),
    /// Lead shortfall
    LeadShortfall(LeadShortfallReport),
    /// High-volume posters
    HighVolumePosters(HighVolumePostersReport),
}

impl ReportSummary {
    /// Human-readable outcome
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::JobPostings(r) => &r.message,
            Self::LeadShortfall(r) => &r.message,
            Self::HighVolumePosters(r) => &r.message,
        }
    }

    /// Number of report items
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::JobPostings(r) => r.jobs_count,
            Self::LeadShortfall(r) => r.leads_count,
            Self::HighVolumePosters(r) => r.posters_count,
        }
    }

    /// Whether an email went out
    #[must_use]
    pub const fn email_sent(&self) -> bool {
        match self {
            Self::JobPostings(r) => r.email_sent,
            Self::LeadShortfall(r) => r.email_sent,
            Self::HighVolumePosters(r) => r.email_sent,
        }
    }
}

struct Delivery {
    recipient: String,
    attachment: Option<String>,
}

/// Runs reports against a source and a mailer
#[derive(Clone)]
pub struct ReportPipeline {
    config: Arc<DigestConfig>,
    source: Arc<dyn ReportSource>,
    mailer: Arc<dyn EmailSender>,
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReportPipeline {
    /// Assemble a pipeline from its collaborators
    #[must_use]
    pub fn new(
        config: Arc<DigestConfig>,
        source: Arc<dyn ReportSource>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            config,
            source,
            mailer,
        }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Report source in use
    #[must_use]
    pub fn source(&self) -> &Arc<dyn ReportSource> {
        &self.source
    }

    /// Run `kind` with the given overrides
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; see [`DigestError::stage`].
    pub async fn run(
        &self,
        kind: ReportKind,
        request: ReportRequest,
    ) -> Result<ReportSummary, DigestError> {
        match kind {
            ReportKind::JobPostings => self
                .job_postings(request.date)
                .await
                .map(ReportSummary::JobPostings),
            ReportKind::LeadShortfall => self
                .lead_shortfall(request.date, request.threshold)
                .await
                .map(ReportSummary::LeadShortfall),
            ReportKind::HighVolumePosters => self
                .high_volume_posters(request.date)
                .await
                .map(ReportSummary::HighVolumePosters),
        }
    }

    /// Postings from the configured source posted on `date`
    ///
    /// # Errors
    ///
    /// Returns the first stage failure.
    pub async fn job_postings(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<JobPostingsReport, DigestError> {
        let settings = &self.config.reports.job_postings;
        let date = date.unwrap_or_else(today);

        let jobs = self.source.job_postings(date, &settings.source_tag).await?;
        tracing::info!(report = "job-postings", %date, count = jobs.len(), "Query complete");

        if jobs.is_empty() {
            return Ok(JobPostingsReport {
                success: true,
                message: format!("No job postings found for {date}"),
                report_date: date,
                jobs_count: 0,
                jobs,
                email_sent: false,
                email_sent_to: None,
                attachment: None,
            });
        }

        let meta = self.meta(&settings.app_name, date);
        let html = report::render_job_postings(&meta, &settings.source_tag, &jobs)?;
        let subject = subject_for(ReportKind::JobPostings, &meta, jobs.len(), 0);
        let spreadsheet = settings
            .attach_spreadsheet
            .then_some((jobs.as_slice(), settings.file_prefix.as_str()));

        let delivery = self.deliver(&subject, &html, spreadsheet).await?;

        Ok(JobPostingsReport {
            success: true,
            message: format!("Found {} job posting(s) - email sent", jobs.len()),
            report_date: date,
            jobs_count: jobs.len(),
            jobs,
            email_sent: true,
            email_sent_to: Some(delivery.recipient),
            attachment: delivery.attachment,
        })
    }

    /// Leads with fewer than `threshold` jobs on `date`, fewest first
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::BadRequest`] for a threshold outside
    /// `1..=MAX_LEAD_THRESHOLD`, or
    /// the first stage failure.
    pub async fn lead_shortfall(
        &self,
        date: Option<NaiveDate>,
        threshold: Option<i64>,
    ) -> Result<LeadShortfallReport, DigestError> {
        let settings = &self.config.reports.lead_shortfall;
        let date = date.unwrap_or_else(today);
        let threshold = threshold.unwrap_or(settings.threshold);
        if !(1..=MAX_LEAD_THRESHOLD).contains(&threshold) {
            return Err(DigestError::BadRequest(format!(
                "threshold must be between 1 and {MAX_LEAD_THRESHOLD}, got {threshold}"
            )));
        }

        let mut leads: Vec<LeadShortfall> = self
            .source
            .lead_activity(date, threshold)
            .await?
            .into_iter()
            .filter(|activity| activity.jobs_today < threshold)
            .map(|activity| LeadShortfall::from_activity(activity, threshold))
            .collect();
        leads.sort_by(|a, b| {
            a.jobs_today
                .cmp(&b.jobs_today)
                .then_with(|| a.lead_name.cmp(&b.lead_name))
        });
        tracing::info!(report = "lead-shortfall", %date, threshold, count = leads.len(), "Query complete");

        if leads.is_empty() {
            return Ok(LeadShortfallReport {
                success: true,
                message: format!("All leads reached {threshold} jobs on {date}"),
                report_date: date,
                threshold,
                leads_count: 0,
                leads,
                email_sent: false,
                email_sent_to: None,
                attachment: None,
            });
        }

        let meta = self.meta(&settings.app_name, date);
        let html = report::render_lead_shortfall(&meta, threshold, &leads)?;
        let subject = subject_for(ReportKind::LeadShortfall, &meta, leads.len(), threshold);
        let spreadsheet = settings
            .attach_spreadsheet
            .then_some((leads.as_slice(), settings.file_prefix.as_str()));

        let delivery = self.deliver(&subject, &html, spreadsheet).await?;

        Ok(LeadShortfallReport {
            success: true,
            message: format!("Found {} lead(s) below {threshold} jobs - email sent", leads.len()),
            report_date: date,
            threshold,
            leads_count: leads.len(),
            leads,
            email_sent: true,
            email_sent_to: Some(delivery.recipient),
            attachment: delivery.attachment,
        })
    }

    /// Posters with many distinct titles among postings ingested on `date`
    ///
    /// # Errors
    ///
    /// Returns the first stage failure.
    pub async fn high_volume_posters(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<HighVolumePostersReport, DigestError> {
        let settings = &self.config.reports.high_volume_posters;
        let date = date.unwrap_or_else(today);

        let jobs = self
            .source
            .high_volume_postings(IngestionWindow::for_day(date))
            .await?;
        let jobs_count = jobs.len();
        let posters = group_by_poster(jobs);
        tracing::info!(
            report = "high-volume-posters",
            %date,
            posters = posters.len(),
            count = jobs_count,
            "Query complete"
        );

        if posters.is_empty() {
            return Ok(HighVolumePostersReport {
                success: true,
                message: format!("No high-volume posters found for {date}"),
                report_date: date,
                posters_count: 0,
                jobs_count: 0,
                posters,
                email_sent: false,
                email_sent_to: None,
                attachment: None,
            });
        }

        let meta = self.meta(&settings.app_name, date);
        let html = report::render_high_volume_posters(&meta, &posters)?;
        let subject = subject_for(ReportKind::HighVolumePosters, &meta, posters.len(), 0);
        let rows = poster_rows(&posters);
        let spreadsheet = settings
            .attach_spreadsheet
            .then_some((rows.as_slice(), settings.file_prefix.as_str()));

        let delivery = self.deliver(&subject, &html, spreadsheet).await?;

        Ok(HighVolumePostersReport {
            success: true,
            message: format!(
                "Found {} high-volume poster(s) with {jobs_count} posting(s) - email sent",
                posters.len()
            ),
            report_date: date,
            posters_count: posters.len(),
            jobs_count,
            posters,
            email_sent: true,
            email_sent_to: Some(delivery.recipient),
            attachment: delivery.attachment,
        })
    }

    fn meta(&self, app_name: &str, date: NaiveDate) -> ReportMeta {
        ReportMeta::new(app_name, &self.config.reports.dashboard_url, date, Local::now())
    }

    async fn deliver<R: SpreadsheetRow>(
        &self,
        subject: &str,
        html: &str,
        spreadsheet: Option<(&[R], &str)>,
    ) -> Result<Delivery, DigestError> {
        let mail = &self.config.mail;
        let mut email = Email::new()
            .to(&mail.recipient)
            .cc_all(&mail.cc)
            .subject(subject)
            .html(html);

        let mut attachment_name = None;
        if let Some((rows, prefix)) = spreadsheet {
            let path: PathBuf =
                write_spreadsheet(rows, &self.config.reports.output_dir, prefix, Local::now())?;
            let attachment = Attachment::from_path_with_limit(
                &path,
                &xlsx_mime(),
                mail.attachment_soft_limit_bytes,
            )
            .await?;
            attachment_name = Some(attachment.name.clone());
            email = email.attach(attachment);
        }

        self.mailer.send(email).await?;
        tracing::info!(recipient = %mail.recipient, cc = mail.cc.len(), subject, "Report delivered");

        Ok(Delivery {
            recipient: mail.recipient.clone(),
            attachment: attachment_name,
        })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
