//! In-process cron scheduling
//!
//! Replaces an external crontab entry with `lead-digest schedule`. The
//! expression uses the `cron` crate's syntax: seconds first, six or seven
//! fields, evaluated in local time.
//!
//! ```rust
//! use lead_digest::schedule::ReportSchedule;
//!
//! // 07:30:00 every weekday
//! let schedule: ReportSchedule = "0 30 7 * * Mon-Fri".parse().unwrap();
//! assert_eq!(schedule.expression(), "0 30 7 * * Mon-Fri");
//! ```

use chrono::{DateTime, Local};
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;

use crate::pipeline::{ReportPipeline, ReportRequest};
use crate::report::ReportKind;

/// Invalid cron expression
#[derive(Debug, Error)]
#[error("invalid cron expression '{expression}': {source}")]
pub struct ScheduleError {
    expression: String,
    #[source]
    source: cron::error::Error,
}

/// A parsed cron schedule
#[derive(Debug, Clone)]
pub struct ReportSchedule {
    expression: String,
    schedule: cron::Schedule,
}

impl FromStr for ReportSchedule {
    type Err = ScheduleError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let expression = expression.trim().to_string();
        let schedule = cron::Schedule::from_str(&expression).map_err(|source| ScheduleError {
            expression: expression.clone(),
            source,
        })?;
        Ok(Self {
            expression,
            schedule,
        })
    }
}

impl ReportSchedule {
    /// The expression as given
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`
    #[must_use]
    pub fn next_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }
}

/// Run `kind` at every fire time until `shutdown` resolves
///
/// A failed run is logged and the schedule continues. Each run uses the
/// report's defaults: today's date and the configured threshold.
pub async fn run_forever<F>(
    pipeline: ReportPipeline,
    kind: ReportKind,
    schedule: ReportSchedule,
    shutdown: F,
) where
    F: Future<Output = ()> + Send,
{
    tokio::pin!(shutdown);

    loop {
        let now = Local::now();
        let Some(next) = schedule.next_after(&now) else {
            tracing::warn!(schedule = schedule.expression(), "Schedule has no future fire times");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::info!(report = %kind, next = %next, "Next scheduled run");

        tokio::select! {
            () = &mut shutdown => {
                tracing::info!(report = %kind, "Scheduler stopped");
                return;
            }
            () = tokio::time::sleep(wait) => {}
        }

        match pipeline.run(kind, ReportRequest::default()).await {
            Ok(summary) => tracing::info!(
                report = %kind,
                count = summary.count(),
                email_sent = summary.email_sent(),
                "{}",
                summary.message()
            ),
            Err(err) => tracing::error!(
                report = %kind,
                stage = err.stage(),
                error = %err,
                "Scheduled run failed"
            ),
        }
    }
}
