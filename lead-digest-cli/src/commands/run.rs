//! `run`: one report, once

use std::time::Duration;

use anyhow::{Context, Result};
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use lead_digest::config::DigestConfig;
use lead_digest::pipeline::{ReportRequest, ReportSummary};
use lead_digest::report::ReportKind;
use lead_digest::state::AppState;

static SUCCESS: Emoji = Emoji("✓ ", "");
static FAILURE: Emoji = Emoji("✗ ", "");

/// Run one report and print its summary
#[derive(Debug, Clone, Copy)]
pub struct RunCommand {
    /// Report to run
    pub report: ReportKind,
    /// Date and threshold overrides
    pub request: ReportRequest,
    /// Log the email instead of sending it
    pub dry_run: bool,
}

impl RunCommand {
    /// Execute the report
    ///
    /// # Errors
    ///
    /// Returns an error naming the failed stage; the process exits non-zero.
    pub async fn execute(&self, config: DigestConfig) -> Result<ReportSummary> {
        let state = AppState::from_config(config, self.dry_run)?;
        tracing::info!(report = %self.report, dry_run = self.dry_run, "Running report");

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Running {} report...", self.report));

        let result = state.pipeline().run(self.report, self.request).await;
        spinner.finish_and_clear();

        match result {
            Ok(summary) => {
                tracing::info!(
                    report = %self.report,
                    count = summary.count(),
                    "Report run finished"
                );
                println!("{}", style(format!("{SUCCESS}{}", summary.message())).green().bold());
                println!("{}", serde_json::to_string_pretty(&summary)?);
                Ok(summary)
            }
            Err(err) => {
                tracing::error!(
                    report = %self.report,
                    stage = err.stage(),
                    error = %err,
                    "Report run failed"
                );
                eprintln!(
                    "{} {}",
                    style(format!("{FAILURE}{} stage failed:", err.stage())).red().bold(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_digest::config::MailBackend;
    use lead_digest::testing::CapturedLogs;
    use tracing::Level;

    fn config() -> DigestConfig {
        let mut config = DigestConfig::default();
        config.database.url = "postgres://reports@localhost/jobs".to_string();
        config.mail.backend = MailBackend::Console;
        config.mail.sender = "support@example.com".to_string();
        config.mail.recipient = "ops@example.com".to_string();
        config
    }

    #[tokio::test]
    async fn test_failed_run_logs_stage() {
        let logs = CapturedLogs::new();
        let _guard = logs.set_default(Level::INFO);

        let command = RunCommand {
            report: ReportKind::LeadShortfall,
            request: ReportRequest { date: None, threshold: Some(0) },
            dry_run: true,
        };
        assert!(command.execute(config()).await.is_err());

        assert!(logs.contains("Running report"));
        assert!(logs.contains("dry_run=true"));
        assert!(logs.contains("Report run failed"));
        assert!(logs.contains("stage=\"request\""));
    }
}
