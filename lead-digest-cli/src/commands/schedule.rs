//! `schedule`: run a report on a cron schedule

use anyhow::Result;
use chrono::Local;
use console::style;
use lead_digest::config::DigestConfig;
use lead_digest::report::ReportKind;
use lead_digest::schedule::{self, ReportSchedule};
use lead_digest::server::shutdown_signal;
use lead_digest::state::AppState;

/// Run one report at every fire time until Ctrl-C
#[derive(Debug, Clone)]
pub struct ScheduleCommand {
    /// Report to run
    pub report: ReportKind,
    /// When to run it
    pub schedule: ReportSchedule,
    /// Log emails instead of sending them
    pub dry_run: bool,
}

impl ScheduleCommand {
    /// Execute until interrupted
    ///
    /// # Errors
    ///
    /// Returns an error if the mail backend cannot be built. Failed runs are
    /// logged and do not stop the schedule.
    pub async fn execute(self, config: DigestConfig) -> Result<()> {
        let state = AppState::from_config(config, self.dry_run)?;
        tracing::info!(
            report = %self.report,
            schedule = self.schedule.expression(),
            dry_run = self.dry_run,
            "Starting report schedule"
        );

        println!(
            "{} {} on \"{}\"",
            style("Scheduling").green().bold(),
            style(self.report).cyan().bold(),
            self.schedule.expression()
        );
        if let Some(next) = self.schedule.next_after(&Local::now()) {
            println!("  {} {}", style("next run:").dim(), next.format("%Y-%m-%d %H:%M:%S %Z"));
        }

        schedule::run_forever(
            state.pipeline().clone(),
            self.report,
            self.schedule,
            shutdown_signal(),
        )
        .await;
        Ok(())
    }
}
