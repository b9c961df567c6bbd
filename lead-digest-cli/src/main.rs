//! lead-digest command-line tool

use anyhow::Result;
use clap::Parser;
use lead_digest::observability;
use lead_digest::pipeline::ReportRequest;
use lead_digest_cli::commands::{self, RunCommand, ScheduleCommand};
use lead_digest_cli::{load_config, Cli, Commands, ConfigCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init()?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { dry_run } => {
            let config = load_config(config_path, dry_run)?;
            commands::serve(config, dry_run).await?;
        }
        Commands::Run {
            report,
            date,
            threshold,
            dry_run,
        } => {
            let config = load_config(config_path, dry_run)?;
            let cmd = RunCommand {
                report,
                request: ReportRequest { date, threshold },
                dry_run,
            };
            cmd.execute(config).await?;
        }
        Commands::Schedule {
            report,
            cron,
            dry_run,
        } => {
            let config = load_config(config_path, dry_run)?;
            let cmd = ScheduleCommand {
                report,
                schedule: cron,
                dry_run,
            };
            cmd.execute(config).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Check => commands::check_config(config_path)?,
        },
    }

    Ok(())
}
