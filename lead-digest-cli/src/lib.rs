//! lead-digest CLI library

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lead_digest::report::ReportKind;
use lead_digest::schedule::ReportSchedule;

pub mod commands;

pub use commands::load_config;

/// Command-line interface
#[derive(Debug, Parser)]
#[command(name = "lead-digest")]
#[command(version)]
#[command(about = "Job-posting and lead reports delivered by email", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ./config.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Log reports instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run one report now and print its summary
    Run {
        /// Report to run (job-postings, lead-shortfall, high-volume-posters)
        report: ReportKind,

        /// Report date, YYYY-MM-DD; defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Daily job target for lead-shortfall
        #[arg(short, long)]
        threshold: Option<i64>,

        /// Log the email instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a report on a cron schedule until interrupted
    Schedule {
        /// Report to run
        report: ReportKind,

        /// Six-field cron expression, seconds first (e.g. "0 30 7 * * *")
        #[arg(long)]
        cron: ReportSchedule,

        /// Log emails instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigCommand {
    /// Load and validate configuration, then print it with secrets redacted
    Check,
}
