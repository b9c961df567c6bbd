//! Application state
//!
//! Everything a handler needs, built once at startup from the loaded
//! configuration and cloned cheaply into each request.

use std::sync::Arc;

use crate::config::{DigestConfig, MailBackend};
use crate::db::{PgReportSource, ReportSource};
use crate::email::{ConsoleBackend, EmailSender, GraphMailBackend};
use crate::oauth2::{self, AuthError};
use crate::pipeline::ReportPipeline;

/// Shared state for the HTTP handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pipeline: ReportPipeline,
}

impl AppState {
    /// Wrap an assembled pipeline
    #[must_use]
    pub const fn new(pipeline: ReportPipeline) -> Self {
        Self { pipeline }
    }

    /// Build production state: Postgres source and the configured mailer
    ///
    /// `dry_run` forces the console mailer regardless of configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the token endpoint is invalid.
    pub fn from_config(config: DigestConfig, dry_run: bool) -> Result<Self, AuthError> {
        let mailer = mailer_from_config(&config, dry_run)?;
        let source: Arc<dyn ReportSource> = Arc::new(PgReportSource::new(&config.database.url));
        Ok(Self::new(ReportPipeline::new(Arc::new(config), source, mailer)))
    }

    /// Report pipeline
    #[must_use]
    pub const fn pipeline(&self) -> &ReportPipeline {
        &self.pipeline
    }

    /// Loaded configuration
    #[must_use]
    pub fn config(&self) -> &DigestConfig {
        self.pipeline.config()
    }
}

/// Select the mail backend named by the configuration
///
/// # Errors
///
/// Returns [`AuthError::Config`] if the Graph backend is selected and the
/// token endpoint is invalid.
pub fn mailer_from_config(
    config: &DigestConfig,
    dry_run: bool,
) -> Result<Arc<dyn EmailSender>, AuthError> {
    if dry_run || config.mail.backend == MailBackend::Console {
        tracing::info!("Using console mail backend; reports will be logged, not sent");
        return Ok(Arc::new(ConsoleBackend::new()));
    }

    let tokens = oauth2::provider_from_settings(&config.azure)?;
    Ok(Arc::new(GraphMailBackend::from_settings(&config.mail, tokens)))
}
