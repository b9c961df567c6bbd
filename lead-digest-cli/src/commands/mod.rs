//! CLI command implementations

pub mod config;
pub mod run;
pub mod schedule;
pub mod serve;

pub use config::check_config;
pub use run::RunCommand;
pub use schedule::ScheduleCommand;
pub use serve::serve;

use std::path::Path;

use lead_digest::config::{ConfigError, DigestConfig, MailBackend};

/// Load, adjust for `dry_run`, and validate configuration
///
/// A dry run always uses the console mail backend, so the Azure
/// credentials are not required.
///
/// # Errors
///
/// Returns the first load or validation failure.
pub fn load_config(path: Option<&Path>, dry_run: bool) -> Result<DigestConfig, ConfigError> {
    let mut config = DigestConfig::load_unvalidated(path)?;
    if dry_run {
        config.mail.backend = MailBackend::Console;
    }
    config.validate()?;
    Ok(config)
}
