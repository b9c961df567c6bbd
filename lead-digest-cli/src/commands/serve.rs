//! `serve`

use anyhow::Result;
use console::style;
use lead_digest::config::DigestConfig;
use lead_digest::server;
use lead_digest::state::AppState;

/// Start the HTTP server and block until Ctrl-C
///
/// # Errors
///
/// Returns an error if the mail backend cannot be built or the address
/// cannot be bound.
pub async fn serve(config: DigestConfig, dry_run: bool) -> Result<()> {
    println!(
        "{} {} on {}:{}",
        style("Starting").green().bold(),
        style(&config.service.name).bold(),
        config.service.host,
        config.service.port
    );

    let state = AppState::from_config(config, dry_run)?;
    server::serve(state).await
}
