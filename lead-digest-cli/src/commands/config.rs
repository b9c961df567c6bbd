//! `config check`

use std::path::Path;

use anyhow::Result;
use console::{style, Emoji};

use super::load_config;

static SUCCESS: Emoji = Emoji("✓ ", "");

/// Load and validate configuration, then print it with secrets redacted
///
/// # Errors
///
/// Returns the load or validation error; every missing key is named.
pub fn check_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path, false)?;

    println!("{}", style(format!("{SUCCESS}Configuration is valid")).green().bold());
    println!();
    println!("{config:#?}");
    Ok(())
}
