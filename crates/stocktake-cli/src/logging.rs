//! Tracing setup
//!
//! Logs go to stderr so JSON printed by `data` stays clean on stdout.

use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

const VERBOSE_FILTER: &str = "warn,stocktake=debug,stocktake_core=debug,stocktake_airtable=debug,stocktake_providers=debug";

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) -> Result<()> {
    let default = if verbose { VERBOSE_FILTER } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .map_err(|e| CliError::user(format!("Invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;

    if verbose {
        tracing::debug!("Verbose mode enabled");
    }
    Ok(())
}
