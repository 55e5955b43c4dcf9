//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::path::Path;

use tracing::{info, warn};

use fmgbatch_core::{Generation, load_generation};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Load a generation that must hold at least one policy.
pub fn load_nonempty(dir: &Path, kind: &'static str) -> Result<Generation, CliError> {
    let generation = load_generation(dir)?;
    if generation.is_empty() {
        warn!(directory = %dir.display(), "no {kind} policies found");
        return Err(CliError::NoPolicies {
            kind,
            path: dir.to_path_buf(),
        });
    }
    info!(count = generation.len(), directory = %dir.display(), "loaded {kind} policies");
    Ok(generation)
}
