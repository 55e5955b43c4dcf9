//! `update`: push the diff between two generations to the appliance.

use tracing::info;

use fmgbatch_core::{ApplySummary, PolicyApi};

use crate::cli::{GlobalOpts, UpdateArgs};
use crate::commands::{compare, util};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &UpdateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Settings are validated before any file is read.
    let manager = config::manager_config(global)?;

    let deltas = compare::changes(&args.diff)?;
    let color = output::should_color(&global.color);
    output::print_output(
        &output::render_changes(&global.output, &deltas, color),
        global.quiet,
    );
    if deltas.is_empty() {
        return Ok(());
    }

    let prompt = format!("Apply changes to {} policies?", deltas.len());
    if !util::confirm(&prompt, args.yes)? {
        info!("update cancelled");
        return Ok(());
    }

    let package = config::connect(&manager)?;
    let bar = output::progress_bar(global, deltas.len(), "Updating");
    let outcomes = fmgbatch_core::apply_with(&deltas, &package, |_| bar.inc(1)).await;
    bar.finish_and_clear();
    package.logout().await;

    let summary = ApplySummary::from_outcomes(&outcomes);
    info!(
        succeeded = summary.succeeded,
        partial = summary.partial,
        failed = summary.failed,
        "update finished"
    );
    output::print_output(
        &output::render_outcomes(&global.output, &outcomes, &summary, color),
        global.quiet,
    );
    Ok(())
}
