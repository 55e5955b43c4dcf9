//! `batch-replace`: swap one interface for a list of others in every policy.

use tracing::{info, warn};

use fmgbatch_core::{DEFAULT_REPLACEMENTS, InterfaceRewrite, load_generation};

use crate::cli::{BatchReplaceArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: BatchReplaceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // A missing directory fails; an empty one just yields no changes.
    let original = load_generation(&args.input_dir)?;
    if original.is_empty() {
        warn!(directory = %args.input_dir.display(), "no original policies found");
    }

    let rewrite = InterfaceRewrite::new(args.interface, replacement_list(args.replacements));
    info!(
        interface = %rewrite.target,
        replacements = ?rewrite.replacements,
        "replacing interface"
    );

    let deltas = fmgbatch_core::replace_interface(&original, &rewrite, &args.output_dir)?;
    output::print_output(
        &output::render_changes(
            &global.output,
            &deltas,
            output::should_color(&global.color),
        ),
        global.quiet,
    );
    info!(
        modified = deltas.len(),
        directory = %args.output_dir.display(),
        "modified policies written"
    );
    Ok(())
}

/// Blank entries are dropped; nothing left means the default list.
fn replacement_list(requested: Vec<String>) -> Vec<String> {
    let replacements: Vec<String> = requested
        .into_iter()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect();
    if replacements.is_empty() {
        DEFAULT_REPLACEMENTS.iter().map(|s| (*s).to_owned()).collect()
    } else {
        replacements
    }
}
