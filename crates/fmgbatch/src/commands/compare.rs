//! `compare`: report interface changes between two generations.

use fmgbatch_core::{RecordDelta, WatchedFields};

use crate::cli::{CompareArgs, DiffArgs, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &CompareArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let deltas = changes(&args.diff)?;
    let rendered =
        output::render_changes(&global.output, &deltas, output::should_color(&global.color));
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// Load both generations and diff them on the requested fields.
pub fn changes(args: &DiffArgs) -> Result<Vec<RecordDelta>, CliError> {
    let original = util::load_nonempty(&args.original_dir, "original")?;
    let modified = util::load_nonempty(&args.modified_dir, "modified")?;
    let fields = WatchedFields::new(&args.fields);
    tracing::debug!(fields = %fields, "comparing");
    Ok(fmgbatch_core::diff(&original, &modified, &fields))
}
