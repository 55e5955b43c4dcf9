//! `process`: list the policies of a directory with their interfaces.

use tracing::warn;

use fmgbatch_core::load_generation;

use crate::cli::{GlobalOpts, ProcessArgs};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ProcessArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let generation = load_generation(&args.input_dir)?;
    if generation.is_empty() {
        warn!(directory = %args.input_dir.display(), "no policies found");
        return Ok(());
    }
    let rendered = output::render_policies(&global.output, &generation);
    output::print_output(&rendered, global.quiet);
    Ok(())
}
