//! Command dispatch: bridges CLI args -> core workflow -> output formatting.

pub mod batch_replace;
pub mod compare;
pub mod download;
pub mod process;
pub mod update;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a workflow command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Download(args) => download::handle(&args, global).await,
        Command::Process(args) => process::handle(&args, global),
        Command::Compare(args) => compare::handle(&args, global),
        Command::Update(args) => update::handle(&args, global).await,
        Command::BatchReplace(args) => batch_replace::handle(args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
