//! `download`: fetch every policy of the package into a directory.

use owo_colors::OwoColorize;
use tracing::info;

use fmgbatch_core::{DownloadEvent, PolicyApi};

use crate::cli::{DownloadArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &DownloadArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let manager = config::manager_config(global)?;
    let package = config::connect(&manager)?;

    let bar = output::progress_bar(global, 0, "Downloading");
    let result = fmgbatch_core::download(&package, &args.output_dir, |event| match event {
        DownloadEvent::Listed { total } => {
            bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        }
        DownloadEvent::Saved { policy_id, path } => {
            bar.inc(1);
            tracing::debug!(%policy_id, path = %path.display(), "saved policy");
        }
    })
    .await;
    bar.finish_and_clear();
    package.logout().await;

    let count = result?;
    info!(count, directory = %args.output_dir.display(), "download finished");

    let message = format!(
        "Downloaded {count} policies to {}",
        args.output_dir.display()
    );
    if output::should_color(&global.color) {
        output::print_output(&message.green().to_string(), global.quiet);
    } else {
        output::print_output(&message, global.quiet);
    }
    Ok(())
}
