mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::fs::OpenOptions;
use std::io;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match init_tracing(&cli.global) {
        Ok(guard) => guard,
        Err(err) => exit(err, None),
    };

    if let Err(err) = run(cli).await {
        exit(err, guard);
    }
}

fn exit(err: CliError, guard: Option<WorkerGuard>) -> ! {
    // Flush the log file before the process goes away.
    drop(guard);
    let code = err.exit_code();
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(code);
}

/// Log to stderr, and also to `--log-file` when given. `RUST_LOG` wins over
/// the verbosity flags.
fn init_tracing(global: &GlobalOpts) -> Result<Option<WorkerGuard>, CliError> {
    let level = match (global.quiet, global.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,fmgbatch={level},fmgbatch_core={level},fmgbatch_api={level},fmgbatch_config={level}"
        ))
    });

    let (file_layer, guard) = match &global.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fmgbatch", &mut io::stdout());
            Ok(())
        }

        cmd => {
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cli.global).await
        }
    }
}
