//! Clap derive structures for the `fmgbatch` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this file may
//! only depend on clap, clap_complete and std.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fmgbatch -- batch editing of FortiManager firewall policies
#[derive(Debug, Parser)]
#[command(
    name = "fmgbatch",
    version,
    about = "Batch-edit FortiManager firewall policies",
    long_about = "Download the firewall policies of a FortiManager policy package to JSON \
        files, rewrite or hand-edit them, review the differences, and push only the \
        changed interface fields back to the appliance.\n\n\
        Connection settings come from FMGR_* environment variables, a .env file, \
        or the config file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Load FMGR_* settings from this .env file (default: ./.env if present)
    #[arg(long, short = 'e', global = true)]
    pub env_file: Option<PathBuf>,

    /// Config file path (default: platform config dir)
    #[arg(long, env = "FMGBATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'O',
        env = "FMGBATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides FMGR_TIMEOUT)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text report
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every policy of the package to JSON files
    #[command(alias = "dl")]
    Download(DownloadArgs),

    /// List the policies in a directory with their interfaces
    Process(ProcessArgs),

    /// Show interface changes between two policy directories
    #[command(alias = "diff")]
    Compare(CompareArgs),

    /// Push interface changes between two policy directories to FortiManager
    Update(UpdateArgs),

    /// Replace one interface with a list of others across all policies
    BatchReplace(BatchReplaceArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Directory to write policy_<id>.json files to
    #[arg(long, short = 'o', default_value = "policies")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Directory containing policy files
    #[arg(long, short = 'i', default_value = "policies")]
    pub input_dir: PathBuf,
}

/// The two generations to compare, shared by `compare` and `update`.
#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Directory with the original (downloaded) policies
    #[arg(long, short = 'o', default_value = "policies")]
    pub original_dir: PathBuf,

    /// Directory with the modified policies
    #[arg(long, short = 'm', default_value = "modified_policies")]
    pub modified_dir: PathBuf,

    /// Fields to compare, comma-separated (default: srcintf,dstintf)
    #[arg(long, short = 'f', value_delimiter = ',')]
    pub fields: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub diff: DiffArgs,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub diff: DiffArgs,

    /// Apply without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct BatchReplaceArgs {
    /// Directory containing the original policy files
    #[arg(long, short = 'i', default_value = "policies")]
    pub input_dir: PathBuf,

    /// Directory to write rewritten policies to
    #[arg(long, short = 'o', default_value = "modified_policies")]
    pub output_dir: PathBuf,

    /// Interface to replace
    #[arg(long, default_value = "MPLS")]
    pub interface: String,

    /// Replacement interfaces, comma-separated (default: the six VPN interfaces)
    #[arg(long, short = 'r', value_delimiter = ',')]
    pub replacements: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
