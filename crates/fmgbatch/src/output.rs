//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders reports in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain is the line-oriented text report.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use fmgbatch_core::model::{DSTINTF_FIELD, SRCINTF_FIELD};
use fmgbatch_core::{ApplyOutcome, ApplyStatus, ApplySummary, Generation, RecordDelta};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

const NO_CHANGES: &str = "No changes found.";

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// A progress bar on stderr, hidden when quiet or not on a terminal.
pub fn progress_bar(global: &GlobalOpts, len: usize, message: &'static str) -> ProgressBar {
    if global.quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})")
            .expect("progress template is valid")
            .progress_chars("=> "),
    );
    bar.set_message(message);
    bar
}

// ── Policy listing (process) ─────────────────────────────────────────

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
}

#[derive(Serialize)]
struct PolicySummary<'a> {
    policy_id: u64,
    name: &'a str,
    srcintf: Vec<String>,
    dstintf: Vec<String>,
}

pub fn render_policies(format: &OutputFormat, generation: &Generation) -> String {
    let summaries: Vec<PolicySummary<'_>> = generation
        .iter()
        .map(|(id, record)| PolicySummary {
            policy_id: id.get(),
            name: record.name(),
            srcintf: record.interfaces(SRCINTF_FIELD),
            dstintf: record.interfaces(DSTINTF_FIELD),
        })
        .collect();

    match format {
        OutputFormat::Table => {
            let rows: Vec<PolicyRow> = summaries
                .iter()
                .map(|p| PolicyRow {
                    id: p.policy_id,
                    name: p.name.to_owned(),
                    from: p.srcintf.join(", "),
                    to: p.dstintf.join(", "),
                })
                .collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(&summaries),
        OutputFormat::JsonCompact => render_json_compact(&summaries),
        OutputFormat::Yaml => render_yaml(&summaries),
        OutputFormat::Plain => {
            let mut out = String::new();
            for p in &summaries {
                let _ = writeln!(out, "Policy ID {}: {}", p.policy_id, p.name);
                let _ = writeln!(out, "  From: {}", p.srcintf.join(", "));
                let _ = writeln!(out, "  To: {}", p.dstintf.join(", "));
                out.push('\n');
            }
            out.trim_end().to_owned()
        }
    }
}

// ── Change report (compare, update, batch-replace) ───────────────────

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

pub fn render_changes(format: &OutputFormat, deltas: &[RecordDelta], color: bool) -> String {
    match format {
        OutputFormat::Table if deltas.is_empty() => NO_CHANGES.to_owned(),
        OutputFormat::Table => {
            let rows: Vec<ChangeRow> = deltas
                .iter()
                .flat_map(|delta| {
                    delta.field_deltas.iter().map(|(field, change)| ChangeRow {
                        id: delta.policy_id.get(),
                        name: delta.name.clone(),
                        field: field.clone(),
                        before: change.original.join(", "),
                        after: change.modified.join(", "),
                    })
                })
                .collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(deltas),
        OutputFormat::JsonCompact => render_json_compact(deltas),
        OutputFormat::Yaml => render_yaml(deltas),
        OutputFormat::Plain => render_changes_plain(deltas, color),
    }
}

fn render_changes_plain(deltas: &[RecordDelta], color: bool) -> String {
    if deltas.is_empty() {
        return NO_CHANGES.to_owned();
    }
    let mut out = String::from("Found changes:\n\n");
    for delta in deltas {
        let header = format!("Policy ID {}: {}", delta.policy_id, delta.name);
        if color {
            let _ = writeln!(out, "{}", header.bold());
        } else {
            let _ = writeln!(out, "{header}");
        }
        for (field, change) in &delta.field_deltas {
            let before = change.original.join(", ");
            let after = change.modified.join(", ");
            if color {
                let _ = writeln!(out, "  {field}: {} -> {}", before.red(), after.green());
            } else {
                let _ = writeln!(out, "  {field}: {before} -> {after}");
            }
        }
        out.push('\n');
    }
    out.trim_end().to_owned()
}

// ── Apply results (update) ───────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Method")]
    method: &'static str,
    #[tabled(rename = "Failed Fields")]
    failed: String,
}

#[derive(Serialize)]
struct ApplyReport<'a> {
    outcomes: &'a [ApplyOutcome],
    summary: &'a ApplySummary,
}

fn status_label(status: ApplyStatus) -> &'static str {
    match status {
        ApplyStatus::Success => "success",
        ApplyStatus::PartialFailure => "partial",
        ApplyStatus::Failure => "failed",
    }
}

pub fn render_outcomes(
    format: &OutputFormat,
    outcomes: &[ApplyOutcome],
    summary: &ApplySummary,
    color: bool,
) -> String {
    let report = ApplyReport { outcomes, summary };
    match format {
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = outcomes
                .iter()
                .map(|o| OutcomeRow {
                    id: o.policy_id.get(),
                    name: o.name.clone(),
                    status: paint_status(o.status, color),
                    method: if o.used_fallback { "per-field" } else { "whole" },
                    failed: o
                        .failed_fields()
                        .map(|f| f.field.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect();
            format!("{}\n{}", render_table(&rows), summary_line(summary))
        }
        OutputFormat::Json => render_json_pretty(&report),
        OutputFormat::JsonCompact => render_json_compact(&report),
        OutputFormat::Yaml => render_yaml(&report),
        OutputFormat::Plain => {
            let mut out = String::new();
            for o in outcomes {
                let _ = writeln!(
                    out,
                    "Policy ID {}: {}",
                    o.policy_id,
                    paint_status(o.status, color)
                );
                for f in o.failed_fields() {
                    let _ = writeln!(
                        out,
                        "  {}: {}",
                        f.field,
                        f.error.as_deref().unwrap_or_default()
                    );
                }
            }
            out.push_str(&summary_line(summary));
            out
        }
    }
}

fn paint_status(status: ApplyStatus, color: bool) -> String {
    let label = status_label(status);
    if !color {
        return label.to_owned();
    }
    match status {
        ApplyStatus::Success => label.green().to_string(),
        ApplyStatus::PartialFailure => label.yellow().to_string(),
        ApplyStatus::Failure => label.red().to_string(),
    }
}

fn summary_line(summary: &ApplySummary) -> String {
    format!(
        "Updated {} of {} policies ({} partial, {} failed, {} failed fields)",
        summary.succeeded,
        summary.total(),
        summary.partial,
        summary.failed,
        summary.failed_fields
    )
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json_pretty<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

fn render_json_compact<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}
