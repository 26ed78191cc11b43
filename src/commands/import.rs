//! vcim import コマンド
//!
//! 設定されたインポーターを実行し、アドレス帳ストアへ反映する。

use super::load_config;
use crate::importer::RunStatus;
use crate::orchestrator::{ImportEntry, ImportReport, Orchestrator, OrchestratorOptions};
use crate::output::CommandSummary;
use crate::store::JsonCardStore;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// Path to config.toml (default: $VCIM_HOME/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run only the given importers (id like "gpg/0" or kind like "gpg")
    #[arg(long, value_name = "ID")]
    pub only: Vec<String>,

    /// Scan and merge without writing to the address book
    #[arg(long)]
    pub dry_run: bool,

    /// Output the report in JSON format
    #[arg(long)]
    pub json: bool,
}

/// JSON 出力用の1インポーター分
#[derive(Debug, Clone, Serialize)]
struct EntryView<'a> {
    importer: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    cards: usize,
    malformed: Vec<&'a str>,
    dropped: usize,
    inserted: usize,
    merged: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    store_errors: Vec<&'a str>,
}

impl<'a> From<&'a ImportEntry> for EntryView<'a> {
    fn from(entry: &'a ImportEntry) -> Self {
        let (status, cause, message) = match &entry.run.status {
            RunStatus::Succeeded => ("succeeded", None, None),
            RunStatus::SkippedDisabled => ("skipped", None, None),
            RunStatus::Failed { cause, message } => ("failed", Some(*cause), Some(message.as_str())),
        };

        Self {
            importer: entry.importer(),
            status,
            cause,
            message,
            cards: entry.run.card_count(),
            malformed: entry.run.malformed.iter().map(|m| m.token.as_str()).collect(),
            dropped: entry.run.dropped,
            inserted: entry.inserted,
            merged: entry.merged,
            store_errors: entry.store_errors.iter().map(String::as_str).collect(),
        }
    }
}

pub async fn run(args: Args) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;

    let registry = config
        .build_registry()
        .and_then(|r| r.select(&args.only))
        .map_err(|e| e.to_string())?;
    let orchestrator = Orchestrator::new(registry, OrchestratorOptions::from(&config.import));

    let report = if args.dry_run {
        ImportReport::from_runs(orchestrator.run_all().await)
    } else {
        let mut store = JsonCardStore::with_path(config.store_path());
        orchestrator.run_and_store(&mut store).await
    };

    if args.json {
        print_json(&report)?;
    } else {
        print_table(&report, args.dry_run);
    }

    if report.has_failures() {
        return Err(failure_message(&report));
    }
    Ok(())
}

fn failure_message(report: &ImportReport) -> String {
    match (report.failed(), report.store_error_count()) {
        (f, 0) => format!("{} importer(s) failed", f),
        (0, s) => format!("{} card(s) could not be stored", s),
        (f, s) => format!("{} importer(s) failed, {} card(s) could not be stored", f, s),
    }
}

fn print_json(report: &ImportReport) -> Result<(), String> {
    let views: Vec<EntryView> = report.entries().iter().map(EntryView::from).collect();
    serde_json::to_string_pretty(&views)
        .map(|json| println!("{json}"))
        .map_err(|e| format!("Failed to serialize report: {}", e))
}

fn print_table(report: &ImportReport, dry_run: bool) {
    if report.entries().is_empty() {
        println!("No importers configured.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Importer", "Status", "Cards", "Stored", "Detail"]);

    for entry in report.entries() {
        let (color, detail) = match &entry.run.status {
            RunStatus::Succeeded => (Color::Green, success_detail(entry)),
            RunStatus::SkippedDisabled => (Color::DarkGrey, "disabled".to_string()),
            RunStatus::Failed { cause, message } => (Color::Red, format!("{}: {}", cause, message)),
        };
        let stored = if dry_run {
            "-".to_string()
        } else {
            format!("+{} / ~{}", entry.inserted, entry.merged)
        };

        table.add_row(vec![
            Cell::new(entry.importer()),
            Cell::new(entry.run.status.display_name()).fg(color),
            Cell::new(entry.run.card_count()),
            Cell::new(stored),
            Cell::new(detail),
        ]);
    }

    println!("{table}");

    let summary = CommandSummary::format(report.succeeded(), report.failed(), report.total_cards());
    if dry_run {
        println!("\n{} {}", "(dry run)".dimmed(), summary);
    } else {
        println!("\n{}", summary);
    }

    let with_store_errors: Vec<&ImportEntry> = report
        .entries()
        .iter()
        .filter(|e| !e.store_errors.is_empty())
        .collect();
    if !with_store_errors.is_empty() {
        println!("\n{}", "Store errors:".red().bold());
        for entry in with_store_errors {
            for error in &entry.store_errors {
                println!("  {}: {}", entry.importer().red(), error);
            }
        }
    }
}

/// 成功時の補足（不正レコード・破棄グループ）
fn success_detail(entry: &ImportEntry) -> String {
    let mut parts = Vec::new();
    if !entry.run.malformed.is_empty() {
        parts.push(format!("{} malformed", entry.run.malformed.len()));
    }
    if entry.run.dropped > 0 {
        parts.push(format!("{} without email", entry.run.dropped));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
