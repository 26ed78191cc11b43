//! vcim importers コマンド
//!
//! 設定から組み立てたインポーターを登録順に表示する。

use super::load_config;
use crate::importer::Importer;
use crate::registry::ImporterRegistry;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// Path to config.toml (default: $VCIM_HOME/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ImporterRow {
    id: String,
    kind: &'static str,
    source: String,
    active: bool,
}

impl ImporterRow {
    fn new(importer: &dyn Importer) -> Self {
        Self {
            id: importer.id().to_string(),
            kind: importer.kind().as_str(),
            source: importer.source().describe(),
            active: importer.is_active(),
        }
    }
}

fn rows(registry: &ImporterRegistry) -> Vec<ImporterRow> {
    registry.iter().map(|i| ImporterRow::new(i.as_ref())).collect()
}

pub async fn run(args: Args) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let registry = config.build_registry().map_err(|e| e.to_string())?;
    let rows = rows(&registry);

    if args.json {
        return serde_json::to_string_pretty(&rows)
            .map(|json| println!("{json}"))
            .map_err(|e| format!("Failed to serialize importers: {}", e));
    }

    if rows.is_empty() {
        println!("No importers configured.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Kind", "Source", "Active"]);

    for row in &rows {
        let (label, color) = if row.active {
            ("yes", Color::Green)
        } else {
            ("no", Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&row.id),
            Cell::new(row.kind),
            Cell::new(&row.source),
            Cell::new(label).fg(color),
        ]);
    }

    println!("{table}");
    Ok(())
}
