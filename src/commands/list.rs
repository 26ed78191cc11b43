//! vcim list コマンド
//!
//! アドレス帳ストアのカードを表示する。

use super::load_config;
use crate::card::{Card, LineName};
use crate::store::{CardStore, JsonCardStore};
use clap::{Parser, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
    Vcard,
}

#[derive(Debug, Parser)]
pub struct Args {
    /// Path to config.toml (default: $VCIM_HOME/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: Format,

    /// Show only cards whose email or name contains this text
    pub filter: Option<String>,
}

pub async fn run(args: Args) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let mut store = JsonCardStore::with_path(config.store_path());
    let cards = store.cards().map_err(|e| e.to_string())?;
    let total = cards.len();

    let cards = filter_cards(cards, args.filter.as_deref());

    match args.format {
        Format::Json => print_json(&cards)?,
        Format::Vcard => print_vcards(&cards),
        Format::Table => print_table(&cards, total),
    }
    Ok(())
}

fn filter_cards(cards: Vec<Card>, filter: Option<&str>) -> Vec<Card> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(needle) => cards.into_iter().filter(|c| c.matches(needle)).collect(),
        None => cards,
    }
}

fn print_json(cards: &[Card]) -> Result<(), String> {
    serde_json::to_string_pretty(cards)
        .map(|json| println!("{json}"))
        .map_err(|e| format!("Failed to serialize cards: {}", e))
}

fn print_vcards(cards: &[Card]) {
    for card in cards {
        print!("{}", card.to_vcard());
    }
}

fn print_table(cards: &[Card], total: usize) {
    if cards.is_empty() {
        if total == 0 {
            println!("Address book is empty");
        } else {
            println!("No cards matched");
        }
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Emails", "Keys"]);

    for card in cards {
        table.add_row(vec![
            card.display_name().unwrap_or("-").to_string(),
            card.emails().join("\n"),
            card.values(LineName::Key).count().to_string(),
        ]);
    }

    println!("{table}");
    println!("{} of {} card(s)", cards.len(), total);
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
