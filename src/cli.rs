use clap::{Parser, Subcommand};

use crate::commands::{import, importers, list};

#[derive(Debug, Parser)]
#[command(name = "vcim")]
#[command(about = "Contact importer and address-book merger", long_about = None)]
pub struct Cli {
    /// Show debug logs on stderr (overridden by VCIM_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 設定されたソースから連絡先をインポート
    Import(import::Args),

    /// 設定されたインポーターの一覧
    Importers(importers::Args),

    /// アドレス帳のカード一覧
    List(list::Args),
}
