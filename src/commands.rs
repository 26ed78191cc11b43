use crate::cli::{Cli, Command};
use crate::config::Config;
use std::path::Path;

pub mod import;
pub mod importers;
pub mod list;

pub async fn dispatch(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Import(args) => import::run(args).await,
        Command::Importers(args) => importers::run(args).await,
        Command::List(args) => list::run(args).await,
    }
}

/// `--config` 指定（なければ既定パス）から設定を読む
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, String> {
    Config::load_or_default(path).map_err(|e| format!("Failed to load config: {}", e))
}
