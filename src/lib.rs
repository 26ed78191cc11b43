//! vcim: 複数のアイデンティティソースから連絡先カードを取り込み、
//! 共有メールアドレスで重複を畳み込むインポーター

pub mod card;
pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod importer;
pub mod logging;
pub mod merge;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod source;
pub mod store;
