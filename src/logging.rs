//! ログ出力の初期化
//!
//! 優先順位: `VCIM_LOG` > `--verbose` > `warn`。
//! stdout は `--json` 出力に使うため、ログは常に stderr へ出す。

use crate::env::EnvVar;
use tracing_subscriber::EnvFilter;

/// フィルタ指定を読む環境変数
pub const LOG_ENV_VAR: &str = "VCIM_LOG";

/// 使用するフィルタ文字列を決める
pub fn filter_directive(verbose: bool) -> String {
    match EnvVar::get(LOG_ENV_VAR) {
        Some(directive) => directive,
        None if verbose => "vcim=debug".to_string(),
        None => "warn".to_string(),
    }
}

/// グローバルなサブスクライバを設定（2回目以降は何もしない）
pub fn init(verbose: bool) {
    let directive = filter_directive(verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
