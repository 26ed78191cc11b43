//! 環境変数とパスのユーティリティ

use std::path::PathBuf;

/// VCIM のホームディレクトリを指定する環境変数
pub const VCIM_HOME_VAR: &str = "VCIM_HOME";

/// 環境変数ユーティリティ
pub struct EnvVar;

impl EnvVar {
    /// 環境変数を取得（空文字列はNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.is_empty())
    }
}

/// ユーザーのホームディレクトリ
fn home_dir() -> PathBuf {
    EnvVar::get("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 先頭の `~` をホームディレクトリに展開
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

/// VCIM のデータディレクトリ（`$VCIM_HOME`、未設定なら `~/.vcim`）
pub fn vcim_home() -> PathBuf {
    EnvVar::get(VCIM_HOME_VAR)
        .map(|p| expand_home(&p))
        .unwrap_or_else(|| home_dir().join(".vcim"))
}

/// 既定の GnuPG ホーム（`$GNUPGHOME`、未設定なら `~/.gnupg`）
pub fn default_gnupg_home() -> PathBuf {
    EnvVar::get("GNUPGHOME")
        .map(|p| expand_home(&p))
        .unwrap_or_else(|| home_dir().join(".gnupg"))
}
