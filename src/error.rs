use std::time::Duration;
use thiserror::Error;

/// VCIM統一エラー型
#[derive(Debug, Error)]
pub enum VcimError {
    #[error("Source unavailable ({source_name}): {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    #[error("Malformed data for '{token}': {message}")]
    MalformedData { token: String, message: String },

    #[error("Importer {importer} timed out after {}s", .after.as_secs())]
    Timeout { importer: String, after: Duration },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Importer registry error: {0}")]
    Registry(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, VcimError>;

impl VcimError {
    /// ソース到達不能エラーを作成
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        VcimError::SourceUnavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// 不正データエラーを作成
    pub fn malformed(token: impl Into<String>, message: impl Into<String>) -> Self {
        VcimError::MalformedData {
            token: token.into(),
            message: message.into(),
        }
    }

    /// リトライ可能なエラーかどうか
    ///
    /// 一時的な到達不能・タイムアウト・ネットワーク障害のみリトライ対象。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VcimError::SourceUnavailable { .. } | VcimError::Timeout { .. } | VcimError::Network(_)
        )
    }

    /// レポート用の原因タグ
    pub fn cause(&self) -> &'static str {
        match self {
            VcimError::SourceUnavailable { .. } => "source_unavailable",
            VcimError::MalformedData { .. } => "malformed_data",
            VcimError::Timeout { .. } => "timeout",
            VcimError::Store(_) => "store",
            VcimError::Config(_) => "config",
            VcimError::Registry(_) => "registry",
            VcimError::Network(_) => "network",
            VcimError::Io(_) => "io",
            VcimError::Json(_) | VcimError::TomlDe(_) => "parse",
        }
    }
}
