//! 生アイデンティティソースの読み取り
//!
//! 各ソース種別（GnuPG キーリング、JSON ファイル、HTTP、固定データ）がこの trait を実装する。
//! 使う側は具体的なソースを意識せず `list_identities()` を呼ぶだけ。
//!
//! ## 使い方
//!
//! ```ignore
//! let source = GnuPgSource::new("/home/me/.gnupg");
//! let snapshot = source.list_identities().await?;
//! for entry in snapshot.entries() { ... }
//! ```

mod document;
mod fixed;
mod gnupg;
mod http;
mod json_file;

pub use document::parse_identity_document;
pub use fixed::StaticSource;
pub use gnupg::{parse_colon_listing, GnuPgSource};
pub use http::HttpSource;
pub use json_file::JsonFileSource;

use crate::error::Result;
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

/// キーの下位アイデンティティ（GnuPG の uid に相当）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubIdentity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SubIdentity {
    pub fn new(email: Option<&str>, name: Option<&str>) -> Self {
        Self {
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        }
    }
}

/// 1つの識別トークンに属する生レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIdentity {
    pub token: String,
    pub uids: Vec<SubIdentity>,
}

impl RawIdentity {
    pub fn new(token: impl Into<String>, uids: Vec<SubIdentity>) -> Self {
        Self {
            token: token.into(),
            uids,
        }
    }
}

/// 解析できなかったレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// 分かる範囲での識別子（キーID やエントリ番号）
    pub token: String,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// スナップショットの1エントリ
pub type SnapshotEntry = std::result::Result<RawIdentity, MalformedRecord>;

/// ある時点でソースから得られた全アイデンティティ（ソースの列挙順）
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    entries: Vec<SnapshotEntry>,
}

impl IdentitySnapshot {
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SnapshotEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 不正レコード数
    pub fn malformed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_err()).count()
    }
}

impl FromIterator<SnapshotEntry> for IdentitySnapshot {
    fn from_iter<T: IntoIterator<Item = SnapshotEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// 生アイデンティティソースの抽象化
///
/// 呼び出しごとに一回きりのスナップショットを返す。外部状態は変更しない。
/// 接続不能は `SourceUnavailable`、全体が読めないデータは `MalformedData` で返す。
pub trait IdentitySource: Send + Sync {
    /// ソース名（ログ・エラー表示用）
    fn describe(&self) -> String;

    /// 現在のアイデンティティ一覧を取得
    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>>;
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
