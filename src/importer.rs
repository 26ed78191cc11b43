//! インポーターの抽象化
//!
//! ソース種別ごとに1つの実装を持ち、使う側は `Importer` trait と
//! `produce_cards()` だけを通じてカードを得る。
//!
//! ## 実行の状態遷移
//!
//! ```text
//!                ┌──────────┐
//!                │   Idle   │
//!                └────┬─────┘
//!          active?    │
//!        ┌─── no ─────┼───── yes ───┐
//!        ▼                          ▼
//! ┌─────────────────┐        ┌────────────┐
//! │ SkippedDisabled │        │  Scanning  │
//! └─────────────────┘        └─────┬──────┘
//!                                  │
//!                      ┌───────────┴───────────┐
//!                      ▼                       ▼
//!               ┌────────────┐          ┌────────────┐
//!               │ Succeeded  │          │ Failed(..) │
//!               └────────────┘          └────────────┘
//! ```

mod demo;
mod gnupg;
mod json;
mod remote;
mod run;

pub use demo::DemoImporter;
pub use gnupg::{GnuPgImporter, PGP_KEY_FORMAT_PREFIX};
pub use json::JsonImporter;
pub use remote::RemoteImporter;
pub use run::{ImportRun, RunStatus};

use crate::error::{Result, VcimError};
use crate::merge::{self, SourceGroup};
use crate::source::{IdentitySnapshot, IdentitySource, MalformedRecord, RawIdentity};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info, warn};

/// インポーター種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImporterKind {
    Gpg,
    Demo,
    Json,
    Http,
}

impl ImporterKind {
    /// 登録順（設定からレジストリを組み立てる順序）
    pub fn all() -> &'static [ImporterKind] {
        &[
            ImporterKind::Gpg,
            ImporterKind::Demo,
            ImporterKind::Json,
            ImporterKind::Http,
        ]
    }

    /// 設定キー / 識別子の接頭辞
    pub fn as_str(&self) -> &'static str {
        match self {
            ImporterKind::Gpg => "gpg",
            ImporterKind::Demo => "demo",
            ImporterKind::Json => "json",
            ImporterKind::Http => "http",
        }
    }

    /// 表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            ImporterKind::Gpg => "GnuPG keyring",
            ImporterKind::Demo => "Demo contact",
            ImporterKind::Json => "JSON file",
            ImporterKind::Http => "Remote endpoint",
        }
    }

    /// 種別ごとの `active` の既定値
    pub fn default_active(&self) -> bool {
        !matches!(self, ImporterKind::Http)
    }
}

impl fmt::Display for ImporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// インポーターの抽象化trait
///
/// 各ソース種別（GnuPG, Demo, JSON, HTTP）がこのtraitを実装する。
/// 設定（有効フラグ・接続パラメータ）はインポーター自身が保持する。
pub trait Importer: Send + Sync {
    /// インポーター識別子（"gpg/0" など）
    fn id(&self) -> &str;

    /// インポーター種別
    fn kind(&self) -> ImporterKind;

    /// 有効かどうか
    fn is_active(&self) -> bool;

    /// 生アイデンティティソース
    fn source(&self) -> &dyn IdentitySource;

    /// key 行の値をトークンから整形
    fn key_value(&self, token: &str) -> String;

    /// ソースをスキャン
    fn scan(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        self.source().list_identities()
    }

    /// 生レコードをソースグループに変換
    fn to_group(&self, raw: &RawIdentity) -> std::result::Result<SourceGroup, MalformedRecord> {
        let token = raw.token.trim();
        if token.is_empty() {
            return Err(MalformedRecord::new("(empty)", "identity token is empty"));
        }

        let mut group = SourceGroup::new(token, self.key_value(token));
        for uid in &raw.uids {
            if let Some(email) = uid.email.as_deref() {
                group.push_email(email);
            }
            if let Some(name) = uid.name.as_deref() {
                group.push_name(name);
            }
        }
        Ok(group)
    }
}

/// インポーターを1回実行してカードを得る
///
/// 無効なインポーターはソースに触れずに `SkippedDisabled` を返す。
/// ソースのエラーとタイムアウトは `Failed` として返し、呼び出し側へは伝播しない。
/// 不正なレコードはそのグループだけを捨てて続行する。
pub async fn produce_cards(importer: &dyn Importer, timeout: Option<Duration>) -> ImportRun {
    let id = importer.id().to_string();

    if !importer.is_active() {
        info!(importer = %id, "importer disabled, skipping");
        return ImportRun::skipped(id);
    }

    debug!(importer = %id, source = %importer.source().describe(), "scanning");
    let scanned = match timeout {
        Some(limit) => match tokio::time::timeout(limit, importer.scan()).await {
            Ok(result) => result,
            Err(_) => Err(VcimError::Timeout {
                importer: id.clone(),
                after: limit,
            }),
        },
        None => importer.scan().await,
    };

    let snapshot = match scanned {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(importer = %id, cause = e.cause(), error = %e, "importer failed");
            return ImportRun::failed(id, &e);
        }
    };

    let mut groups = Vec::with_capacity(snapshot.len());
    let mut malformed = Vec::new();
    for entry in snapshot.into_entries() {
        match entry.and_then(|raw| importer.to_group(&raw)) {
            Ok(group) => groups.push(group),
            Err(bad) => {
                warn!(importer = %id, token = %bad.token, reason = %bad.reason, "skipping malformed record");
                malformed.push(bad);
            }
        }
    }

    let outcome = merge::fold_with_outcome(groups);
    for token in &outcome.dropped {
        debug!(importer = %id, token = %token, "dropping identity without email");
    }
    info!(importer = %id, cards = outcome.cards.len(), "import finished");

    ImportRun::succeeded(id, outcome.cards, malformed, outcome.dropped.len())
}

#[cfg(test)]
#[path = "importer_test.rs"]
mod tests;
