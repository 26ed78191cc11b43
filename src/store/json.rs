//! JSON ファイルのストア（状態マシン）
//!
//! ## 状態遷移図
//!
//! ```text
//!   ┌──────────┐  load()   ┌──────────┐  upsert()  ┌──────────┐
//!   │   Idle   │──────────▶│  Loaded  │───────────▶│ Modified │
//!   └──────────┘           └──────────┘            └────┬─────┘
//!        ▲                      ▲   flush() 成功        │
//!        │                      └───────────────────────┤
//!        │         flush() 失敗（未保存の変更を破棄）    │
//!        └──────────────────────────────────────────────┘
//! ```
//!
//! `upsert()` はメモリ上の帳簿だけを変更する。ファイルへの書き込みは `flush()` 時のみ。

use super::{merge_into, CardStore, UpsertOutcome};
use crate::card::Card;
use crate::error::{Result, VcimError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// 永続化ファイルの中身
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredBook {
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Loaded,
    Modified,
}

/// JSON ファイルに保存するアドレス帳
///
/// 書き込みは同じディレクトリの一時ファイル経由でアトミックに置換する。
pub struct JsonCardStore {
    path: PathBuf,
    state: State,
    book: Option<StoredBook>,
}

impl JsonCardStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: State::Idle,
            book: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルを読み込み（Idle → Loaded）
    pub fn load(&mut self) -> Result<&StoredBook> {
        let book = match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                VcimError::Store(format!("Failed to parse {}: {}", self.path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredBook::default(),
            Err(e) => return Err(VcimError::Io(e)),
        };

        self.state = State::Loaded;
        Ok(self.book.insert(book))
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.state == State::Idle || self.book.is_none() {
            self.load()?;
        }
        Ok(())
    }

    /// 変更を保存（Modified → Loaded）
    ///
    /// 失敗した場合は未保存の変更を破棄し、次回アクセス時にファイルから読み直す。
    pub fn save(&mut self) -> Result<()> {
        if self.state != State::Modified {
            return Ok(());
        }
        match self.write_book() {
            Ok(()) => {
                self.state = State::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unsaved cards");
                self.discard();
                Err(e)
            }
        }
    }

    /// メモリ上の帳簿を捨てる（→ Idle）
    pub fn discard(&mut self) {
        self.book = None;
        self.state = State::Idle;
    }

    fn write_book(&mut self) -> Result<()> {
        let book = self
            .book
            .as_mut()
            .ok_or_else(|| VcimError::Store("No address book loaded".to_string()))?;
        book.updated_at = Some(Utc::now());

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)
            .map_err(|e| VcimError::Store(format!("Failed to create temp file: {}", e)))?;

        let content = serde_json::to_string_pretty(book)?;
        temp_file.write_all(content.as_bytes())?;

        temp_file
            .persist(&self.path)
            .map_err(|e| VcimError::Store(format!("Failed to persist address book: {}", e)))?;

        debug!(path = %self.path.display(), cards = book.cards.len(), "address book saved");
        Ok(())
    }

    /// 未保存の変更があるか
    pub fn is_modified(&self) -> bool {
        self.state == State::Modified
    }

    /// 最終更新時刻
    pub fn updated_at(&mut self) -> Result<Option<DateTime<Utc>>> {
        self.ensure_loaded()?;
        Ok(self.book.as_ref().and_then(|b| b.updated_at))
    }
}

impl CardStore for JsonCardStore {
    /// 必要なら load → merge（保存は `flush()`）
    fn upsert(&mut self, card: Card) -> Result<UpsertOutcome> {
        self.ensure_loaded()?;
        let book = self
            .book
            .as_mut()
            .ok_or_else(|| VcimError::Store("No address book loaded".to_string()))?;

        let outcome = merge_into(&mut book.cards, card);
        if outcome != (UpsertOutcome::Merged { added_lines: 0 }) {
            self.state = State::Modified;
        }
        Ok(outcome)
    }

    fn flush(&mut self) -> Result<()> {
        self.save()
    }

    fn cards(&mut self) -> Result<Vec<Card>> {
        self.ensure_loaded()?;
        Ok(self.book.as_ref().map(|b| b.cards.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "json_test.rs"]
mod tests;
