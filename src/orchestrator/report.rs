//! 実行レポート

use crate::importer::{ImportRun, RunStatus};

/// 1インポーター分の結果（ストア反映を含む）
#[derive(Debug, Clone)]
pub struct ImportEntry {
    pub run: ImportRun,
    /// 新規追加されたカード数
    pub inserted: usize,
    /// 既存カードへ統合されたカード数
    pub merged: usize,
    pub store_errors: Vec<String>,
}

impl ImportEntry {
    pub fn new(run: ImportRun) -> Self {
        Self {
            run,
            inserted: 0,
            merged: 0,
            store_errors: Vec::new(),
        }
    }

    pub fn importer(&self) -> &str {
        &self.run.importer
    }

    /// インポート失敗またはストアエラーがあるか
    pub fn has_failure(&self) -> bool {
        self.run.status.is_failure() || !self.store_errors.is_empty()
    }
}

/// オーケストレーター1回分のレポート（登録順）
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    entries: Vec<ImportEntry>,
}

impl ImportReport {
    pub fn new(entries: Vec<ImportEntry>) -> Self {
        Self { entries }
    }

    /// ストアを使わない実行結果からレポートを作る
    pub fn from_runs(runs: Vec<ImportRun>) -> Self {
        Self::new(runs.into_iter().map(ImportEntry::new).collect())
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }

    pub fn get(&self, importer: &str) -> Option<&ImportEntry> {
        self.entries.iter().find(|e| e.importer() == importer)
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, RunStatus::Succeeded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RunStatus::SkippedDisabled))
    }

    pub fn failed(&self) -> usize {
        self.count(RunStatus::is_failure)
    }

    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.run.card_count()).sum()
    }

    pub fn store_error_count(&self) -> usize {
        self.entries.iter().map(|e| e.store_errors.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(ImportEntry::has_failure)
    }

    fn count(&self, pred: impl Fn(&RunStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.run.status)).count()
    }
}
