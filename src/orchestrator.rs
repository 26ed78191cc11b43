//! インポートオーケストレーター
//!
//! レジストリの全インポーターを上限付きで並行実行し、結果を登録順に集める。
//! 1つのインポーターの失敗・タイムアウトは他のインポーターに影響しない。
//! ストアへの反映は全インポーター完了後、登録順・カード作成順で直列に行う。

mod report;

pub use report::{ImportEntry, ImportReport};

use crate::config::ImportSettings;
use crate::importer::{produce_cards, ImportRun};
use crate::registry::ImporterRegistry;
use crate::store::{CardStore, UpsertOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

/// 実行オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// 同時実行数（0 は 1 として扱う）
    pub concurrency: usize,
    /// インポーターごとのタイムアウト
    pub timeout: Option<Duration>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from(&ImportSettings::default())
    }
}

impl From<&ImportSettings> for OrchestratorOptions {
    fn from(settings: &ImportSettings) -> Self {
        Self {
            concurrency: settings.concurrency,
            timeout: settings.timeout(),
        }
    }
}

pub struct Orchestrator {
    registry: ImporterRegistry,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(registry: ImporterRegistry, options: OrchestratorOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &ImporterRegistry {
        &self.registry
    }

    /// 全インポーターを実行（結果は登録順）
    pub async fn run_all(&self) -> Vec<ImportRun> {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let timeout = self.options.timeout;

        let mut tasks = Vec::with_capacity(self.registry.len());
        for importer in self.registry.iter() {
            let importer = Arc::clone(importer);
            let semaphore = Arc::clone(&semaphore);
            let id = importer.id().to_string();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                produce_cards(importer.as_ref(), timeout).await
            });
            tasks.push((id, handle));
        }

        let mut runs = Vec::with_capacity(tasks.len());
        for (id, handle) in tasks {
            let run = match handle.await {
                Ok(run) => run,
                Err(e) => {
                    error!(importer = %id, error = %e, "importer task aborted");
                    ImportRun::failed_with(id, "panicked", e.to_string())
                }
            };
            runs.push(run);
        }
        runs
    }

    /// 全インポーターを実行し、成功分のカードをストアへ反映
    ///
    /// ストアのエラーはインポーター単位で記録し、残りのカードの反映は続ける。
    /// 永続化はインポーターごとに1回。失敗したらそのインポーターの反映分は
    /// すべてストアエラーとして扱う。
    pub async fn run_and_store(&self, store: &mut dyn CardStore) -> ImportReport {
        let runs = self.run_all().await;
        let mut entries = Vec::with_capacity(runs.len());

        for run in runs {
            let mut entry = ImportEntry::new(run);
            for card in entry.run.cards.clone() {
                match store.upsert(card) {
                    Ok(UpsertOutcome::Inserted) => entry.inserted += 1,
                    Ok(UpsertOutcome::Merged { .. }) => entry.merged += 1,
                    Err(e) => {
                        warn!(importer = %entry.run.importer, error = %e, "store upsert failed");
                        entry.store_errors.push(e.to_string());
                    }
                }
            }
            flush_entry(store, &mut entry);
            debug!(
                importer = %entry.run.importer,
                inserted = entry.inserted,
                merged = entry.merged,
                "cards stored"
            );
            entries.push(entry);
        }

        ImportReport::new(entries)
    }
}

/// 1インポーター分の変更を永続化（失敗時は反映数をストアエラーへ振り替え）
fn flush_entry(store: &mut dyn CardStore, entry: &mut ImportEntry) {
    let pending = entry.inserted + entry.merged;
    if pending == 0 {
        return;
    }
    if let Err(e) = store.flush() {
        warn!(importer = %entry.run.importer, error = %e, cards = pending, "store flush failed");
        let message = e.to_string();
        entry
            .store_errors
            .extend(std::iter::repeat(message).take(pending));
        entry.inserted = 0;
        entry.merged = 0;
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
