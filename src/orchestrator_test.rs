use super::*;
use crate::card::Card;
use crate::config::DemoConfig;
use crate::error::{Result, VcimError};
use crate::importer::{DemoImporter, Importer, ImporterKind, RunStatus};
use crate::source::{IdentitySnapshot, IdentitySource, RawIdentity, SubIdentity};
use crate::store::MemoryCardStore;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 遅延付きのソース（同時実行数を記録する）
struct DelayedSource {
    delay: Duration,
    identities: Vec<RawIdentity>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl DelayedSource {
    async fn scan(&self) -> Result<IdentitySnapshot> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.identities.iter().cloned().map(Ok).collect())
    }
}

impl IdentitySource for DelayedSource {
    fn describe(&self) -> String {
        "delayed".to_string()
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(self.scan())
    }
}

struct RefusingSource;

impl IdentitySource for RefusingSource {
    fn describe(&self) -> String {
        "refusing".to_string()
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(async {
            Err::<IdentitySnapshot, _>(VcimError::unavailable("refusing", "connection refused"))
        })
    }
}

struct FakeImporter {
    id: String,
    active: bool,
    source: Box<dyn IdentitySource>,
}

impl FakeImporter {
    fn new(id: &str, source: impl IdentitySource + 'static) -> Self {
        Self {
            id: id.to_string(),
            active: true,
            source: Box::new(source),
        }
    }

    fn disabled(mut self) -> Self {
        self.active = false;
        self
    }
}

impl Importer for FakeImporter {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ImporterKind {
        ImporterKind::Json
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn source(&self) -> &dyn IdentitySource {
        self.source.as_ref()
    }

    fn key_value(&self, token: &str) -> String {
        format!("urn:test:{}", token)
    }
}

/// 常に失敗するストア
struct ReadOnlyStore;

impl CardStore for ReadOnlyStore {
    fn upsert(&mut self, _card: Card) -> Result<UpsertOutcome> {
        Err(VcimError::Store("read-only".to_string()))
    }

    fn cards(&mut self) -> Result<Vec<Card>> {
        Ok(Vec::new())
    }
}

/// flush 回数を数えるストア（失敗させることもできる）
#[derive(Default)]
struct FlushCountingStore {
    inner: MemoryCardStore,
    flushes: usize,
    fail_flush: bool,
}

impl CardStore for FlushCountingStore {
    fn upsert(&mut self, card: Card) -> Result<UpsertOutcome> {
        self.inner.upsert(card)
    }

    fn cards(&mut self) -> Result<Vec<Card>> {
        self.inner.cards()
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        if self.fail_flush {
            return Err(VcimError::Store("disk full".to_string()));
        }
        Ok(())
    }
}

fn person(token: &str, email: &str) -> RawIdentity {
    RawIdentity::new(token, vec![SubIdentity::new(Some(email), None)])
}

fn delayed(millis: u64, identities: Vec<RawIdentity>) -> DelayedSource {
    DelayedSource {
        delay: Duration::from_millis(millis),
        identities,
        in_flight: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
    }
}

fn registry(importers: Vec<Arc<dyn Importer>>) -> ImporterRegistry {
    let mut registry = ImporterRegistry::new();
    for importer in importers {
        registry.register(importer).unwrap();
    }
    registry
}

fn options(concurrency: usize, timeout: Option<Duration>) -> OrchestratorOptions {
    OrchestratorOptions {
        concurrency,
        timeout,
    }
}

#[tokio::test]
async fn test_one_failure_does_not_block_others() {
    let orchestrator = Orchestrator::new(
        registry(vec![
            Arc::new(FakeImporter::new("broken", RefusingSource)),
            Arc::new(DemoImporter::from_config(0, &DemoConfig::default())),
        ]),
        OrchestratorOptions::default(),
    );

    let runs = orchestrator.run_all().await;
    assert_eq!(runs.len(), 2);
    assert!(matches!(
        runs[0].status,
        RunStatus::Failed { cause: "source_unavailable", .. }
    ));
    assert_eq!(runs[1].status, RunStatus::Succeeded);
    assert_eq!(runs[1].card_count(), 1);
}

#[tokio::test]
async fn test_results_follow_registration_order() {
    // 先に登録したものほど遅く終わる
    let orchestrator = Orchestrator::new(
        registry(vec![
            Arc::new(FakeImporter::new("slow", delayed(80, vec![person("s", "s@x.com")]))),
            Arc::new(FakeImporter::new("mid", delayed(40, vec![person("m", "m@x.com")]))),
            Arc::new(FakeImporter::new("fast", delayed(0, vec![person("f", "f@x.com")]))),
        ]),
        options(3, None),
    );

    let mut store = MemoryCardStore::new();
    let report = orchestrator.run_and_store(&mut store).await;

    let ids: Vec<&str> = report.entries().iter().map(|e| e.importer()).collect();
    assert_eq!(ids, vec!["slow", "mid", "fast"]);

    let emails: Vec<String> = store
        .cards()
        .unwrap()
        .iter()
        .map(|c| c.emails()[0].to_string())
        .collect();
    assert_eq!(emails, vec!["s@x.com", "m@x.com", "f@x.com"]);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let importers: Vec<Arc<dyn Importer>> = (0..5)
        .map(|i| {
            let source = DelayedSource {
                delay: Duration::from_millis(30),
                identities: vec![person(&format!("t{}", i), &format!("p{}@x.com", i))],
                in_flight: in_flight.clone(),
                peak: peak.clone(),
            };
            Arc::new(FakeImporter::new(&format!("json/{}", i), source)) as Arc<dyn Importer>
        })
        .collect();

    let runs = Orchestrator::new(registry(importers), options(2, None))
        .run_all()
        .await;

    assert!(runs.iter().all(|r| r.status.is_success()));
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn test_timeout_only_fails_that_importer() {
    let orchestrator = Orchestrator::new(
        registry(vec![
            Arc::new(FakeImporter::new("stalled", delayed(60_000, vec![]))),
            Arc::new(FakeImporter::new("quick", delayed(0, vec![person("q", "q@x.com")]))),
        ]),
        options(4, Some(Duration::from_millis(50))),
    );

    let report = ImportReport::from_runs(orchestrator.run_all().await);
    assert!(matches!(
        report.get("stalled").unwrap().run.status,
        RunStatus::Failed { cause: "timeout", .. }
    ));
    assert!(report.get("quick").unwrap().run.status.is_success());
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
}

#[tokio::test]
async fn test_disabled_importer_is_skipped_not_failed() {
    let orchestrator = Orchestrator::new(
        registry(vec![Arc::new(
            FakeImporter::new("off", delayed(0, vec![person("o", "o@x.com")])).disabled(),
        )]),
        OrchestratorOptions::default(),
    );

    let mut store = MemoryCardStore::new();
    let report = orchestrator.run_and_store(&mut store).await;
    assert_eq!(report.skipped(), 1);
    assert!(!report.has_failures());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_store_dedups_across_importers() {
    let orchestrator = Orchestrator::new(
        registry(vec![
            Arc::new(DemoImporter::from_config(0, &DemoConfig::default())),
            Arc::new(FakeImporter::new(
                "json/0",
                delayed(0, vec![person("rogers", "mr@rogers.com")]),
            )),
        ]),
        OrchestratorOptions::default(),
    );

    let mut store = MemoryCardStore::new();
    let report = orchestrator.run_and_store(&mut store).await;

    assert_eq!(report.get("demo/0").unwrap().inserted, 1);
    assert_eq!(report.get("json/0").unwrap().merged, 1);
    assert_eq!(report.total_cards(), 2);

    let cards = store.cards().unwrap();
    assert_eq!(cards.len(), 1);
    let keys: Vec<&str> = cards[0].values(crate::card::LineName::Key).collect();
    assert_eq!(keys, vec!["urn:x-vcim-demo:mr@rogers.com", "urn:test:rogers"]);
}

#[tokio::test]
async fn test_store_errors_are_reported_per_importer() {
    let orchestrator = Orchestrator::new(
        registry(vec![Arc::new(DemoImporter::from_config(
            0,
            &DemoConfig::default(),
        ))]),
        OrchestratorOptions::default(),
    );

    let mut store = ReadOnlyStore;
    let report = orchestrator.run_and_store(&mut store).await;

    let entry = report.get("demo/0").unwrap();
    assert!(entry.run.status.is_success());
    assert_eq!(entry.run.card_count(), 1);
    assert_eq!(entry.store_errors.len(), 1);
    assert!(report.has_failures());
    assert_eq!(report.store_error_count(), 1);
}

#[tokio::test]
async fn test_store_is_flushed_once_per_importer() {
    let many: Vec<RawIdentity> = (0..50)
        .map(|i| person(&format!("t{}", i), &format!("p{}@x.com", i)))
        .collect();
    let orchestrator = Orchestrator::new(
        registry(vec![
            Arc::new(FakeImporter::new("json/0", delayed(0, many))),
            Arc::new(FakeImporter::new("json/1", delayed(0, vec![person("q", "q@x.com")]))),
            Arc::new(FakeImporter::new("broken", RefusingSource)),
        ]),
        OrchestratorOptions::default(),
    );

    let mut store = FlushCountingStore::default();
    let report = orchestrator.run_and_store(&mut store).await;

    assert_eq!(report.get("json/0").unwrap().inserted, 50);
    assert_eq!(store.flushes, 2);
}

#[tokio::test]
async fn test_failed_flush_turns_cards_into_store_errors() {
    let orchestrator = Orchestrator::new(
        registry(vec![Arc::new(FakeImporter::new(
            "json/0",
            delayed(0, vec![person("a", "a@x.com"), person("b", "b@x.com")]),
        ))]),
        OrchestratorOptions::default(),
    );

    let mut store = FlushCountingStore {
        fail_flush: true,
        ..FlushCountingStore::default()
    };
    let report = orchestrator.run_and_store(&mut store).await;

    let entry = report.get("json/0").unwrap();
    assert_eq!(entry.inserted, 0);
    assert_eq!(entry.merged, 0);
    assert_eq!(entry.store_errors.len(), 2);
    assert!(entry.store_errors[0].contains("disk full"));
    assert_eq!(report.store_error_count(), 2);
    assert!(report.has_failures());
}

#[test]
fn test_options_from_settings() {
    let settings = ImportSettings {
        concurrency: 3,
        timeout_secs: 0,
    };
    assert_eq!(OrchestratorOptions::from(&settings), options(3, None));
    assert_eq!(
        OrchestratorOptions::default().timeout,
        Some(Duration::from_secs(30))
    );
}
