use super::*;
use crate::card::LineName;
use crate::config::{DemoConfig, GpgConfig};
use crate::source::{StaticSource, SubIdentity};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 呼び出し回数を数えるソース
struct CountingSource {
    calls: Arc<AtomicUsize>,
    entries: Vec<std::result::Result<RawIdentity, MalformedRecord>>,
}

impl IdentitySource for CountingSource {
    fn describe(&self) -> String {
        "counting".to_string()
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok::<_, VcimError>(IdentitySnapshot::new(self.entries.clone())) })
    }
}

/// 常に失敗するソース
struct BrokenSource;

impl IdentitySource for BrokenSource {
    fn describe(&self) -> String {
        "broken".to_string()
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(async { Err::<IdentitySnapshot, _>(VcimError::unavailable("broken", "connection refused")) })
    }
}

/// 応答しないソース
struct StalledSource;

impl IdentitySource for StalledSource {
    fn describe(&self) -> String {
        "stalled".to_string()
    }

    fn list_identities(&self) -> Pin<Box<dyn Future<Output = Result<IdentitySnapshot>> + Send + '_>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, VcimError>(IdentitySnapshot::default())
        })
    }
}

fn gpg_config(active: bool) -> GpgConfig {
    GpgConfig {
        active,
        gpg_home: Some("/nonexistent".to_string()),
        gpg_binary: None,
    }
}

fn key(token: &str, uids: &[(Option<&str>, Option<&str>)]) -> RawIdentity {
    RawIdentity::new(
        token,
        uids.iter().map(|(e, n)| SubIdentity::new(*e, *n)).collect(),
    )
}

#[tokio::test]
async fn test_disabled_importer_never_calls_source() {
    let calls = Arc::new(AtomicUsize::new(0));
    let importer = GnuPgImporter::from_config(0, &gpg_config(false)).with_source(Box::new(
        CountingSource {
            calls: calls.clone(),
            entries: vec![Ok(key("FPR1", &[(Some("a@x.com"), None)]))],
        },
    ));

    let run = produce_cards(&importer, None).await;

    assert_eq!(run.status, RunStatus::SkippedDisabled);
    assert!(run.cards.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gpg_key_line_format() {
    let importer = GnuPgImporter::from_config(0, &gpg_config(true)).with_source(Box::new(
        StaticSource::new(
            "keys",
            vec![key("A1B2C3", &[(Some("a@x.com"), Some("Alice"))])],
        ),
    ));

    let run = produce_cards(&importer, None).await;

    assert!(run.status.is_success());
    assert_eq!(run.cards.len(), 1);
    let keys: Vec<&str> = run.cards[0].values(LineName::Key).collect();
    assert_eq!(keys, vec!["data:application/x-pgp-fingerprint,A1B2C3"]);
}

#[tokio::test]
async fn test_keys_sharing_email_fold_into_one_card() {
    let importer = GnuPgImporter::from_config(0, &gpg_config(true)).with_source(Box::new(
        StaticSource::new(
            "keys",
            vec![
                key("K1", &[(Some("a@x.com"), Some("A"))]),
                key("K2", &[(Some("a@x.com"), Some("A2")), (Some("b@x.com"), None)]),
                key("K3", &[(None, Some("No Email"))]),
                key("K4", &[(Some("c@x.com"), None)]),
            ],
        ),
    ));

    let run = produce_cards(&importer, None).await;

    assert_eq!(run.card_count(), 2);
    assert_eq!(run.dropped, 1);
    assert_eq!(run.cards[0].emails(), vec!["a@x.com", "b@x.com"]);
    assert_eq!(run.cards[1].emails(), vec!["c@x.com"]);
}

#[tokio::test]
async fn test_uid_duplicates_collapse_within_group() {
    let importer = GnuPgImporter::from_config(0, &gpg_config(true)).with_source(Box::new(
        StaticSource::new(
            "keys",
            vec![key(
                "K1",
                &[
                    (Some("a@x.com"), Some("Alice")),
                    (Some("a@x.com"), Some("Alice")),
                    (Some("alice@work.com"), Some("Alice")),
                ],
            )],
        ),
    ));

    let run = produce_cards(&importer, None).await;

    let card = &run.cards[0];
    assert_eq!(card.values(LineName::Email).count(), 2);
    assert_eq!(card.values(LineName::Fn).count(), 1);
    assert_eq!(card.values(LineName::Key).count(), 1);
}

#[tokio::test]
async fn test_malformed_record_is_skipped_and_run_continues() {
    let calls = Arc::new(AtomicUsize::new(0));
    let importer = GnuPgImporter::from_config(0, &gpg_config(true)).with_source(Box::new(
        CountingSource {
            calls,
            entries: vec![
                Ok(key("K1", &[(Some("a@x.com"), None)])),
                Err(MalformedRecord::new("BAD", "key has no fingerprint")),
                Ok(key("   ", &[(Some("ghost@x.com"), None)])),
                Ok(key("K2", &[(Some("b@x.com"), None)])),
            ],
        },
    ));

    let run = produce_cards(&importer, None).await;

    assert!(run.status.is_success());
    assert_eq!(run.card_count(), 2);
    assert_eq!(run.malformed.len(), 2);
    assert_eq!(run.malformed[0].token, "BAD");
    // 空トークンのグループは丸ごと捨てられる
    assert!(run.cards.iter().all(|c| !c.has_email("ghost@x.com")));
}

#[tokio::test]
async fn test_source_failure_is_reported_not_raised() {
    let importer =
        GnuPgImporter::from_config(0, &gpg_config(true)).with_source(Box::new(BrokenSource));

    let run = produce_cards(&importer, None).await;

    assert!(run.cards.is_empty());
    match run.status {
        RunStatus::Failed { cause, message } => {
            assert_eq!(cause, "source_unavailable");
            assert!(message.contains("connection refused"));
        }
        other => panic!("unexpected status: {:?}", other),
    }
}

#[tokio::test]
async fn test_scan_timeout_fails_run() {
    let importer =
        GnuPgImporter::from_config(0, &gpg_config(true)).with_source(Box::new(StalledSource));

    let run = produce_cards(&importer, Some(Duration::from_millis(50))).await;

    match run.status {
        RunStatus::Failed { cause, .. } => assert_eq!(cause, "timeout"),
        other => panic!("unexpected status: {:?}", other),
    }
}

#[tokio::test]
async fn test_demo_importer_produces_configured_contact() {
    let importer = DemoImporter::from_config(0, &DemoConfig::default());

    let run = produce_cards(&importer, None).await;

    assert_eq!(importer.id(), "demo/0");
    assert_eq!(run.card_count(), 1);
    let card = &run.cards[0];
    assert_eq!(card.display_name(), Some("Mr. Rogers"));
    assert!(card.has_email("mr@rogers.com"));
    let keys: Vec<&str> = card.values(LineName::Key).collect();
    assert_eq!(keys, vec!["urn:x-vcim-demo:mr@rogers.com"]);
}

#[test]
fn test_kind_defaults() {
    assert!(ImporterKind::Gpg.default_active());
    assert!(ImporterKind::Demo.default_active());
    assert!(!ImporterKind::Http.default_active());
    assert_eq!(ImporterKind::all().len(), 4);
    assert_eq!(ImporterKind::Json.to_string(), "json");
}
