use super::*;
use crate::card::AttributeLine;
use tempfile::TempDir;

fn alice() -> Card {
    Card::new(vec![
        AttributeLine::key("urn:x-vcim-demo:alice"),
        AttributeLine::email("alice@example.org"),
        AttributeLine::fn_name("Alice"),
    ])
}

fn bob() -> Card {
    Card::new(vec![
        AttributeLine::email("bob@example.org"),
        AttributeLine::fn_name("Bob"),
    ])
}

#[test]
fn test_missing_file_is_empty_book() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = JsonCardStore::with_path(temp_dir.path().join("contacts.json"));

    assert!(store.cards().unwrap().is_empty());
    assert_eq!(store.updated_at().unwrap(), None);
    assert!(!store.path().exists());
}

#[test]
fn test_upsert_persists_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("contacts.json");

    let mut store = JsonCardStore::with_path(&path);
    assert_eq!(store.upsert(alice()).unwrap(), UpsertOutcome::Inserted);
    assert!(!path.exists());
    store.flush().unwrap();
    assert!(path.exists());

    let mut reopened = JsonCardStore::with_path(&path);
    assert_eq!(reopened.cards().unwrap(), vec![alice()]);
    assert!(reopened.updated_at().unwrap().is_some());
}

#[test]
fn test_reimport_does_not_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contacts.json");

    let mut store = JsonCardStore::with_path(&path);
    store.upsert(alice()).unwrap();
    let outcome = store.upsert(alice()).unwrap();
    store.flush().unwrap();

    assert_eq!(outcome, UpsertOutcome::Merged { added_lines: 0 });
    assert_eq!(JsonCardStore::with_path(&path).cards().unwrap().len(), 1);
}

#[test]
fn test_merge_appends_new_lines() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = JsonCardStore::with_path(temp_dir.path().join("contacts.json"));
    store.upsert(alice()).unwrap();

    let outcome = store
        .upsert(Card::new(vec![
            AttributeLine::key("data:application/x-pgp-fingerprint,ABCD"),
            AttributeLine::email("alice@example.org"),
            AttributeLine::email("alice@work.example"),
        ]))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Merged { added_lines: 2 });

    let cards = store.cards().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(
        cards[0].emails(),
        vec!["alice@example.org", "alice@work.example"]
    );
}

#[test]
fn test_corrupt_file_is_store_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contacts.json");
    fs::write(&path, "{ not json").unwrap();

    let mut store = JsonCardStore::with_path(&path);
    let result = store.upsert(alice());
    assert!(matches!(result, Err(VcimError::Store(_))));
    // 壊れたファイルは上書きしない
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn test_failed_flush_discards_unsaved_cards() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("sub");
    let path = blocker.join("contacts.json");

    let mut store = JsonCardStore::with_path(&path);
    assert_eq!(store.upsert(alice()).unwrap(), UpsertOutcome::Inserted);

    // ディレクトリの位置にファイルがあると書き込めない
    fs::write(&blocker, "not a directory").unwrap();
    assert!(store.flush().is_err());
    assert!(!store.is_modified());

    fs::remove_file(&blocker).unwrap();
    assert!(store.cards().unwrap().is_empty());

    store.upsert(bob()).unwrap();
    store.flush().unwrap();
    assert_eq!(JsonCardStore::with_path(&path).cards().unwrap(), vec![bob()]);
}

#[test]
fn test_upserts_are_written_once_on_flush() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contacts.json");

    let mut store = JsonCardStore::with_path(&path);
    store.upsert(alice()).unwrap();
    store.upsert(bob()).unwrap();
    assert!(store.is_modified());
    assert!(!path.exists());

    store.flush().unwrap();
    assert!(!store.is_modified());
    let saved_at = JsonCardStore::with_path(&path).updated_at().unwrap();
    assert!(saved_at.is_some());

    // 変更のない flush は書き込まない
    assert_eq!(
        store.upsert(alice()).unwrap(),
        UpsertOutcome::Merged { added_lines: 0 }
    );
    store.flush().unwrap();
    assert_eq!(JsonCardStore::with_path(&path).updated_at().unwrap(), saved_at);

    // 保存後もファイルを読み直さない
    fs::remove_file(&path).unwrap();
    assert_eq!(store.cards().unwrap().len(), 2);
}
