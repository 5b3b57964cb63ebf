//! End-to-end retention flows against real and in-memory stores

use chrono::{DateTime, TimeZone, Utc};
use cli_lib::engine;
use policy::DatabaseRetention;
use storage::{DirStore, MemoryStore};
use tempfile::TempDir;

fn utc(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
}

fn entry(name: &str, container: &str, retain: i64, weekly: i64, monthly: i64) -> DatabaseRetention {
    DatabaseRetention {
        name: name.to_string(),
        container: container.to_string(),
        retain_all_days: retain,
        weekly_backups: weekly,
        monthly_backups: monthly,
        striped: false,
        use_storage_timestamp: true,
    }
}

fn seed(root: &std::path::Path, container: &str, names: &[&str]) {
    for name in names {
        let path = root.join(container).join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"payload").unwrap();
    }
}

fn surviving(root: &std::path::Path, container: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root.join(container))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Names carry embedded dates, so the fixed `now` makes the outcome
/// deterministic regardless of filesystem timestamps.
const LISTING: &[&str] = &[
    "orders_2024_02_29_full.bak",
    "orders_2024_02_20_full.bak",
    "orders_2024_02_18_full.bak",
    "orders_2024_02_10_full.bak",
    "orders_2024_02_01_full.bak",
    "orders_2024_02_27_log.trn",
    "orders_2024_02_17_log.trn",
    "notes.txt",
];

#[tokio::test]
async fn test_end_to_end_enforcement() {
    let tmp = TempDir::new().unwrap();
    seed(tmp.path(), "orders-backups", LISTING);

    let job = entry("orders", "orders-backups", 7, 2, 0).validate().unwrap();
    let store = DirStore::new(tmp.path());

    let outcome = engine::enforce_database(&store, &job, utc(2024, 3, 1), false)
        .await
        .unwrap();

    assert_eq!(outcome.deleted, 3);
    assert_eq!(outcome.failed, 0);
    assert_eq!(
        surviving(tmp.path(), "orders-backups"),
        vec![
            // The weekly losers, the expired full, and the old transaction
            // log are gone; the non-backup blob is never touched.
            "notes.txt".to_string(),
            "orders_2024_02_10_full.bak".to_string(),
            "orders_2024_02_20_full.bak".to_string(),
            "orders_2024_02_27_log.trn".to_string(),
            "orders_2024_02_29_full.bak".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_dry_run_deletes_nothing() {
    let tmp = TempDir::new().unwrap();
    seed(tmp.path(), "orders-backups", LISTING);

    let job = entry("orders", "orders-backups", 7, 2, 0).validate().unwrap();
    let store = DirStore::new(tmp.path());

    let outcome = engine::enforce_database(&store, &job, utc(2024, 3, 1), true)
        .await
        .unwrap();

    assert!(outcome.dry_run);
    assert_eq!(outcome.deleted, 0);
    assert_eq!(outcome.classification.to_delete.len(), 3);
    assert_eq!(surviving(tmp.path(), "orders-backups").len(), LISTING.len());
}

#[tokio::test]
async fn test_delete_failure_does_not_stop_the_rest() {
    let store = MemoryStore::new();
    store.put("orders-backups", "keeper.bak", Some(utc(2024, 2, 29)));
    store.put("orders-backups", "old_a.bak", Some(utc(2023, 1, 1)));
    store.put("orders-backups", "old_b.bak", Some(utc(2023, 2, 1)));
    store.put("orders-backups", "old_c.bak", Some(utc(2023, 3, 1)));
    store.fail_delete("orders-backups", "old_b.bak");

    let job = entry("orders", "orders-backups", 7, 0, 0).validate().unwrap();
    let outcome = engine::enforce_database(&store, &job, utc(2024, 3, 1), false)
        .await
        .unwrap();

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(
        store.names("orders-backups"),
        vec!["keeper.bak".to_string(), "old_b.bak".to_string()]
    );
}

#[tokio::test]
async fn test_missing_container_is_an_error_not_a_panic() {
    let tmp = TempDir::new().unwrap();
    let job = entry("orders", "missing", 7, 2, 0).validate().unwrap();
    let store = DirStore::new(tmp.path());

    assert!(engine::plan_database(&store, &job, utc(2024, 3, 1))
        .await
        .is_err());
}

#[tokio::test]
async fn test_invalid_policy_skips_database_but_not_siblings() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("store");
    seed(&root, "good-backups", &["good_2020_01_01_full.bak"]);
    seed(&root, "bad-backups", &["bad_2020_01_01_full.bak"]);

    let config_path = tmp.path().join("config.toml");
    let state_dir = tmp.path().join("state");
    std::fs::write(
        &config_path,
        format!(
            r#"
[engine]
state_dir = "{}"

[storage]
root = "{}"

[[databases]]
name = "bad"
container = "bad-backups"
retain_all_days = -1
weekly_backups = 0
monthly_backups = 0

[[databases]]
name = "good"
container = "good-backups"
retain_all_days = 7
weekly_backups = 0
monthly_backups = 0
"#,
            state_dir.display(),
            root.display()
        ),
    )
    .unwrap();

    cli_lib::cmd::run::run(Some(config_path), false, None)
        .await
        .unwrap();

    // The invalid database was skipped untouched; its valid sibling still
    // had its expired backup culled.
    assert_eq!(
        surviving(&root, "bad-backups"),
        vec!["bad_2020_01_01_full.bak".to_string()]
    );
    assert!(surviving(&root, "good-backups").is_empty());
}
