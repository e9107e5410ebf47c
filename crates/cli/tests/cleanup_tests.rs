//! Integration tests for the store-toolset commands

use assert_cmd::Command;
use predicates::prelude::*;
use sqlite_adapter::SqliteStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use toolset_core::domain::CategoryRecord;

struct Env {
    _dir: TempDir,
    db: PathBuf,
    logs: PathBuf,
}

impl Env {
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("store-toolset").unwrap();
        cmd.env("STORE_TOOLSET_DB", &self.db)
            .env("STORE_TOOLSET_LOG_DIR", &self.logs)
            .env_remove("RUST_LOG");
        cmd
    }

    fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.db).unwrap()
    }

    fn archived_logs(&self) -> Vec<PathBuf> {
        log_files(&self.logs)
    }
}

fn log_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "log"))
        .collect()
}

fn category(term_id: u64, name: &str, slug: &str) -> CategoryRecord {
    CategoryRecord {
        term_id,
        name: name.to_string(),
        slug: slug.to_string(),
        description: String::new(),
        image: None,
        count: 0,
    }
}

fn seeded_env() -> Env {
    let dir = TempDir::new().unwrap();
    let env = Env {
        db: dir.path().join("store.sqlite"),
        logs: dir.path().join("uploads").join("store-toolset-logs"),
        _dir: dir,
    };

    let store = env.store();
    store.insert_category(&category(12, "Clothing", "clothing")).unwrap();
    store.insert_category(&category(44, "Accessories", "accessories")).unwrap();
    store.insert_category(&category(7, "Empty Shelf", "empty-shelf")).unwrap();
    store.insert_product(101, "T-Shirt", "publish", &[12]).unwrap();
    store.insert_product(102, "Hoodie", "draft", &[12]).unwrap();
    store.insert_product(103, "Old Jacket", "trash", &[12]).unwrap();
    store.insert_product(201, "Belt", "publish", &[44]).unwrap();
    env
}

#[test]
fn test_list_categories_prints_table() {
    let env = seeded_env();

    env.cmd()
        .arg("list-categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("term_id"))
        .stdout(predicate::str::contains("Clothing"))
        .stdout(predicate::str::contains("empty-shelf"));
}

#[test]
fn test_list_categories_empty_store() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("store-toolset")
        .unwrap()
        .arg("--db")
        .arg(dir.path().join("empty.sqlite"))
        .arg("list-categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("No product categories found."));
}

#[test]
fn test_dry_run_reports_without_deleting() {
    let env = seeded_env();

    env.cmd()
        .args(["run", "--term-id=12,999", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success: Cleanup finished."))
        .stdout(predicate::str::contains("Mode: DRY RUN"))
        .stdout(predicate::str::contains(
            "Category 'Clothing' (ID 12) -> Products found: 3 (dry run, no deletions)",
        ))
        .stdout(predicate::str::contains("Invalid category identifier: 999"));

    let store = env.store();
    assert!(store.product_exists(101).unwrap());
    assert!(store.product_exists(103).unwrap());
    assert_eq!(env.archived_logs().len(), 1);
}

#[test]
fn test_live_run_by_slug_deletes_every_status() {
    let env = seeded_env();

    env.cmd()
        .args(["run", "--category-slug=clothing,unknown-slug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: LIVE"))
        .stdout(predicate::str::contains(
            "Category 'Clothing' (ID 12) -> Products found: 3 (deleted: 3)",
        ));

    let store = env.store();
    assert!(!store.product_exists(101).unwrap());
    assert!(!store.product_exists(102).unwrap());
    assert!(!store.product_exists(103).unwrap());
    assert!(store.product_exists(201).unwrap());
}

#[test]
fn test_live_run_on_empty_category() {
    let env = seeded_env();

    env.cmd()
        .args(["run", "--term-id=7"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Category 'Empty Shelf' (ID 7) -> Products found: 0 (deleted: 0)",
        ));
}

#[test]
fn test_out_of_range_id_does_not_abort_live_run() {
    let env = seeded_env();

    env.cmd()
        .args(["run", "--term-id=12,18446744073709551615"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Category 'Clothing' (ID 12) -> Products found: 3 (deleted: 3)",
        ))
        .stdout(predicate::str::contains(
            "Invalid category identifier: 18446744073709551615",
        ));

    assert!(!env.store().product_exists(101).unwrap());
    assert_eq!(env.archived_logs().len(), 1);
    env.cmd()
        .arg("last-log")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Invalid category identifier: 18446744073709551615",
        ));
}

#[test]
fn test_run_without_categories_fails_and_writes_no_log() {
    let env = seeded_env();

    env.cmd()
        .arg("run")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No valid categories provided"));

    env.cmd()
        .args(["run", "--category-slug=nope", "--dry-run"])
        .assert()
        .failure()
        .code(3);

    assert!(env.archived_logs().is_empty());
    env.cmd()
        .arg("last-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent run log."));
}

#[test]
fn test_last_log_shows_latest_run() {
    let env = seeded_env();

    env.cmd()
        .args(["run", "--term-id=44", "--dry-run"])
        .assert()
        .success();

    env.cmd()
        .arg("last-log")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Category 'Accessories' (ID 44) -> Products found: 1 (dry run, no deletions)",
        ));
}

#[test]
fn test_screen_options_save_and_clamp() {
    let env = seeded_env();

    env.cmd()
        .args([
            "screen-options",
            "--user",
            "1",
            "--columns",
            "slug,price,image",
            "--per-page",
            "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Columns: slug, image"))
        .stdout(predicate::str::contains("Per page: 10"));

    env.cmd()
        .args(["screen-options", "--user", "1", "--per-page", "900"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Columns: slug, image"))
        .stdout(predicate::str::contains("Per page: 200"));

    env.cmd()
        .args(["screen-options", "--user", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Columns: (none)"))
        .stdout(predicate::str::contains("Per page: 20"));
}

#[test]
fn test_purge_removes_logs_and_cache() {
    let env = seeded_env();
    env.cmd()
        .args(["run", "--term-id=12", "--dry-run"])
        .assert()
        .success();
    assert!(env.logs.exists());

    env.cmd()
        .arg("purge")
        .assert()
        .success()
        .stdout(predicate::str::contains("purged"));

    assert!(!env.logs.exists());
    env.cmd()
        .arg("last-log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent run log."));
}
