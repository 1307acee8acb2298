mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("modules.csv");
    common::write_modules_csv(&table, &["1,payment,1,1,1,,Stripe,stripe,"]);

    let mut cmd = Command::new(cargo_bin!("payhub"));
    cmd.arg(&table)
        .arg("--modules-root")
        .arg("tests/fixtures/modules")
        .arg("--db-path")
        .arg(dir.path().join("some_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to the CSV module table.",
        ));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("modules.csv");
    common::write_modules_csv(&table, &["1,payment,1,1,1,,Stripe,stripe,"]);

    let mut cmd = Command::new(cargo_bin!("payhub"));
    cmd.arg(&table)
        .arg("--modules-root")
        .arg("tests/fixtures/modules")
        .arg("--db-path")
        .arg(dir.path().join("test_db"));

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
