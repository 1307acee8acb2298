#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_disabled_module_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let table = dir.path().join("modules.csv");

    // 1. First run: the module folder is missing, so the module gets disabled
    common::write_modules_csv(&table, &["1,payment,1,1,1,,Stripe,stripe,"]);
    let output1 = Command::new(cargo_bin!("payhub"))
        .arg(&table)
        .arg("--modules-root")
        .arg(dir.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,payment,false,true,1,,Stripe,stripe,"));

    // 2. Second run: the CSV still says enabled but the stored record wins
    common::write_modules_csv(&table, &["1,payment,1,1,1,,Stripe,stripe,"]);
    let output2 = Command::new(cargo_bin!("payhub"))
        .arg(&table)
        .arg("--modules-root")
        .arg("tests/fixtures/modules")
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("1,payment,false,true,1,,Stripe,stripe,"));
}
