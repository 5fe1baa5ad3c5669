//! Integration tests for the pqc CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get a pqc command isolated from the user's environment
fn pqc(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pqc").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg"))
        .env_remove("PQC_LOG")
        .env_remove("PQC_EXPORT_DIR")
        .env_remove("PQC_DEFAULT_QUANTITY")
        .env_remove("PQC_PASSWORD");
    cmd
}

/// Helper to create a workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    pqc(&tmp).arg("init").assert().success();
    tmp
}

fn login(tmp: &TempDir, username: &str, password: &str) {
    pqc(tmp)
        .args(["login", "-u", username, "-p", password])
        .assert()
        .success();
}

/// Workspace with the admin logged in, product PN-250 and a 3-item standard on M-01
fn setup_catalog() -> TempDir {
    let tmp = setup_workspace();
    login(&tmp, "admin", "password");
    pqc(&tmp)
        .args(["product", "new", "-n", "Cup 250", "--number", "PN-250"])
        .assert()
        .success();
    pqc(&tmp)
        .args([
            "standard", "new", "-p", "PN-250", "-m", "M-01", "--quantity", "3", "--weight",
            "100:2:3", "--rim", "1.5:0.2", "--load", "40:5",
        ])
        .assert()
        .success();
    tmp
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

/// Enter a record from CSV and return its id
fn enter_record(tmp: &TempDir, csv: &str, date: &str) -> String {
    let file = write_file(tmp.path(), "items.csv", csv);
    let output = pqc(tmp)
        .args([
            "entry", "-p", "PN-250", "-s", "M-01", "--from-csv", &file, "--date", date, "-f",
            "id",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "entry failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

const ONE_HEAVY_ITEM: &str = "weight,rim,load\n100,1.5,40\n96,1.5,40\n101,1.6,41\n";

fn json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Init and sessions
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    pqc(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized PlasticQC workspace"))
        .stdout(predicate::str::contains("Default administrator"));

    assert!(tmp.path().join(".pqc/config.yaml").exists());
    assert!(tmp.path().join(".pqc/plasticqc.db").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_workspace();
    pqc(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    pqc(&tmp)
        .args(["product", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workspace"));
}

#[test]
fn test_login_rejects_wrong_password() {
    let tmp = setup_workspace();
    pqc(&tmp)
        .args(["login", "-u", "admin", "-p", "Password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid username or password"));
    pqc(&tmp)
        .args(["login", "-u", "nobody", "-p", "password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid username or password"));
}

#[test]
fn test_login_persists_until_logout() {
    let tmp = setup_workspace();
    login(&tmp, "admin", "password");
    pqc(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("admin"))
        .stdout(predicate::str::contains("Administrator"));

    pqc(&tmp).arg("logout").assert().success();
    pqc(&tmp)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn test_catalog_requires_login() {
    let tmp = setup_workspace();
    pqc(&tmp)
        .args(["product", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

// ============================================================================
// Catalogue
// ============================================================================

#[test]
fn test_product_and_standard_listing() {
    let tmp = setup_catalog();
    pqc(&tmp)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PN-250"))
        .stdout(predicate::str::contains("1 product(s) found"));

    let standards = json(pqc(&tmp).args(["standard", "list", "-p", "PN-250", "-f", "json"]));
    assert_eq!(standards[0]["machine_number"], "M-01");
    assert_eq!(standards[0]["quantity_per_cycle"], 3);
    assert_eq!(standards[0]["weight"]["minus"], 3.0);
    assert_eq!(standards[0]["rim_thickness"]["plus"], 0.2);
}

#[test]
fn test_duplicate_product_number_rejected() {
    let tmp = setup_catalog();
    pqc(&tmp)
        .args(["product", "new", "-n", "Other", "--number", "PN-250"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_standard_with_zero_quantity_rejected() {
    let tmp = setup_catalog();
    pqc(&tmp)
        .args(["standard", "new", "-p", "PN-250", "-m", "M-02", "--quantity", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quantity per cycle"));
}

#[test]
fn test_product_delete_cascades() {
    let tmp = setup_catalog();
    enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");

    pqc(&tmp)
        .args(["product", "delete", "PN-250", "-y"])
        .assert()
        .success();
    pqc(&tmp)
        .args(["record", "list", "--from", "2024-01-01", "--to", "2024-12-31", "--count"])
        .assert()
        .success()
        .stdout("0\n");
    pqc(&tmp)
        .args(["product", "show", "PN-250"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("product not found"));
}

// ============================================================================
// Entry, history and export
// ============================================================================

#[test]
fn test_entry_and_record_summary() {
    let tmp = setup_catalog();
    let id = enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");
    assert_eq!(id, "1");

    let summary = json(pqc(&tmp).args(["record", "summary", &id, "-f", "json"]));
    assert_eq!(summary["total_measurements"], 3);
    assert_eq!(summary["out_of_spec"]["weight"], 1);
    assert_eq!(summary["out_of_spec"]["rim_thickness"], 0);
    assert_eq!(summary["created_by"], "Administrator");

    let details = json(pqc(&tmp).args(["record", "show", &id, "-f", "json"]));
    let items: Vec<u64> = details["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["item_number"].as_u64().unwrap())
        .collect();
    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(details["rows"][1]["weight_in_spec"], false);
}

#[test]
fn test_incomplete_entry_is_not_saved() {
    let tmp = setup_catalog();
    let file = write_file(tmp.path(), "short.csv", "weight,rim,load\n100,1.5,40\n100,1.5,40\n");
    pqc(&tmp)
        .args(["entry", "-p", "PN-250", "-s", "M-01", "--from-csv", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("record is incomplete"));

    pqc(&tmp)
        .args(["record", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_entry_requires_measurement_source() {
    let tmp = setup_catalog();
    pqc(&tmp)
        .args(["entry", "-p", "PN-250", "-s", "M-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no measurements given"));
}

#[test]
fn test_record_list_filters_by_date_and_search() {
    let tmp = setup_catalog();
    enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 08:00");
    enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-31 23:59");
    enter_record(&tmp, ONE_HEAVY_ITEM, "2024-04-01 00:00");

    let records = json(pqc(&tmp).args([
        "record", "list", "--from", "2024-03-01", "--to", "2024-03-31", "-f", "json",
    ]));
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    // newest first
    assert_eq!(records[0]["record_id"], 2);
    assert_eq!(records[1]["record_id"], 1);

    pqc(&tmp)
        .args([
            "record", "list", "--from", "2024-01-01", "--to", "2024-12-31", "--search", "m-01",
            "--count",
        ])
        .assert()
        .success()
        .stdout("3\n");
    pqc(&tmp)
        .args([
            "record", "list", "--from", "2024-01-01", "--to", "2024-12-31", "--search",
            "nothing", "--count",
        ])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_record_edit_replaces_measurements() {
    let tmp = setup_catalog();
    let id = enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");

    let fixed = write_file(tmp.path(), "fixed.csv", "item,weight,rim,load\n2,100,1.5,40\n");
    pqc(&tmp)
        .args(["record", "edit", &id, "--from-csv", &fixed])
        .assert()
        .success();

    let summary = json(pqc(&tmp).args(["record", "summary", &id, "-f", "json"]));
    assert_eq!(summary["out_of_spec"]["weight"], 0);
    assert_eq!(summary["total_measurements"], 3);
}

#[test]
fn test_record_delete() {
    let tmp = setup_catalog();
    let id = enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");
    pqc(&tmp)
        .args(["record", "delete", &id, "-y"])
        .assert()
        .success();
    pqc(&tmp)
        .args(["record", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("record not found"));
}

#[test]
fn test_record_export_formats() {
    let tmp = setup_catalog();
    let id = enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");

    pqc(&tmp)
        .args(["record", "export", &id, "--to", "pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Record_PN-250_20240301_140500.pdf"));
    let pdf = fs::read(tmp.path().join("Record_PN-250_20240301_140500.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    pqc(&tmp)
        .args(["record", "export", &id, "--to", "xlsx", "-o", "out/record.xlsx"])
        .assert()
        .success();
    assert!(tmp.path().join("out/record.xlsx").exists());

    pqc(&tmp)
        .args(["record", "export", &id, "--to", "csv", "-o", "record.csv"])
        .assert()
        .success();
    let csv = fs::read_to_string(tmp.path().join("record.csv")).unwrap();
    assert!(csv.starts_with("record_id,"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_export_dir_from_env() {
    let tmp = setup_catalog();
    let id = enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");
    pqc(&tmp)
        .env("PQC_EXPORT_DIR", tmp.path().join("exports"))
        .args(["record", "export", &id, "--to", "csv"])
        .assert()
        .success();
    assert!(tmp
        .path()
        .join("exports/Record_PN-250_20240301_140500.csv")
        .exists());
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_compare_aggregates_records() {
    let tmp = setup_catalog();
    enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");
    enter_record(
        &tmp,
        "weight,rim,load,visual\n100,1.5,40,FAIL\n100,1.5,40,OK\n100,1.5,40,OK\n",
        "2024-03-02 09:00",
    );

    let report = json(pqc(&tmp).args([
        "compare", "-p", "PN-250", "--from", "2024-03-01", "--to", "2024-03-31", "-f", "json",
    ]));
    assert_eq!(report["total_records"], 2);
    assert_eq!(report["total_measurements"], 6);
    assert_eq!(report["standard_label"], "All Machines");
    assert_eq!(report["date_range"], "1 Mar 2024 - 31 Mar 2024");
    let weight = &report["issues"][0];
    assert_eq!(weight["dimension"], "weight");
    assert_eq!(weight["count"], 1);
    assert_eq!(weight["percent"], 16.67);

    pqc(&tmp)
        .args([
            "compare", "-p", "PN-250", "-s", "M-01", "--from", "2024-03-01", "--to",
            "2024-03-31",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("M-01"))
        .stdout(predicate::str::contains("1 of 6"));
}

#[test]
fn test_compare_with_no_records() {
    let tmp = setup_catalog();
    pqc(&tmp)
        .args(["compare", "-p", "PN-250", "--from", "2020-01-01", "--to", "2020-01-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No records found"));
}

// ============================================================================
// Users and permissions
// ============================================================================

#[test]
fn test_admin_cannot_delete_self() {
    let tmp = setup_workspace();
    login(&tmp, "admin", "password");
    pqc(&tmp)
        .args(["user", "delete", "admin", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot delete your own account"));
}

#[test]
fn test_operator_permissions() {
    let tmp = setup_catalog();
    pqc(&tmp)
        .args(["user", "new", "-u", "op", "-n", "Olive Operator", "-p", "secret"])
        .assert()
        .success();
    pqc(&tmp)
        .args(["user", "new", "-u", "op", "-n", "Again", "-p", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    pqc(&tmp).arg("logout").assert().success();
    login(&tmp, "op", "secret");

    pqc(&tmp).args(["product", "list"]).assert().success();
    let id = enter_record(&tmp, ONE_HEAVY_ITEM, "2024-03-01 14:05");
    assert_eq!(id, "1");

    for args in [
        vec!["record", "list"],
        vec!["user", "list"],
        vec!["compare", "-p", "PN-250"],
        vec!["product", "new", "-n", "X", "--number", "PN-X"],
    ] {
        pqc(&tmp)
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("administrator rights required"));
    }

    pqc(&tmp).arg("logout").assert().success();
    login(&tmp, "admin", "password");
    let summary = json(pqc(&tmp).args(["record", "summary", "1", "-f", "json"]));
    assert_eq!(summary["created_by"], "Olive Operator");
}

#[test]
fn test_password_is_case_sensitive() {
    let tmp = setup_workspace();
    login(&tmp, "admin", "password");
    pqc(&tmp)
        .args(["user", "new", "-u", "sam", "-n", "Sam Smith", "-p", "secret"])
        .assert()
        .success();
    pqc(&tmp)
        .args(["login", "-u", "sam", "-p", "Secret"])
        .assert()
        .failure();
    login(&tmp, "sam", "secret");
}

#[test]
fn test_user_list_formats() {
    let tmp = setup_workspace();
    login(&tmp, "admin", "password");
    pqc(&tmp)
        .args(["user", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,username,full_name,role,created"))
        .stdout(predicate::str::contains("admin,Administrator,admin"));

    let users = json(pqc(&tmp).args(["user", "list", "-f", "json"]));
    assert_eq!(users[0]["username"], "admin");
    assert!(users[0].get("password_hash").is_none());
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    pqc(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pqc"));
}
