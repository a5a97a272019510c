//! End-to-end tests for the fm binary

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CUSTOMERS: &str = r#"{
    "contract_name": "customers",
    "fields": [
        {"target_field": "name", "type": "string", "required": true, "description": "Full name"},
        {"target_field": "id", "type": "string", "required": true},
        {"target_field": "notes", "type": "string", "required": false},
        {"target_field": "tier", "type": "enum", "values": ["gold", "silver"]}
    ]
}"#;

struct TestEnv {
    tmp: TempDir,
    schemas: PathBuf,
    csv: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let schemas = tmp.path().join("schemas");
        fs::create_dir_all(&schemas).expect("create schema dir");
        fs::write(schemas.join("customers.json"), CUSTOMERS).expect("write schema");

        let csv = tmp.path().join("customers.csv");
        fs::write(&csv, "full_name,customer_id,level\nAda,1,gold\nGrace,2,silver\nLin,3,gold\n").expect("write csv");

        Self { tmp, schemas, csv }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("fm").unwrap();
        cmd.current_dir(self.tmp.path())
            .env("HOME", self.tmp.path())
            .env("XDG_CONFIG_HOME", self.tmp.path().join("config"))
            .arg("--schema-dir")
            .arg(&self.schemas);
        cmd
    }
}

#[test]
fn schemas_lists_good_and_broken_files() {
    let env = TestEnv::new();
    fs::write(env.schemas.join("broken.json"), "{ nope").unwrap();

    env.cmd()
        .arg("schemas")
        .assert()
        .success()
        .stdout(contains("customers.json"))
        .stdout(contains("4 fields, 2 required"))
        .stdout(contains("broken.json"));
}

#[test]
fn schemas_missing_directory_fails() {
    let env = TestEnv::new();
    Command::cargo_bin("fm")
        .unwrap()
        .current_dir(env.tmp.path())
        .args(["--schema-dir", "does-not-exist", "schemas"])
        .assert()
        .failure()
        .stderr(contains("Schema directory not found"));
}

#[test]
fn show_prints_fields_and_json_details() {
    let env = TestEnv::new();
    env.cmd()
        .args(["show", "customers"])
        .assert()
        .success()
        .stdout(contains("Full name"))
        .stdout(contains("values: gold, silver"));

    env.cmd()
        .args(["show", "customers.json", "--json"])
        .assert()
        .success()
        .stdout(contains("\"contract_name\": \"customers\""));
}

#[test]
fn inspect_summarizes_file() {
    let env = TestEnv::new();
    env.cmd()
        .arg("inspect")
        .arg(&env.csv)
        .args(["--rows", "2"])
        .assert()
        .success()
        .stdout(contains("Rows: 3"))
        .stdout(contains("full_name, customer_id, level"))
        .stdout(contains("Grace | 2 | silver"))
        .stdout(contains("Lin").not());
}

#[test]
fn check_reports_missing_required_field() {
    let env = TestEnv::new();
    env.cmd()
        .args(["check", "customers"])
        .arg(&env.csv)
        .args(["-m", "id=customer_id"])
        .assert()
        .failure()
        .stdout(contains("name"))
        .stderr(contains("Required fields are unmapped: name"));
}

#[test]
fn check_passes_with_warnings() {
    let env = TestEnv::new();
    env.cmd()
        .args(["check", "customers"])
        .arg(&env.csv)
        .args(["-m", "name=full_name", "-m", "id=customer_id"])
        .assert()
        .success()
        .stdout(contains("Mapping is valid"))
        .stdout(contains("notes: optional field not mapped"));
}

#[test]
fn check_rejects_unknown_column() {
    let env = TestEnv::new();
    env.cmd()
        .args(["check", "customers"])
        .arg(&env.csv)
        .args(["-m", "name=fullname"])
        .assert()
        .failure()
        .stderr(contains("Unknown source column: fullname"));
}

#[test]
fn export_writes_default_output_file() {
    let env = TestEnv::new();
    env.cmd()
        .args(["export", "customers"])
        .arg(&env.csv)
        .args(["-m", "name=full_name", "-m", "id=customer_id", "-m", "tier=level"])
        .assert()
        .success()
        .stdout(contains("Exported 3 rows"));

    let written = fs::read_to_string(env.tmp.path().join("mapped_customers.csv")).unwrap();
    assert_eq!(written, "name,id,notes,tier\nAda,1,,gold\nGrace,2,,silver\nLin,3,,gold\n");
}

#[test]
fn export_with_mapping_file_and_override() {
    let env = TestEnv::new();
    let mapping = env.tmp.path().join("mapping.yml");
    fs::write(&mapping, "name: customer_id\nid: customer_id\nnotes: null\n").unwrap();
    let out = env.tmp.path().join("out.csv");

    env.cmd()
        .args(["export", "customers"])
        .arg(&env.csv)
        .arg("--mapping")
        .arg(&mapping)
        .args(["-m", "name=full_name", "-o"])
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("name,id,notes,tier\nAda,1,,\n"));
}

#[test]
fn export_refused_when_invalid() {
    let env = TestEnv::new();
    env.cmd()
        .args(["export", "customers"])
        .arg(&env.csv)
        .args(["-m", "id=customer_id"])
        .assert()
        .failure()
        .stderr(contains("Export not allowed"));

    assert!(!env.tmp.path().join("mapped_customers.csv").exists());
}

#[test]
fn malformed_csv_is_reported() {
    let env = TestEnv::new();
    let bad = env.tmp.path().join("bad.csv");
    fs::write(&bad, "a,b\n1\n").unwrap();

    env.cmd()
        .arg("inspect")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("Failed to load file bad.csv"));
}

#[test]
fn config_file_sets_output_prefix() {
    let env = TestEnv::new();
    let config = env.tmp.path().join("fieldmap.yml");
    fs::write(&config, "output-prefix: clean_\n").unwrap();

    env.cmd()
        .arg("--config")
        .arg(&config)
        .args(["export", "customers"])
        .arg(&env.csv)
        .args(["-m", "name=full_name", "-m", "id=customer_id"])
        .assert()
        .success();

    assert!(env.tmp.path().join("clean_customers.csv").exists());
}
