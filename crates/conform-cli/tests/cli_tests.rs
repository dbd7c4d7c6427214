use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace root, two levels above this crate's manifest.
fn repo_root() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.pop();
    path
}

fn contract(name: &str) -> PathBuf {
    repo_root().join("contracts").join(name)
}

#[allow(deprecated)]
fn conform() -> Command {
    Command::cargo_bin("conform").expect("Failed to find conform binary")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const SNAPSHOT: &str = r#"{
    "version": "1.0.0",
    "policy_id": "heimlern-default",
    "ts": "2025-03-01T08:00:00Z",
    "arms": ["a", "b"],
    "counts": [3, 4],
    "values": [0.5, 0.25]
}"#;

// ============================================================================
// single-document mode
// ============================================================================

#[test]
fn test_single_document_valid() {
    let dir = TempDir::new().unwrap();
    let doc = write(dir.path(), "snapshot.json", SNAPSHOT);

    conform()
        .arg(contract("policy_snapshot.schema.json"))
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "✓ snapshot.json valid against policy_snapshot.schema.json",
        ));
}

#[test]
fn test_bundled_jsonl_sample() {
    conform()
        .arg(contract("aussen_event.schema.json"))
        .arg(repo_root().join("data/samples/aussensensor.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("aussensensor.jsonl:1"))
        .stdout(predicate::str::contains("aussensensor.jsonl:2"))
        .stdout(predicate::str::contains("aussensensor.jsonl:4"))
        .stdout(predicate::str::contains("aussensensor.jsonl:3").not());
}

#[test]
fn test_misaligned_counts_fail() {
    let dir = TempDir::new().unwrap();
    let doc = write(
        dir.path(),
        "snapshot.json",
        &SNAPSHOT.replace("[3, 4]", "[3]"),
    );

    conform()
        .arg(contract("policy_snapshot.schema.json"))
        .arg(&doc)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("❌ Validation failed"))
        .stderr(predicate::str::contains("counts length must match arms length"));
}

#[test]
fn test_bad_json_line_names_line() {
    let dir = TempDir::new().unwrap();
    let doc = write(
        dir.path(),
        "events.jsonl",
        "{\"type\":\"link\",\"source\":\"x\"}\n{not json\n",
    );

    conform()
        .arg(contract("aussen_event.schema.json"))
        .arg(&doc)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_success_lines_precede_failure() {
    let dir = TempDir::new().unwrap();
    let doc = write(
        dir.path(),
        "events.jsonl",
        "{\"type\":\"link\",\"source\":\"x\"}\n{\"type\":\"link\"}\n",
    );

    conform()
        .arg(contract("aussen_event.schema.json"))
        .arg(&doc)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "✓ events.jsonl:1 valid against aussen_event.schema.json",
        ))
        .stdout(predicate::str::contains("events.jsonl:2").not())
        .stderr(predicate::str::contains("❌ Validation failed: events.jsonl:2"));
}

#[test]
fn test_skip_notice_printed_once() {
    let schemas = TempDir::new().unwrap();
    let samples = TempDir::new().unwrap();
    write(samples.path(), "unrelated.txt", "not a sample");

    conform()
        .arg("--schemas")
        .arg(schemas.path())
        .arg("--samples")
        .arg(samples.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠ Skipping unrelated.txt"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_keep_going_lists_all_failures() {
    let dir = TempDir::new().unwrap();
    let doc = write(
        dir.path(),
        "events.jsonl",
        "{\"type\":\"link\"}\n{\"type\":\"link\",\"source\":\"x\"}\n{\"source\":\"y\"}\n",
    );

    conform()
        .arg("--keep-going")
        .arg(contract("aussen_event.schema.json"))
        .arg(&doc)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("2 failure(s)"))
        .stderr(predicate::str::contains("events.jsonl:1"))
        .stderr(predicate::str::contains("events.jsonl:3"));
}

// ============================================================================
// batch mode
// ============================================================================

#[test]
fn test_batch_over_bundled_samples() {
    conform()
        .arg("--schemas")
        .arg(repo_root().join("contracts"))
        .arg("--samples")
        .arg(repo_root().join("data/samples"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 sample file(s) validated successfully"));
}

#[test]
fn test_batch_skips_unmapped_samples() {
    let samples = TempDir::new().unwrap();
    fs::copy(
        repo_root().join("data/samples/aussensensor.jsonl"),
        samples.path().join("aussensensor.jsonl"),
    )
    .unwrap();
    write(samples.path(), "unrelated.txt", "not a sample");

    conform()
        .arg("--schemas")
        .arg(repo_root().join("contracts"))
        .arg("--samples")
        .arg(samples.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "⚠ Skipping unrelated.txt: no schema mapping defined",
        ));
}

#[test]
fn test_batch_missing_schema_fails() {
    let schemas = TempDir::new().unwrap();
    conform()
        .arg("--schemas")
        .arg(schemas.path())
        .arg("--samples")
        .arg(repo_root().join("data/samples"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("aussen_event.schema.json"));
}

#[test]
fn test_batch_empty_samples_warns() {
    let samples = TempDir::new().unwrap();
    conform()
        .arg("--schemas")
        .arg(repo_root().join("contracts"))
        .arg("--samples")
        .arg(samples.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("⚠ No samples validated"));
}

// ============================================================================
// usage
// ============================================================================

#[test]
fn test_no_arguments_is_usage_error() {
    conform()
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Usage: conform"));
}

#[test]
fn test_single_positional_is_usage_error() {
    conform()
        .arg(contract("aussen_event.schema.json"))
        .assert()
        .code(2);
}

#[test]
fn test_help() {
    conform()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--schemas"))
        .stdout(predicate::str::contains("--keep-going"));
}
