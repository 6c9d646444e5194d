use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

fn write_archive(dir: &tempfile::TempDir, contents: &Value) -> PathBuf {
    let path = dir.path().join("archive.json");
    fs::write(&path, serde_json::to_string(contents).unwrap()).unwrap();
    path
}

fn simple_archive() -> Value {
    let split = json!({
        "scores": [0.1, 0.4, 0.35, 0.8],
        "labels": [0.0, 0.0, 1.0, 1.0],
        "weights": null,
    });
    json!({ "train": split.clone(), "test": split })
}

#[test]
fn json_usage_error_when_missing_subcommand() {
    let output = cargo_bin_cmd!("sepeval").arg("--json").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    assert_eq!(value["error"]["code"], "CLI_USAGE");
}

#[test]
fn non_json_usage_error() {
    let mut cmd = cargo_bin_cmd!("sepeval");
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicates::str::is_empty())
        .stderr(contains("Usage"));
}

#[test]
fn help_exits_zero() {
    let output = cargo_bin_cmd!("sepeval").arg("--help").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn version_exits_zero() {
    let output = cargo_bin_cmd!("sepeval").arg("--version").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn json_eval_reports_primary_auc() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir, &simple_archive());

    let output = cargo_bin_cmd!("sepeval")
        .args(["eval", archive.to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    assert_eq!(value["status"], "OK");
    let auc = value["data"]["result"]["primary_auc"].as_f64().unwrap();
    assert!((auc - 0.75).abs() < 1e-12, "auc={}", auc);
    assert!(value["data"]["artifacts"].is_null());
}

#[test]
fn eval_with_out_writes_report_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir, &simple_archive());
    let out_dir = dir.path().join("report");

    let output = cargo_bin_cmd!("sepeval")
        .args([
            "eval",
            archive.to_str().unwrap(),
            "--out",
            out_dir.to_str().unwrap(),
            "--json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    let hash = value["data"]["artifacts"]["report_hash"].as_str().unwrap();
    assert_eq!(hash.len(), 64);
    assert!(out_dir.join("report.json").is_file());
    assert!(out_dir.join("summary.csv").is_file());
}

#[test]
fn json_auc_on_train_split() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir, &simple_archive());

    let output = cargo_bin_cmd!("sepeval")
        .args([
            "auc",
            archive.to_str().unwrap(),
            "--split",
            "train",
            "--json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    assert_eq!(value["data"]["split"], "train");
    let auc = value["data"]["auc"].as_f64().unwrap();
    assert!((auc - 0.75).abs() < 1e-12, "auc={}", auc);
}

#[test]
fn missing_archive_exits_two_with_read_code() {
    let output = cargo_bin_cmd!("sepeval")
        .args(["eval", "/nonexistent/archive.json", "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    assert_eq!(value["error"]["code"], "ARCHIVE_READ");
}

#[test]
fn malformed_archive_exits_two_with_parse_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.json");
    fs::write(&path, "not json").unwrap();

    let output = cargo_bin_cmd!("sepeval")
        .args(["eval", path.to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    assert_eq!(value["error"]["code"], "ARCHIVE_PARSE");
}

#[test]
fn single_class_split_exits_two_with_score_set_code() {
    let dir = tempfile::tempdir().unwrap();
    let split = json!({
        "scores": [0.1, 0.4],
        "labels": [1.0, 1.0],
        "weights": null,
    });
    let archive = write_archive(&dir, &json!({ "train": split.clone(), "test": split }));

    let output = cargo_bin_cmd!("sepeval")
        .args(["eval", archive.to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: Value = serde_json::from_str(&stdout).expect("stdout must be JSON");
    assert_eq!(value["error"]["code"], "INVALID_SCORE_SET");
    assert_eq!(value["error"]["details"]["split"], "train");
}

#[test]
fn non_json_eval_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir, &simple_archive());

    let mut cmd = cargo_bin_cmd!("sepeval");
    cmd.args(["eval", archive.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(contains("primary auc (test): 0.750000"));
}
