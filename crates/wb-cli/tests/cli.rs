//! CLI command integration tests.
//! Each test uses a temp directory via WB_DATA_DIR for full isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wb_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("wb").unwrap();
    cmd.env("WB_DATA_DIR", data_dir.path());
    cmd
}

fn analyze_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = wb_cmd(dir).arg("analyze").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn recent_fresh_db() {
    let dir = TempDir::new().unwrap();
    wb_cmd(&dir)
        .arg("recent")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no tasks yet)"));
    assert!(dir.path().join("workbench.db").exists());
}

#[test]
fn metrics_fresh_db() {
    let dir = TempDir::new().unwrap();
    wb_cmd(&dir)
        .arg("metrics")
        .assert()
        .success()
        .stdout(predicate::str::contains("(no metrics yet)"));
}

#[test]
fn analyze_sentiment_then_show() {
    let dir = TempDir::new().unwrap();
    let json = analyze_json(&dir, &["I love this wonderful day"]);
    assert_eq!(json["results"]["predictions"][0]["label"], "POSITIVE");
    assert_eq!(json["results"]["model_used"], "bert-base-uncased");
    let task_id = json["task_id"].as_i64().unwrap();

    let output = wb_cmd(&dir)
        .args(["show", &task_id.to_string()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["task_type"], "sentiment");
    assert_eq!(shown["heatmap"]["tokens"].as_array().unwrap().len(), 5);
    assert!(shown["patterns"]["attention_diversity"]["mean_entropy"].as_f64().unwrap() > 0.0);
}

#[test]
fn analyze_qa_with_context() {
    let dir = TempDir::new().unwrap();
    let json = analyze_json(
        &dir,
        &[
            "--task",
            "qa",
            "--context",
            "The sky is blue. Grass grows green",
            "What color does grass have?",
        ],
    );
    assert_eq!(json["results"]["answer"], "Grass grows green");
    assert!(json["attention_data"].is_null());
}

#[test]
fn analyze_classification_with_labels() {
    let dir = TempDir::new().unwrap();
    let json = analyze_json(
        &dir,
        &[
            "--task",
            "classification",
            "--label",
            "alpha",
            "--label",
            "beta",
            "some text",
        ],
    );
    assert_eq!(json["results"]["labels_used"], serde_json::json!(["alpha", "beta"]));
}

#[test]
fn analyze_unknown_task_fails() {
    let dir = TempDir::new().unwrap();
    wb_cmd(&dir)
        .args(["analyze", "--task", "translation", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported task type"));
}

#[test]
fn analyze_empty_text_fails() {
    let dir = TempDir::new().unwrap();
    wb_cmd(&dir)
        .args(["analyze", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no text provided"));
}

#[test]
fn show_task_without_heatmap_fails() {
    let dir = TempDir::new().unwrap();
    let json = analyze_json(&dir, &["--task", "ner", "Alice Smith lives in Paris"]);
    let task_id = json["task_id"].as_i64().unwrap();

    wb_cmd(&dir)
        .args(["show", &task_id.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no attention data"));
}

#[test]
fn show_missing_task_fails() {
    let dir = TempDir::new().unwrap();
    wb_cmd(&dir)
        .args(["show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task 42 not found"));
}

#[test]
fn recent_and_metrics_after_analyze() {
    let dir = TempDir::new().unwrap();
    analyze_json(&dir, &["--task", "attention", "--model", "my-model", "first"]);
    analyze_json(&dir, &["--task", "attention", "--model", "my-model", "second"]);

    let output = wb_cmd(&dir).args(["recent", "--limit", "1"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("second"));

    wb_cmd(&dir)
        .arg("metrics")
        .assert()
        .success()
        .stdout(predicate::str::contains("my-model"))
        .stdout(predicate::str::contains("requests=2"));
}

#[test]
fn config_file_sets_default_model() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("wb.toml"),
        "[analysis]\ndefault_model = \"roberta-base\"\n",
    )
    .unwrap();
    let json = analyze_json(&dir, &["--task", "ner", "Berlin"]);
    assert_eq!(json["results"]["model_used"], "roberta-base");
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    wb_cmd(&dir)
        .args(["--config", "/nonexistent/wb.toml", "metrics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}
