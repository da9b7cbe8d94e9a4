use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli_raw(workdir: &Path, args: &[&str]) -> (bool, Value) {
    let output = Command::cargo_bin("disclosure")
        .expect("binary")
        .current_dir(workdir)
        .env_remove("DISCLOSURE_BUDGET")
        .env_remove("DISCLOSURE_PREVIEW_LENGTH")
        .arg("--quiet")
        .args(args)
        .output()
        .expect("command run");

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}

fn run_cli(workdir: &Path, args: &[&str]) -> Value {
    let (ok, body) = run_cli_raw(workdir, args);
    assert!(ok, "stdout: {body}\nargs: {args:?}");
    assert_eq!(body["status"], "ok");
    body["data"].clone()
}

#[test]
fn list_shows_builtin_catalog() {
    let temp = tempdir().unwrap();
    let data = run_cli(temp.path(), &["list"]);

    assert_eq!(data["total"], 7);
    assert_eq!(data["total_weight"], 19_500);
    assert_eq!(data["descriptors"][0]["id"], "context-fundamentals");
    assert_eq!(data["descriptors"][1]["weight"], 3600);
}

#[test]
fn query_materializes_multi_agent_skill() {
    let temp = tempdir().unwrap();
    let data = run_cli(temp.path(), &["query", "多代理", "--budget", "8000"]);

    assert_eq!(data["no_matches"], false);
    assert_eq!(data["selected"], 1);
    assert_eq!(data["materialized"], 1);
    assert_eq!(data["selected_ids"][0], "multi-agent-patterns");
    assert_eq!(data["total_cached"], 1);
}

#[test]
fn query_with_content_returns_payloads() {
    let temp = tempdir().unwrap();
    let data = run_cli(temp.path(), &["query", "工具设计", "--show-content"]);

    assert_eq!(data["stats"]["materialized"], 1);
    let content = data["contents"][0]["content"].as_str().unwrap();
    assert!(content.starts_with("# 工具设计最佳实践"));
}

#[test]
fn preview_unknown_id_is_an_error_envelope() {
    let temp = tempdir().unwrap();
    let (ok, body) = run_cli_raw(temp.path(), &["preview", "no-such-skill"]);

    assert!(!ok);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "not_found");
}

#[test]
fn preview_reports_graph_links() {
    let temp = tempdir().unwrap();
    let data = run_cli(
        temp.path(),
        &["preview", "context-compression", "--max-length", "4"],
    );

    assert_eq!(data["preview"], "设计有效...");
    assert_eq!(data["prerequisites"][1], "context-degradation");
    assert_eq!(data["related"][0], "context-optimization");
}

#[test]
fn duplicate_catalog_is_rejected() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("dup.json"),
        r#"{"descriptors":[{"id":"a","name":"A","weight":1},{"id":"a","name":"B","weight":2}]}"#,
    )
    .unwrap();

    let (ok, body) = run_cli_raw(temp.path(), &["--catalog", "dup.json", "list"]);
    assert!(!ok);
    assert_eq!(body["error"]["code"], "duplicate_identifier");
}

#[test]
fn content_dir_and_config_file_are_honoured() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(
        root.join("catalog.toml"),
        r#"
[[descriptors]]
id = "alpha"
name = "Alpha notes"
weight = 40

[[descriptors]]
id = "beta"
name = "Beta notes"
weight = 70
source = "beta.md"
"#,
    )
    .unwrap();
    fs::create_dir_all(root.join("content/alpha")).unwrap();
    fs::write(root.join("content/alpha/SKILL.md"), "alpha body").unwrap();
    fs::write(root.join("content/beta.md"), "beta body").unwrap();
    fs::write(root.join("engine.toml"), "budget = 100\n").unwrap();

    let data = run_cli(
        root,
        &[
            "--catalog",
            "catalog.toml",
            "--content-dir",
            "content",
            "--config",
            "engine.toml",
            "query",
            "notes",
            "--show-content",
        ],
    );

    assert_eq!(data["stats"]["budget"], 100);
    assert_eq!(data["stats"]["over_budget"], true);
    assert_eq!(data["stats"]["selected_ids"], serde_json::json!(["alpha"]));
    assert_eq!(data["contents"][0]["content"], "alpha body");
}

#[test]
fn preload_is_best_effort() {
    let temp = tempdir().unwrap();
    let data = run_cli(
        temp.path(),
        &["preload", "evaluation", "ghost", "tool-design"],
    );

    assert_eq!(data["report"]["loaded"], serde_json::json!(["evaluation", "tool-design"]));
    assert_eq!(data["report"]["missing"], serde_json::json!(["ghost"]));
    assert_eq!(data["statistics"]["total_cached"], 2);
    assert_eq!(data["statistics"]["access_count"], 2);
}

#[test]
fn demo_runs_three_queries_on_one_cache() {
    let temp = tempdir().unwrap();
    let data = run_cli(temp.path(), &["demo"]);

    let queries = data["queries"].as_array().unwrap();
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0]["selected"], 1);
    assert_eq!(queries[1]["matched"], 3);
    assert_eq!(data["statistics"]["total_cached"], 5);
}

#[test]
#[allow(deprecated)]
fn bad_config_fails_with_invalid_config() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("engine.json"), r#"{"preview_length": 0}"#).unwrap();

    Command::cargo_bin("disclosure")
        .expect("binary")
        .current_dir(temp.path())
        .args(["--config", "engine.json", "stats"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"invalid_config\""));
}
