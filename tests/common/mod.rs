#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use testrail_reporter::ReporterConfig;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("testrail.yaml");
    fs::write(&path, content).expect("Failed to write testrail.yaml");
    path
}

pub fn write_events(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("events.json");
    fs::write(&path, lines.join("\n")).expect("Failed to write events.json");
    path
}

/// Config pointing at a mock TestRail server with plain `/api/v2/` paths
pub fn config_for(server_uri: &str) -> ReporterConfig {
    ReporterConfig {
        service_url: server_uri.to_string(),
        user_name: "ci@example.com".to_string(),
        password: "secret".to_string(),
        project_id: "3".to_string(),
        suite_id: "4".to_string(),
        api_path: "api/v2/".to_string(),
        ..ReporterConfig::default()
    }
}

pub fn config_yaml(server_uri: &str) -> String {
    format!(
        r#"
service_url: "{}"
user_name: "ci@example.com"
password: "secret"
project_id: "3"
suite_id: "4"
api_path: "api/v2/"
"#,
        server_uri
    )
}

pub fn started(name: &str) -> String {
    format!(r#"{{ "type": "test", "event": "started", "name": "{}" }}"#, name)
}

pub fn passed(name: &str) -> String {
    format!(
        r#"{{ "type": "test", "name": "{}", "event": "ok", "exec_time": 0.5 }}"#,
        name
    )
}

pub fn failed(name: &str) -> String {
    format!(
        r#"{{ "type": "test", "name": "{}", "event": "failed", "exec_time": 0.25, "stdout": "assertion failed" }}"#,
        name
    )
}

pub fn ignored(name: &str) -> String {
    format!(r#"{{ "type": "test", "name": "{}", "event": "ignored" }}"#, name)
}

/// started + outcome lines for each (name, outcome) pair, wrapped in suite events
pub fn libtest_run(tests: &[(&str, &str)]) -> Vec<String> {
    let mut lines = vec![format!(
        r#"{{ "type": "suite", "event": "started", "test_count": {} }}"#,
        tests.len()
    )];
    for (name, outcome) in tests {
        lines.push(started(name));
        lines.push(match *outcome {
            "ok" => passed(name),
            "failed" => failed(name),
            _ => ignored(name),
        });
    }
    lines.push(r#"{ "type": "suite", "event": "ok", "passed": 0, "failed": 0, "ignored": 0, "measured": 0, "filtered_out": 0 }"#.to_string());
    lines
}
