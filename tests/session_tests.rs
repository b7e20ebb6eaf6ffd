mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::*;
use serde_json::json;
use testrail_reporter::prelude::*;
use testrail_reporter::{CaseId, CaseResult, ReporterConfig};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixed_clock() -> Arc<MockClock> {
    Arc::new(MockClock::fixed(
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap(),
    ))
}

fn start_session(config: &ReporterConfig) -> Session {
    let client = Arc::new(TestRailClient::new(config).unwrap());
    Session::start(config, client, fixed_clock())
}

#[tokio::test]
async fn test_full_session_creates_run_and_submits_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_run/3"))
        .and(body_json(json!({
            "suite_id": "4",
            "name": "Auto Test | 2024-01-15 10:30:00",
            "include_all": false,
            "case_ids": ["101", "102", "205"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 77})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_results_for_cases/77"))
        .and(body_json(json!({
            "results": [
                {"case_id": "101", "status_id": 1},
                {"case_id": "102", "status_id": 1},
                {"case_id": "205", "status_id": 5},
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = start_session(&config_for(&server.uri()));
    let events = libtest_run(&[
        ("api::login_c101", "ok"),
        ("api::search_c205", "failed"),
        ("api::logout_c102", "ok"),
        ("api::export_c300", "ignored"),
    ]);
    session.ingest(events.join("\n").as_bytes()).unwrap();

    let outcome = session.finish().await.unwrap();
    match outcome {
        ReportOutcome::Reported { run_id, results } => {
            assert_eq!(run_id, 77);
            assert_eq!(
                results,
                vec![
                    CaseResult { case_id: CaseId::from("101"), status_id: 1 },
                    CaseResult { case_id: CaseId::from("102"), status_id: 1 },
                    CaseResult { case_id: CaseId::from("205"), status_id: 5 },
                ]
            );
        }
        other => panic!("expected a reported run, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_run_sends_no_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_run/3"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Field :project_id is not a valid or accessible project."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_results_for_cases/77"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = start_session(&config_for(&server.uri()));
    session
        .ingest(libtest_run(&[("api::login_c101", "ok")]).join("\n").as_bytes())
        .unwrap();

    let outcome = session.finish().await.unwrap();
    assert!(matches!(outcome, ReportOutcome::RunCreationFailed { .. }));
}

#[tokio::test]
async fn test_empty_session_makes_no_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = start_session(&config_for(&server.uri()));
    session.ingest(libtest_run(&[]).join("\n").as_bytes()).unwrap();

    assert_eq!(session.finish().await.unwrap(), ReportOutcome::NothingToReport);
}

#[tokio::test]
async fn test_only_skipped_tests_create_an_empty_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_run/3"))
        .and(body_json(json!({
            "suite_id": "4",
            "name": "Auto Test | 2024-01-15 10:30:00",
            "include_all": false,
            "case_ids": [],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_results_for_cases/5"))
        .and(body_json(json!({"results": []})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = start_session(&config_for(&server.uri()));
    session
        .ingest(libtest_run(&[("api::export_c300", "ignored")]).join("\n").as_bytes())
        .unwrap();

    let outcome = session.finish().await.unwrap();
    assert!(matches!(outcome, ReportOutcome::Reported { run_id: 5, .. }));
}

#[tokio::test]
async fn test_report_skipped_submits_blocked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_run/3"))
        .and(body_json(json!({
            "suite_id": "4",
            "name": "Auto Test | 2024-01-15 10:30:00",
            "include_all": false,
            "case_ids": ["101", "300"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 8})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_results_for_cases/8"))
        .and(body_json(json!({
            "results": [
                {"case_id": "101", "status_id": 1},
                {"case_id": "300", "status_id": 2},
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ReporterConfig {
        report_skipped: true,
        ..config_for(&server.uri())
    };
    let mut session = start_session(&config);
    session
        .ingest(
            libtest_run(&[("api::login_c101", "ok"), ("api::export_c300", "ignored")])
                .join("\n")
                .as_bytes(),
        )
        .unwrap();

    session.finish().await.unwrap();
}

#[tokio::test]
async fn test_submission_failure_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_run/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_results_for_cases/9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let mut session = start_session(&config_for(&server.uri()));
    session
        .ingest(libtest_run(&[("api::login_c101", "ok")]).join("\n").as_bytes())
        .unwrap();

    assert!(session.finish().await.is_err());
}

#[tokio::test]
async fn test_explicit_markers_and_legacy_extraction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_run/3"))
        .and(body_json(json!({
            "suite_id": "4",
            "name": "Auto Test | 2024-01-15 10:30:00",
            "include_all": false,
            "case_ids": ["123456"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/add_results_for_cases/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri());
    config.extraction = ExtractionMode::Legacy;
    config
        .markers
        .insert("api::checkout".to_string(), "C123abc456".to_string());

    let mut session = start_session(&config);
    session
        .ingest(libtest_run(&[("api::checkout", "ok")]).join("\n").as_bytes())
        .unwrap();

    session.finish().await.unwrap();
}

#[test]
fn test_dump_writes_session_report() {
    let dir = create_test_dir();
    let dump = dir.path().join("results.json");

    let mut session = start_session(&ReporterConfig::default());
    session
        .ingest(
            libtest_run(&[("api::login_c101", "ok"), ("api::export_c300", "ignored")])
                .join("\n")
                .as_bytes(),
        )
        .unwrap();
    session.dump(&dump).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "passed": ["101"],
            "failed": [],
            "skipped": ["api::export_c300:300"],
            "duration": 0.5,
        })
    );
}
