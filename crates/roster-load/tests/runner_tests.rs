use std::time::Duration;

use roster_load::{
    RunSummary, WorkloadConfig, run_workload,
    workload::{CHECK_GET_HAS_USERS, CHECK_GET_OK, CHECK_POST_CREATED},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn short_run(target_url: String) -> WorkloadConfig {
    WorkloadConfig {
        target_url,
        virtual_users: 2,
        duration: Duration::from_millis(600),
        iteration_pause: Duration::from_millis(100),
        request_timeout: Duration::from_secs(2),
        ..WorkloadConfig::default()
    }
}

async fn backend(list_status: u16, list_body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "k6-test-user"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 1, "name": "k6-test-user"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(list_status).set_body_json(list_body))
        .mount(&server)
        .await;
    server
}

fn tally(summary: &RunSummary, name: &str) -> (u64, u64) {
    summary
        .metrics
        .check_tallies
        .iter()
        .find(|t| t.name == name)
        .map(|t| (t.passes, t.fails))
        .unwrap_or_default()
}

#[tokio::test]
async fn test_healthy_backend_passes() {
    let server = backend(200, json!([{"id": 1, "name": "k6-test-user"}])).await;

    let summary = run_workload(&short_run(server.uri())).await.unwrap();
    let metrics = &summary.metrics;

    assert!(summary.passed(), "{summary}");
    assert!(metrics.iterations >= 2, "each VU runs at least once");
    assert_eq!(metrics.http_reqs(), metrics.iterations * 2);
    assert_eq!(metrics.http_req_failed.hits, 0);
    assert_eq!(metrics.checks.value(), 1.0);
    assert_eq!(tally(&summary, CHECK_POST_CREATED), (metrics.iterations, 0));
    assert_eq!(tally(&summary, CHECK_GET_OK), (metrics.iterations, 0));
    assert_eq!(tally(&summary, CHECK_GET_HAS_USERS), (metrics.iterations, 0));
}

#[tokio::test]
async fn test_failing_reads_fail_the_run() {
    let server = backend(500, json!({"error": "could not list users"})).await;

    let summary = run_workload(&short_run(server.uri())).await.unwrap();

    assert!(!summary.passed());
    assert_eq!(summary.metrics.http_req_failed.value(), 0.5);
    assert_eq!(tally(&summary, CHECK_GET_OK).0, 0);
    assert_eq!(tally(&summary, CHECK_POST_CREATED).1, 0);
}

#[tokio::test]
async fn test_empty_list_fails_check_only() {
    let server = backend(200, json!([])).await;

    let summary = run_workload(&short_run(server.uri())).await.unwrap();

    assert!(summary.passed(), "checks are not thresholds");
    let (passes, fails) = tally(&summary, CHECK_GET_HAS_USERS);
    assert_eq!(passes, 0);
    assert_eq!(fails, summary.metrics.iterations);
    assert!(summary.metrics.checks.value() < 1.0);
}

#[tokio::test]
async fn test_unreachable_target_fails_every_request() {
    let summary = run_workload(&short_run("http://127.0.0.1:9".to_string()))
        .await
        .unwrap();

    assert!(!summary.passed());
    assert_eq!(summary.metrics.http_req_failed.value(), 1.0);
    assert_eq!(summary.metrics.checks.hits, 0);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = WorkloadConfig {
        virtual_users: 0,
        ..WorkloadConfig::default()
    };
    assert!(run_workload(&config).await.is_err());
}

/// Reference profile against a locally running users API.
#[tokio::test]
#[ignore] // Needs the API on localhost:8080, run with `cargo test --ignored`
async fn load_test_reference_profile() {
    let summary = run_workload(&WorkloadConfig::default())
        .await
        .expect("Failed to run workload");
    println!("{summary}");

    assert!(summary.passed(), "thresholds failed");
}
