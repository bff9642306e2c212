mod common;

use axum_test::TestServer;

#[tokio::test]
async fn health_reports_service_and_version() {
    let (state, _store) = common::test_state();
    let app = zikr_api::routes::router().with_state(state);
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/health").await;
    resp.assert_status_ok();

    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "zikr-api");
    assert!(body["version"].is_string());
}
