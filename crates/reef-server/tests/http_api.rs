//! HTTP API integration tests over the assembled router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use reef_server::{ReefServer, ServerConfig};
use reef_store::{ConnectionConfig, ModelStore};
use reef_training::SimulatorTiming;

fn make_server() -> ReefServer {
    let pool = reef_store::new_in_memory(&ConnectionConfig::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = reef_store::run_migrations(&conn).unwrap();
    }
    ReefServer::new(
        ServerConfig::default(),
        Arc::new(ModelStore::new(pool)),
        SimulatorTiming {
            epoch_duration: Duration::from_millis(40),
            validation_pause: Duration::from_millis(10),
        },
        None,
    )
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

fn training_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Test",
        "type": "CNN",
        "architecture": "resnet",
        "epochs": 1,
        "batchSize": 10,
        "learningRate": 0.01,
        "datasetSize": 10
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = make_server().router();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 0);
    assert_eq!(body["active_jobs"], 0);
}

#[tokio::test]
async fn models_list_starts_empty() {
    let app = make_server().router();
    let (status, body) = get(&app, "/api/models").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn unknown_model_is_404() {
    let app = make_server().router();
    let (status, body) = get(&app, "/api/models/no-such-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no-such-id"));
}

#[tokio::test]
async fn unknown_model_metrics_is_404() {
    let app = make_server().router();
    let (status, _body) = get(&app, "/api/models/no-such-id/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_training_creates_model_and_completes() {
    let server = make_server();
    let app = server.router();

    let (status, body) = post_json(&app, "/api/training/start", training_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["modelId"].as_str().unwrap().to_owned();

    // the single-batch job finishes quickly and leaves the active set
    for _ in 0..100 {
        if server.controller().progress(&id.as_str().into()).await.is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let (status, record) = get(&app, &format!("/api/models/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "ready");
    assert_eq!(record["isActive"], true);

    let (status, report) = get(&app, &format!("/api/models/{id}/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["epochs"].as_array().unwrap().len(), 1);
    assert_eq!(report["confusionMatrix"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn invalid_training_config_is_400() {
    let app = make_server().router();
    let mut body = training_body();
    body["epochs"] = serde_json::json!(0);
    let (status, response) = post_json(&app, "/api/training/start", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("epochs"));
}

#[tokio::test]
async fn running_job_visible_then_stoppable() {
    let app = make_server().router();
    let mut body = training_body();
    body["epochs"] = serde_json::json!(50);
    body["datasetSize"] = serde_json::json!(1000);

    let (_, created) = post_json(&app, "/api/training/start", body).await;
    let id = created["modelId"].as_str().unwrap().to_owned();

    let (status, progress) = get(&app, &format!("/api/training/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["totalEpochs"], 50);

    let (status, active) = get(&app, "/api/training").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active.as_array().unwrap().len(), 1);

    let (status, stopped) = post_json(&app, &format!("/api/training/{id}/stop"), serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stopped["stopped"], true);

    let (status, stopped_again) =
        post_json(&app, &format!("/api/training/{id}/stop"), serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stopped_again["stopped"], false);

    let (status, _) = get(&app, &format!("/api/training/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stop_unknown_job_reports_false() {
    let app = make_server().router();
    let (status, body) = post_json(&app, "/api/training/ghost/stop", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stopped"], false);
}

#[tokio::test]
async fn metrics_endpoint_without_recorder_is_404() {
    let app = make_server().router();
    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ws_route_rejects_plain_http() {
    let app = make_server().router();
    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = make_server().router();
    let (status, _) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
