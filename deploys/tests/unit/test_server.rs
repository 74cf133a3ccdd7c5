//! HTTP transport tests

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use deploys::server::serve::router;
use deploys::server::state::ServerState;
use deploys_protocol::{Envelope, ErrorCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::*;

fn app() -> (Router, deploys::services::ControlPlane) {
    let cp = control_plane();
    (router(Arc::new(ServerState::new(cp.clone()))), cp)
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(method: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/{}", method))
        .header("content-type", "application/json")
        .header("x-forwarded-user", "alice@acme.com")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn deploy_body() -> Value {
    json!({
        "project": PROJECT,
        "location": LOCATION,
        "name": "web",
        "image": "nginx:1.27",
        "type": "WebService",
        "port": 8080,
        "minReplicas": 1,
        "maxReplicas": 1,
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "deploys");
    assert_eq!(body["resources"], 0);
}

#[tokio::test]
async fn test_version() {
    let (app, _) = app();
    let request = Request::builder().uri("/version").body(Body::empty()).unwrap();
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_deploy_records_actor() {
    let (app, cp) = app();
    let (status, body) = call(app.clone(), post("deployment.deploy", deploy_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "result": {} }));

    let (status, body) = call(
        app.clone(),
        post(
            "deployment.get",
            json!({ "project": PROJECT, "location": LOCATION, "name": "web" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["createdBy"], "alice@acme.com");
    assert_eq!(body["result"]["status"], "pending");

    let (_, body) = call(app, post("deployer.getCommands", json!({ "location": LOCATION }))).await;
    let commands = body["result"]["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].get("deploymentDeploy").is_some());
    assert_eq!(cp.store.len(), 1);
}

#[tokio::test]
async fn test_unknown_method() {
    let (app, _) = app();
    let (status, body) = call(app, post("deployment.explode", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let envelope: Envelope<Value> = serde_json::from_value(body).unwrap();
    assert!(!envelope.ok);
    assert_eq!(envelope.error.unwrap().code, ErrorCode::MethodNotFound);
}

#[tokio::test]
async fn test_validation_error() {
    let (app, _) = app();
    let mut body = deploy_body();
    body["name"] = json!("Web_Server");
    let (status, body) = call(app, post("deployment.deploy", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "validation");
    let items = body["error"]["items"].as_array().unwrap();
    assert!(items.iter().all(|i| i["field"] == "name"));
    assert!(!items.is_empty());
}

#[tokio::test]
async fn test_not_found() {
    let (app, _) = app();
    let (status, body) = call(
        app,
        post(
            "disk.get",
            json!({ "project": PROJECT, "location": LOCATION, "name": "data" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "diskNotFound");
}

#[tokio::test]
async fn test_malformed_body() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/deployment.deploy")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalidRequest");
}

#[tokio::test]
async fn test_empty_body_lists_locations() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/location.list")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["locations"][0]["id"], "local");
}
