//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use deploys_protocol::Envelope;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::ControlError;
use crate::server::state::ServerState;
use crate::services::ControlPlane;
use crate::utils::version_info;

/// Header set by the fronting auth proxy
pub const ACTOR_HEADER: &str = "x-forwarded-user";

const ANONYMOUS: &str = "anonymous";

/// Every method served under `POST /{method}`
pub const METHODS: &[&str] = &[
    "deployer.getCommands",
    "deployer.setResults",
    "deployment.deploy",
    "deployment.get",
    "deployment.list",
    "deployment.revisions",
    "deployment.resume",
    "deployment.pause",
    "deployment.rollback",
    "deployment.delete",
    "disk.create",
    "disk.get",
    "disk.list",
    "disk.update",
    "disk.delete",
    "pullsecret.create",
    "pullsecret.get",
    "pullsecret.list",
    "pullsecret.delete",
    "workloadidentity.create",
    "workloadidentity.get",
    "workloadidentity.list",
    "workloadidentity.delete",
    "route.create",
    "route.get",
    "route.list",
    "route.delete",
    "location.list",
    "location.get",
];

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: i64,
    pub resources: usize,
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "deploys".to_string(),
        version: version_info().version,
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        resources: state.control.store.len(),
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

/// `POST /{method}`: decode, dispatch and wrap the result in an envelope
pub async fn method_handler(
    State(state): State<Arc<ServerState>>,
    Path(method): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let actor = headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS);

    debug!("{} called by {}", method, actor);
    match dispatch(&state.control, &method, actor, &body) {
        Ok(result) => Json(Envelope::ok(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Decode a request body; an empty body is the default request
fn parse<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ControlError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ControlError::InvalidRequest(e.to_string()))
}

fn reply<T: Serialize>(result: Result<T, ControlError>) -> Result<Value, ControlError> {
    Ok(serde_json::to_value(result?)?)
}

/// Route one API call to the control plane
pub fn dispatch(
    cp: &ControlPlane,
    method: &str,
    actor: &str,
    body: &[u8],
) -> Result<Value, ControlError> {
    match method {
        "deployer.getCommands" => reply(cp.deployer_get_commands(parse(body)?)),
        "deployer.setResults" => reply(cp.deployer_set_results(parse(body)?)),

        "deployment.deploy" => reply(cp.deployment_deploy(actor, parse(body)?)),
        "deployment.get" => reply(cp.deployment_get(parse(body)?)),
        "deployment.list" => reply(cp.deployment_list(parse(body)?)),
        "deployment.revisions" => reply(cp.deployment_revisions(parse(body)?)),
        "deployment.resume" => reply(cp.deployment_resume(parse(body)?)),
        "deployment.pause" => reply(cp.deployment_pause(parse(body)?)),
        "deployment.rollback" => reply(cp.deployment_rollback(actor, parse(body)?)),
        "deployment.delete" => reply(cp.deployment_delete(parse(body)?)),

        "disk.create" => reply(cp.disk_create(actor, parse(body)?)),
        "disk.get" => reply(cp.disk_get(parse(body)?)),
        "disk.list" => reply(cp.disk_list(parse(body)?)),
        "disk.update" => reply(cp.disk_update(parse(body)?)),
        "disk.delete" => reply(cp.disk_delete(parse(body)?)),

        "pullsecret.create" => reply(cp.pullsecret_create(actor, parse(body)?)),
        "pullsecret.get" => reply(cp.pullsecret_get(parse(body)?)),
        "pullsecret.list" => reply(cp.pullsecret_list(parse(body)?)),
        "pullsecret.delete" => reply(cp.pullsecret_delete(parse(body)?)),

        "workloadidentity.create" => reply(cp.workload_identity_create(actor, parse(body)?)),
        "workloadidentity.get" => reply(cp.workload_identity_get(parse(body)?)),
        "workloadidentity.list" => reply(cp.workload_identity_list(parse(body)?)),
        "workloadidentity.delete" => reply(cp.workload_identity_delete(parse(body)?)),

        "route.create" => reply(cp.route_create(actor, parse(body)?)),
        "route.get" => reply(cp.route_get(parse(body)?)),
        "route.list" => reply(cp.route_list(parse(body)?)),
        "route.delete" => reply(cp.route_delete(parse(body)?)),

        "location.list" => reply(cp.location_list(parse(body)?)),
        "location.get" => reply(cp.location_get(parse(body)?)),

        _ => Err(ControlError::MethodNotFound(method.to_string())),
    }
}
