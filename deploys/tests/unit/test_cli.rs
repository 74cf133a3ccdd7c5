//! CLI runner tests against an in-process control plane

use std::sync::Arc;

use clap::Parser;
use deploys::cli::runner::execute_with;
use deploys::cli::Cli;
use deploys::errors::ControlError;
use deploys::http::api::Api;
use deploys::http::invoker::LocalInvoker;
use deploys::services::ControlPlane;
use deploys_protocol::{CommandKind, ErrorCode};
use serde_json::Value;

use crate::common::*;

async fn run(api: &Api, args: &[&str]) -> Result<String, ControlError> {
    let mut argv = vec!["deploys"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    execute_with(api, cli.command, cli.output).await
}

fn api() -> (Api, ControlPlane) {
    let cp = control_plane();
    (Api::new(Arc::new(LocalInvoker::new(cp.clone(), ACTOR))), cp)
}

const DEPLOY: &[&str] = &[
    "deployment",
    "deploy",
    "--project",
    PROJECT,
    "--location",
    LOCATION,
    "--name",
    "web",
    "--image",
    "nginx:1.27",
    "--type",
    "WebService",
    "--port",
    "8080",
];

#[tokio::test]
async fn test_deploy_and_list() {
    let (api, cp) = api();
    let out = run(&api, DEPLOY).await.unwrap();
    assert_eq!(out, "Operation success\n");

    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentDeploy);

    let out = run(&api, &["deployment", "list", "--project", PROJECT])
        .await
        .unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("NAME"));
    assert!(lines[1].starts_with("web"));
    assert!(lines[1].contains("WebService"));
    assert!(lines[1].contains("Pending"));
}

#[tokio::test]
async fn test_json_output() {
    let (api, _) = api();
    run(&api, DEPLOY).await.unwrap();

    let out = run(
        &api,
        &[
            "-o", "json", "deployment", "get", "--project", PROJECT, "--location", LOCATION,
            "--name", "web",
        ],
    )
    .await
    .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["name"], "web");
    assert_eq!(value["revision"], 1);
    assert_eq!(value["createdBy"], ACTOR);
}

#[tokio::test]
async fn test_set_image_keeps_spec() {
    let (api, cp) = api();
    run(&api, DEPLOY).await.unwrap();
    ack_all(&cp);

    run(
        &api,
        &[
            "deployment", "set-image", "web", "--project", PROJECT, "--location", LOCATION,
            "--image", "nginx:1.28",
        ],
    )
    .await
    .unwrap();

    let out = run(
        &api,
        &[
            "-o", "yaml", "deployment", "revisions", "--project", PROJECT, "--location",
            LOCATION, "--name", "web",
        ],
    )
    .await
    .unwrap();
    let value: Value = serde_yaml::from_str(&out).unwrap();
    assert_eq!(value["items"][0]["revision"], 2);
    assert_eq!(value["items"][0]["image"], "nginx:1.28");
    assert_eq!(value["items"][0]["type"], "WebService");
}

#[tokio::test]
async fn test_remote_error_code() {
    let (api, _) = api();
    let err = run(
        &api,
        &[
            "disk", "get", "--project", PROJECT, "--location", LOCATION, "--name", "data",
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DiskNotFound);
}

#[tokio::test]
async fn test_validation_error() {
    let (api, _) = api();
    let err = run(
        &api,
        &[
            "disk", "create", "--project", PROJECT, "--location", LOCATION, "--name", "data",
            "--size", "50",
        ],
    )
    .await
    .unwrap_err();
    match err {
        ControlError::Validation(v) => assert!(v.has_message("maximum disk size 20 Gi")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_location_list() {
    let (api, _) = api();
    let out = run(&api, &["-o", "json", "location", "list"]).await.unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["locations"][0]["id"], "local");
}

#[tokio::test]
async fn test_serve_is_not_a_resource_command() {
    let (api, _) = api();
    let err = run(&api, &["serve"]).await.unwrap_err();
    assert!(matches!(err, ControlError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_agent_calls_through_api() {
    let (api, _) = api();
    run(&api, DEPLOY).await.unwrap();

    let cmds = api.get_commands(LOCATION).await.unwrap();
    assert_eq!(cmds.len(), 1);
    let results = cmds
        .iter()
        .map(|c| deploys_protocol::CommandResult::success(c).with_node_port(31000))
        .collect();
    api.set_results(LOCATION, results).await.unwrap();

    assert!(api.get_commands(LOCATION).await.unwrap().is_empty());
    let out = run(
        &api,
        &[
            "-o", "json", "deployment", "get", "--project", PROJECT, "--location", LOCATION,
            "--name", "web",
        ],
    )
    .await
    .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["nodePort"], 31000);
}
