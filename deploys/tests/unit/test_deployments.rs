//! Deployment lifecycle tests

use std::collections::BTreeMap;

use deploys::errors::ControlError;
use deploys::models::deployment::{DeploymentGet, DeploymentGetResult, DeploymentRollback};
use deploys::models::disk::DiskCreate;
use deploys::models::ListScope;
use deploys::services::ControlPlane;
use deploys::storage::settings::Settings;
use deploys::validate::ValidationError;
use deploys_protocol::{
    Action, CommandKind, CommandResult, DeploymentDisk, DeploymentType, ErrorCode, Status,
};

use crate::common::*;

fn get_revision(
    cp: &ControlPlane,
    name: &str,
    revision: i64,
) -> Result<DeploymentGetResult, ControlError> {
    cp.deployment_get(DeploymentGet {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        name: name.to_string(),
        revision,
    })
}

fn rollback(name: &str, revision: i64) -> DeploymentRollback {
    DeploymentRollback {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        name: name.to_string(),
        revision,
    }
}

fn validation(err: ControlError) -> ValidationError {
    match err {
        ControlError::Validation(v) => v,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_revisions_increase() {
    let cp = control_plane();
    for image in ["nginx:1.25", "nginx:1.26", "nginx:1.27"] {
        cp.deployment_deploy(ACTOR, web_deploy("web", image)).unwrap();
        ack_all(&cp);
    }

    let revisions = cp.deployment_revisions(target("web")).unwrap();
    let numbers: Vec<u64> = revisions.items.iter().map(|r| r.revision).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
    assert!(revisions.items.iter().all(|r| r.status == Status::Success));
    assert_eq!(revisions.items[0].image, "nginx:1.27");
}

#[test]
fn test_rollback_copies_spec() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    ack_all(&cp);
    let mut second = web_deploy("web", "nginx:1.28");
    second.add_env = env(&[("MODE", "canary")]);
    cp.deployment_deploy(ACTOR, second).unwrap();
    ack_all(&cp);

    cp.deployment_rollback(ACTOR, rollback("web", 1)).unwrap();

    let first = get_revision(&cp, "web", 1).unwrap();
    let current = get_revision(&cp, "web", 0).unwrap();
    assert_eq!(current.revision, 3);
    assert_eq!(current.spec, first.spec);
    assert_eq!(current.status, Status::Pending);

    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentDeploy);
    assert_eq!(cmds[0].revision(), Some(3));
}

#[test]
fn test_rollback_invalid_revision() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    ack_all(&cp);

    let err = validation(cp.deployment_rollback(ACTOR, rollback("web", 0)).unwrap_err());
    assert!(err.has_message("invalid revision"));

    let err = cp.deployment_rollback(ACTOR, rollback("web", 9)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::RevisionNotFound);

    let err = cp.deployment_rollback(ACTOR, rollback("api", 1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeploymentNotFound);
}

#[test]
fn test_get_revision() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    assert_eq!(get_revision(&cp, "web", 1).unwrap().spec.image, "nginx:1.27");

    let err = get_revision(&cp, "web", 2).unwrap_err();
    assert_eq!(err.code(), ErrorCode::RevisionNotFound);

    let err = validation(get_revision(&cp, "web", -1).unwrap_err());
    assert!(err.has_message("invalid revision"));
}

#[test]
fn test_tcp_service_address() {
    let cp = control_plane();
    let mut req = web_deploy("pg-db", "postgres:16");
    req.deployment_type = Some(DeploymentType::TcpService);
    req.port = Some(5432);
    cp.deployment_deploy(ACTOR, req).unwrap();

    let cmds = commands(&cp, LOCATION);
    report(
        &cp,
        LOCATION,
        vec![CommandResult::success(&cmds[0]).with_node_port(32001)],
    );

    let d = get_revision(&cp, "pg-db", 0).unwrap();
    assert!(d.url.is_none());
    assert_eq!(d.address.as_deref(), Some("pg-db-acme-prod.local.deploys.app:32001"));
}

#[test]
fn test_disk_rejects_autoscaling() {
    let cp = control_plane();
    cp.disk_create(
        ACTOR,
        DiskCreate {
            project: PROJECT.to_string(),
            location: LOCATION.to_string(),
            name: "data".to_string(),
            size: 5,
        },
    )
    .unwrap();

    let disk = DeploymentDisk {
        name: "data".to_string(),
        mount_path: "/data".to_string(),
        sub_path: String::new(),
    };

    let mut req = web_deploy("web", "nginx:1.27");
    req.disk = Some(disk.clone());
    req.max_replicas = Some(3);
    let err = validation(cp.deployment_deploy(ACTOR, req).unwrap_err());
    assert!(err.has_message("using disk not support auto-scaling"));
    assert!(err.items.iter().any(|i| i.field == "disk"));

    let mut req = web_deploy("web", "nginx:1.27");
    req.disk = Some(disk);
    cp.deployment_deploy(ACTOR, req).unwrap();

    // Scaling out later is checked against the merged spec
    let mut req = web_deploy("web", "nginx:1.27");
    req.min_replicas = None;
    req.max_replicas = Some(3);
    let err = validation(cp.deployment_deploy(ACTOR, req).unwrap_err());
    assert!(err.has_message("using disk not support auto-scaling"));
}

#[test]
fn test_type_not_allow_change() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    ack_all(&cp);

    let mut req = web_deploy("web", "nginx:1.27");
    req.deployment_type = Some(DeploymentType::Worker);
    req.port = None;
    let err = cp.deployment_deploy(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeNotAllowChange);

    // Omitting the type keeps it
    let mut req = web_deploy("web", "nginx:1.28");
    req.deployment_type = None;
    cp.deployment_deploy(ACTOR, req).unwrap();
    let d = get_revision(&cp, "web", 0).unwrap();
    assert_eq!(d.spec.deployment_type, DeploymentType::WebService);
}

#[test]
fn test_pause_and_resume() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    // The deploy is still outstanding
    let err = cp.deployment_pause(target("web")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotPause);

    let err = cp.deployment_resume(target("web")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotResume);

    ack_all(&cp);
    cp.deployment_pause(target("web")).unwrap();
    // Pausing again while outstanding is a no-op
    cp.deployment_pause(target("web")).unwrap();

    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentPause);
    ack_all(&cp);

    let d = get_revision(&cp, "web", 0).unwrap();
    assert_eq!(d.action, Action::Pause);
    assert_eq!(d.status, Status::Success);

    let err = cp.deployment_pause(target("web")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotPause);

    cp.deployment_resume(target("web")).unwrap();
    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentDeploy);
    assert_eq!(cmds[0].revision(), Some(1));
}

#[test]
fn test_deploy_while_deleting() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    ack_all(&cp);
    cp.deployment_delete(target("web")).unwrap();

    let err = cp
        .deployment_deploy(ACTOR, web_deploy("web", "nginx:1.28"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotDeploy);

    let err = cp.deployment_pause(target("web")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotPause);

    // A second delete is a no-op
    cp.deployment_delete(target("web")).unwrap();
    assert_eq!(commands(&cp, LOCATION).len(), 1);
}

#[test]
fn test_delete_supersedes_deploy() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    cp.deployment_delete(target("web")).unwrap();

    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentDelete);
}

#[test]
fn test_env_merge() {
    let cp = control_plane();
    let mut req = web_deploy("web", "nginx:1.27");
    req.env = Some(env(&[("A", "1"), ("B", "2")]));
    cp.deployment_deploy(ACTOR, req).unwrap();
    ack_all(&cp);

    let mut req = web_deploy("web", "nginx:1.28");
    req.add_env = env(&[("C", "3")]);
    req.remove_env = vec!["A".to_string()];
    cp.deployment_deploy(ACTOR, req).unwrap();

    let d = get_revision(&cp, "web", 0).unwrap();
    assert_eq!(d.spec.env, env(&[("B", "2"), ("C", "3")]));

    // A full env replaces the previous one
    let mut req = web_deploy("web", "nginx:1.28");
    req.env = Some(env(&[("Z", "26")]));
    cp.deployment_deploy(ACTOR, req).unwrap();
    let d = get_revision(&cp, "web", 0).unwrap();
    assert_eq!(d.spec.env, env(&[("Z", "26")]));
}

#[test]
fn test_max_deployments_per_project() {
    let mut settings = Settings::default();
    settings.limits.max_deployments_per_project = 2;
    let cp = control_plane_with(&settings);

    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    cp.deployment_deploy(ACTOR, web_deploy("api", "nginx:1.27")).unwrap();

    let err = cp
        .deployment_deploy(ACTOR, web_deploy("worker", "nginx:1.27"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MaximumDeploymentReach);

    // Existing deployments can still be redeployed
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.28")).unwrap();
}

#[test]
fn test_unknown_location_rejected() {
    let cp = control_plane();
    let mut req = web_deploy("web", "nginx:1.27");
    req.location = "mars".to_string();
    let err = cp.deployment_deploy(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::LocationNotAvailable);
    assert!(cp.store.is_empty());
}

#[test]
fn test_name_validation() {
    let cp = control_plane();
    let cases = vec![
        ("web".to_string(), true),
        ("api-server-2".to_string(), true),
        ("ab".to_string(), false),
        ("a".repeat(27), true),
        ("a".repeat(28), false),
        ("Web".to_string(), false),
        ("1web".to_string(), false),
        ("web-".to_string(), false),
        ("we_b".to_string(), false),
    ];

    for (name, ok) in cases {
        let result = cp.deployment_deploy(ACTOR, web_deploy(&name, "nginx:1.27"));
        assert_eq!(result.is_ok(), ok, "name {name:?}");
        if !ok {
            let err = validation(result.unwrap_err());
            assert!(err.items.iter().all(|i| i.field == "name"), "name {name:?}");
        }
    }
}

#[test]
fn test_list_scoped_to_project() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    let mut other = web_deploy("web", "nginx:1.27");
    other.project = "other-project".to_string();
    cp.deployment_deploy(ACTOR, other).unwrap();

    let list = cp
        .deployment_list(ListScope {
            project: PROJECT.to_string(),
            location: String::new(),
        })
        .unwrap();
    assert_eq!(list.deployments.len(), 1);
    assert_eq!(list.deployments[0].project, PROJECT);
    assert_eq!(list.deployments[0].created_by, ACTOR);
}
