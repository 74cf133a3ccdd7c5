//! Location agent protocol tests

use deploys::models::deployment::{DeploymentGet, DeploymentGetResult};
use deploys::models::location::{Location, LocationFeatures};
use deploys::services::ControlPlane;
use deploys::storage::settings::Settings;
use deploys_protocol::{
    Action, Command, CommandKind, CommandResult, ErrorCode, GetCommandsRequest, Status,
};

use crate::common::*;

fn get(cp: &ControlPlane, name: &str) -> DeploymentGetResult {
    let t = target(name);
    cp.deployment_get(DeploymentGet {
        project: t.project,
        location: t.location,
        name: t.name,
        revision: 0,
    })
    .unwrap()
}

#[test]
fn test_web_service_round_trip() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    let Command::DeploymentDeploy(deploy) = &cmds[0] else {
        panic!("unexpected command: {:?}", cmds[0]);
    };
    assert_eq!(deploy.revision, 1);
    assert_eq!(deploy.spec.image, "nginx:1.27");
    assert_eq!(deploy.resource.project_id, PROJECT);
    assert_eq!(deploy.resource.name, "web");

    report(
        &cp,
        LOCATION,
        vec![CommandResult::success(&cmds[0]).with_node_port(31000)],
    );

    let d = get(&cp, "web");
    assert_eq!(d.status, Status::Success);
    assert_eq!(d.action, Action::Deploy);
    assert_eq!(d.revision, 1);
    assert_eq!(d.node_port, Some(31000));
    assert_eq!(d.url.as_deref(), Some("https://web-acme-prod.local.deploys.app"));
    assert!(d.address.is_none());
    assert!(d.success_at.is_some());
    assert!(commands(&cp, LOCATION).is_empty());
}

#[test]
fn test_commands_redelivered_until_acknowledged() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    let first = commands(&cp, LOCATION);
    let second = commands(&cp, LOCATION);
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[test]
fn test_repeated_results_are_idempotent() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    let cmds = commands(&cp, LOCATION);
    let result = CommandResult::success(&cmds[0]).with_node_port(31000);
    report(&cp, LOCATION, vec![result.clone()]);
    let after_first = get(&cp, "web");

    // A late failure for the same command must not flip the status
    report(&cp, LOCATION, vec![result, CommandResult::failure(&cmds[0], "boom")]);
    let after_second = get(&cp, "web");

    assert_eq!(after_second.status, Status::Success);
    assert_eq!(after_second.success_at, after_first.success_at);
    assert!(after_second.message.is_none());
}

#[test]
fn test_superseded_deploy_result_is_stale() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    let old = commands(&cp, LOCATION);

    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.28")).unwrap();
    let new = commands(&cp, LOCATION);
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].revision(), Some(2));

    report(&cp, LOCATION, vec![CommandResult::success(&old[0])]);
    let d = get(&cp, "web");
    assert_eq!(d.status, Status::Pending);
    assert_eq!(d.revision, 2);

    let revisions = cp.deployment_revisions(target("web")).unwrap();
    let first = revisions.items.iter().find(|r| r.revision == 1).unwrap();
    assert_eq!(first.status, Status::Cancelled);

    report(&cp, LOCATION, vec![CommandResult::success(&new[0])]);
    assert_eq!(get(&cp, "web").status, Status::Success);
}

#[test]
fn test_failure_result_records_message() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    let cmds = commands(&cp, LOCATION);
    report(
        &cp,
        LOCATION,
        vec![CommandResult::failure(&cmds[0], "image pull backoff")],
    );

    let d = get(&cp, "web");
    assert_eq!(d.status, Status::Error);
    assert_eq!(d.message.as_deref(), Some("image pull backoff"));
    assert!(d.success_at.is_none());
}

#[test]
fn test_delete_removes_record() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    ack_all(&cp);

    cp.deployment_delete(target("web")).unwrap();
    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentDelete);

    report(&cp, LOCATION, vec![CommandResult::success(&cmds[0])]);

    let err = cp.deployment_revisions(target("web")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeploymentNotFound);
    assert!(commands(&cp, LOCATION).is_empty());
    assert!(cp.store.is_empty());
}

#[test]
fn test_cleanup_pending_then_cleanup() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    ack_all(&cp);

    cp.deployment_delete(target("web")).unwrap();
    let cmds = commands(&cp, LOCATION);
    report(
        &cp,
        LOCATION,
        vec![CommandResult::failure(&cmds[0], "volume busy").with_cleanup_pending()],
    );
    assert_eq!(get(&cp, "web").status, Status::ErrorPendingCleanupResource);

    cp.deployment_delete(target("web")).unwrap();
    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].kind(), CommandKind::DeploymentCleanup);

    report(&cp, LOCATION, vec![CommandResult::success(&cmds[0])]);
    assert!(cp.store.is_empty());
}

#[test]
fn test_result_from_other_location_is_stale() {
    let mut settings = Settings::default();
    settings.locations.push(Location {
        id: "remote".to_string(),
        domain_suffix: ".remote.deploys.app".to_string(),
        endpoint: String::new(),
        cname: String::new(),
        features: LocationFeatures::default(),
    });
    let cp = control_plane_with(&settings);
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    assert!(commands(&cp, "remote").is_empty());

    let cmds = commands(&cp, LOCATION);
    report(&cp, "remote", vec![CommandResult::success(&cmds[0])]);
    assert_eq!(get(&cp, "web").status, Status::Pending);
    assert_eq!(commands(&cp, LOCATION).len(), 1);
}

#[test]
fn test_unknown_location() {
    let cp = control_plane();
    let err = cp
        .deployer_get_commands(GetCommandsRequest {
            location: "mars".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LocationNotAvailable);
}
