//! Disk, pull secret, workload identity and route tests

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use deploys::errors::ControlError;
use deploys::models::disk::DiskCreate;
use deploys::models::location::{Location, LocationFeatures};
use deploys::models::pullsecret::{PullSecretCreate, PullSecretSpec};
use deploys::models::route::{RouteCreate, RouteRef};
use deploys::models::workload_identity::WorkloadIdentityCreate;
use deploys::models::ListScope;
use deploys::services::ControlPlane;
use deploys::storage::settings::Settings;
use deploys_protocol::{
    Command, CommandKind, CommandResult, DeploymentDisk, DeploymentType, ErrorCode, RouteBasicAuth,
    RouteConfig, RouteForwardAuth, Status,
};

use crate::common::*;

fn disk(name: &str, size: i64) -> DiskCreate {
    DiskCreate {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        name: name.to_string(),
        size,
    }
}

fn pull_secret(name: &str) -> PullSecretCreate {
    PullSecretCreate {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        name: name.to_string(),
        spec: PullSecretSpec {
            server: "ghcr.io".to_string(),
            username: "acme-bot".to_string(),
            password: "s3cret".to_string(),
        },
        value: String::new(),
    }
}

fn workload_identity(name: &str, gsa: &str) -> WorkloadIdentityCreate {
    WorkloadIdentityCreate {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        name: name.to_string(),
        gsa: gsa.to_string(),
    }
}

fn route(domain: &str, target: &str) -> RouteCreate {
    RouteCreate {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        domain: domain.to_string(),
        path: "/".to_string(),
        target: target.to_string(),
        ..Default::default()
    }
}

fn route_ref(domain: &str) -> RouteRef {
    RouteRef {
        project: PROJECT.to_string(),
        location: LOCATION.to_string(),
        domain: domain.to_string(),
        path: "/".to_string(),
    }
}

fn data_disk() -> DeploymentDisk {
    DeploymentDisk {
        name: "data".to_string(),
        mount_path: "/data".to_string(),
        sub_path: String::new(),
    }
}

fn validation_messages(err: ControlError) -> Vec<String> {
    match err {
        ControlError::Validation(v) => v.items.into_iter().map(|i| i.message).collect(),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

fn remote_settings() -> Settings {
    let mut settings = Settings::default();
    settings.locations.push(Location {
        id: "remote".to_string(),
        domain_suffix: ".remote.deploys.app".to_string(),
        endpoint: String::new(),
        cname: String::new(),
        features: LocationFeatures::default(),
    });
    settings
}

fn deploy_with_disk(cp: &ControlPlane) {
    let mut req = web_deploy("web", "nginx:1.27");
    req.disk = Some(data_disk());
    cp.deployment_deploy(ACTOR, req).unwrap();
}

#[test]
fn test_disk_lifecycle() {
    let cp = control_plane();
    cp.disk_create(ACTOR, disk("data", 5)).unwrap();

    let err = cp.disk_create(ACTOR, disk("data", 5)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NameNotAvailable);

    let cmds = commands(&cp, LOCATION);
    let Command::DiskCreate(create) = &cmds[0] else {
        panic!("unexpected command: {:?}", cmds[0]);
    };
    assert_eq!(create.size, 5);
    ack_all(&cp);

    let item = cp.disk_get(target("data")).unwrap();
    assert_eq!(item.size, 5);
    assert_eq!(item.state.status, Status::Success);

    cp.disk_delete(target("data")).unwrap();
    ack_all(&cp);
    let err = cp.disk_get(target("data")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DiskNotFound);
}

#[test]
fn test_disk_size_bounds() {
    let cp = control_plane();
    let messages = validation_messages(cp.disk_create(ACTOR, disk("data", 0)).unwrap_err());
    assert_eq!(messages, vec!["minimum disk size 1 Gi"]);

    let messages = validation_messages(cp.disk_create(ACTOR, disk("data", 21)).unwrap_err());
    assert_eq!(messages, vec!["maximum disk size 20 Gi"]);
}

#[test]
fn test_disk_must_scale_up() {
    let cp = control_plane();
    cp.disk_create(ACTOR, disk("data", 5)).unwrap();
    ack_all(&cp);

    for size in [3, 5] {
        let err = cp.disk_update(disk("data", size)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DiskSizeMustScaleUp);
    }

    cp.disk_update(disk("data", 10)).unwrap();
    let cmds = commands(&cp, LOCATION);
    assert_eq!(cmds.len(), 1);
    match &cmds[0] {
        Command::DiskCreate(c) => assert_eq!(c.size, 10),
        other => panic!("unexpected command: {other:?}"),
    }

    let err = cp.disk_update(disk("logs", 10)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DiskNotFound);
}

#[test]
fn test_disk_in_use_can_not_delete() {
    let cp = control_plane();
    cp.disk_create(ACTOR, disk("data", 5)).unwrap();
    deploy_with_disk(&cp);
    ack_all(&cp);

    let err = cp.disk_delete(target("data")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotDelete);

    cp.deployment_delete(target("web")).unwrap();
    ack_all(&cp);
    cp.disk_delete(target("data")).unwrap();
}

#[test]
fn test_disk_freed_while_user_deleting() {
    let cp = control_plane();
    cp.disk_create(ACTOR, disk("data", 5)).unwrap();
    deploy_with_disk(&cp);
    ack_all(&cp);

    cp.deployment_delete(target("web")).unwrap();
    cp.disk_delete(target("data")).unwrap();

    let kinds: Vec<CommandKind> = commands(&cp, LOCATION).iter().map(Command::kind).collect();
    assert_eq!(kinds, vec![CommandKind::DeploymentDelete, CommandKind::DiskDelete]);
}

#[test]
fn test_deploy_requires_references() {
    let cp = control_plane();

    let mut req = web_deploy("web", "nginx:1.27");
    req.disk = Some(data_disk());
    let err = cp.deployment_deploy(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DiskNotFound);

    let mut req = web_deploy("web", "nginx:1.27");
    req.pull_secret = Some("registry".to_string());
    let err = cp.deployment_deploy(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PullSecretNotFound);

    let mut req = web_deploy("web", "nginx:1.27");
    req.workload_identity = Some("runner".to_string());
    let err = cp.deployment_deploy(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::WorkloadIdentityNotFound);

    assert!(cp.store.is_empty());
}

#[test]
fn test_deleting_reference_is_not_live() {
    let cp = control_plane();
    cp.pullsecret_create(ACTOR, pull_secret("registry")).unwrap();
    ack_all(&cp);
    cp.pullsecret_delete(target("registry")).unwrap();

    let mut req = web_deploy("web", "nginx:1.27");
    req.pull_secret = Some("registry".to_string());
    let err = cp.deployment_deploy(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PullSecretNotFound);
}

#[test]
fn test_location_features() {
    let cp = control_plane_with(&remote_settings());

    let mut req = disk("data", 5);
    req.location = "remote".to_string();
    let err = cp.disk_create(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::LocationNotSupport);

    let mut req = workload_identity("runner", "ci@acme.iam.gserviceaccount.com");
    req.location = "remote".to_string();
    let err = cp.workload_identity_create(ACTOR, req).unwrap_err();
    assert_eq!(err.code(), ErrorCode::LocationNotSupport);
}

#[test]
fn test_commands_ordered_by_dependency() {
    let cp = control_plane();
    cp.disk_create(ACTOR, disk("data", 5)).unwrap();
    cp.pullsecret_create(ACTOR, pull_secret("registry")).unwrap();

    let mut req = web_deploy("web", "nginx:1.27");
    req.disk = Some(data_disk());
    req.pull_secret = Some("registry".to_string());
    cp.deployment_deploy(ACTOR, req).unwrap();

    let kinds: Vec<CommandKind> = commands(&cp, LOCATION).iter().map(Command::kind).collect();
    assert_eq!(
        kinds,
        vec![
            CommandKind::PullSecretCreate,
            CommandKind::DiskCreate,
            CommandKind::DeploymentDeploy,
        ]
    );
}

#[test]
fn test_removals_ordered_after_dependents() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    cp.route_create(ACTOR, route("www.acme.com", "deployment://web"))
        .unwrap();
    ack_all(&cp);

    cp.deployment_delete(target("web")).unwrap();
    cp.route_delete(route_ref("www.acme.com")).unwrap();

    let kinds: Vec<CommandKind> = commands(&cp, LOCATION).iter().map(Command::kind).collect();
    assert_eq!(kinds, vec![CommandKind::RouteDelete, CommandKind::DeploymentDelete]);
}

#[test]
fn test_pull_secret_password_hidden() {
    let cp = control_plane();
    cp.pullsecret_create(ACTOR, pull_secret("registry")).unwrap();

    let item = cp.pullsecret_get(target("registry")).unwrap();
    assert_eq!(item.spec.server, "ghcr.io");
    assert_eq!(item.spec.username, "acme-bot");
    assert!(item.spec.password.is_empty());

    let cmds = commands(&cp, LOCATION);
    let Command::PullSecretCreate(create) = &cmds[0] else {
        panic!("unexpected command: {:?}", cmds[0]);
    };
    let config = String::from_utf8(STANDARD.decode(&create.value).unwrap()).unwrap();
    let config: serde_json::Value = serde_json::from_str(&config).unwrap();
    assert_eq!(config["auths"]["ghcr.io"]["username"], "acme-bot");
    assert_eq!(config["auths"]["ghcr.io"]["password"], "s3cret");
}

#[test]
fn test_pull_secret_in_use() {
    let cp = control_plane();
    cp.pullsecret_create(ACTOR, pull_secret("registry")).unwrap();
    let mut req = web_deploy("web", "nginx:1.27");
    req.pull_secret = Some("registry".to_string());
    cp.deployment_deploy(ACTOR, req).unwrap();

    let err = cp.pullsecret_delete(target("registry")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanNotDelete);

    // Detaching the secret frees it
    let mut req = web_deploy("web", "nginx:1.28");
    req.pull_secret = Some(String::new());
    cp.deployment_deploy(ACTOR, req).unwrap();
    cp.pullsecret_delete(target("registry")).unwrap();
}

#[test]
fn test_workload_identity_gsa() {
    let cp = control_plane();
    let messages = validation_messages(
        cp.workload_identity_create(ACTOR, workload_identity("runner", "ci@gmail.com"))
            .unwrap_err(),
    );
    assert_eq!(
        messages,
        vec!["gsa must end with '.iam.gserviceaccount.com'"]
    );

    cp.workload_identity_create(
        ACTOR,
        workload_identity("runner", "ci@acme.iam.gserviceaccount.com"),
    )
    .unwrap();
    let item = cp.workload_identity_get(target("runner")).unwrap();
    assert_eq!(item.gsa, "ci@acme.iam.gserviceaccount.com");

    let list = cp
        .workload_identity_list(ListScope {
            project: PROJECT.to_string(),
            location: LOCATION.to_string(),
        })
        .unwrap();
    assert_eq!(list.items.len(), 1);
}

#[test]
fn test_route_to_deployment() {
    let cp = control_plane();

    let err = cp
        .route_create(ACTOR, route("www.acme.com", "deployment://web"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeploymentNotFound);

    let mut worker = web_deploy("worker", "acme/worker:1");
    worker.deployment_type = Some(DeploymentType::Worker);
    worker.port = None;
    cp.deployment_deploy(ACTOR, worker).unwrap();
    let err = cp
        .route_create(ACTOR, route("www.acme.com", "deployment://worker"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CanMapOnlyService);

    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    cp.route_create(ACTOR, route("WWW.Acme.com.", "deployment://web"))
        .unwrap();

    let item = cp.route_get(route_ref("www.acme.com")).unwrap();
    assert_eq!(item.domain, "www.acme.com");
    assert_eq!(item.path, "/");
    assert_eq!(item.target, "deployment://web");

    // Domain and path are unique across projects
    let mut other = route("www.acme.com", "redirect://https://acme.com");
    other.project = "other-project".to_string();
    let err = cp.route_create(ACTOR, other).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NameNotAvailable);
}

#[test]
fn test_route_legacy_deployment_field() {
    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();

    let mut req = route("www.acme.com", "");
    req.deployment = "web".to_string();
    cp.route_create(ACTOR, req).unwrap();

    let item = cp.route_get(route_ref("www.acme.com")).unwrap();
    assert_eq!(item.target, "deployment://web");
}

#[test]
fn test_route_target_rules() {
    let cp = control_plane();

    let messages = validation_messages(
        cp.route_create(ACTOR, route("www.acme.com", "https://acme.com"))
            .unwrap_err(),
    );
    assert_eq!(messages, vec!["target invalid"]);

    let messages =
        validation_messages(cp.route_create(ACTOR, route("www.acme.com", "web")).unwrap_err());
    assert_eq!(messages, vec!["target invalid"]);

    cp.route_create(ACTOR, route("docs.acme.com", "ipfs://bafybeigdyrzt"))
        .unwrap();
}

#[test]
fn test_route_auth_config() {
    let cp = control_plane();

    let mut req = route("www.acme.com", "redirect://https://acme.com");
    req.config = RouteConfig {
        basic_auth: Some(RouteBasicAuth {
            user: "admin".to_string(),
            password: "pw".to_string(),
        }),
        forward_auth: Some(RouteForwardAuth {
            target: "http://auth.internal/verify".to_string(),
            ..Default::default()
        }),
    };
    let messages = validation_messages(cp.route_create(ACTOR, req).unwrap_err());
    assert_eq!(messages, vec!["basicAuth and forwardAuth cannot be used together"]);

    let mut req = route("www.acme.com", "redirect://https://acme.com");
    req.config.forward_auth = Some(RouteForwardAuth {
        target: "https://auth.internal/verify".to_string(),
        ..Default::default()
    });
    let messages = validation_messages(cp.route_create(ACTOR, req).unwrap_err());
    assert_eq!(messages, vec!["target must start with http://"]);
}

#[test]
fn test_failed_create_keeps_message() {
    let cp = control_plane();
    cp.disk_create(ACTOR, disk("data", 5)).unwrap();

    let cmds = commands(&cp, LOCATION);
    report(
        &cp,
        LOCATION,
        vec![CommandResult::failure(&cmds[0], "quota exceeded")],
    );

    let item = cp.disk_get(target("data")).unwrap();
    assert_eq!(item.state.status, Status::Error);
    assert_eq!(item.state.message.as_deref(), Some("quota exceeded"));
}
