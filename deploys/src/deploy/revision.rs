//! Deployment revisions: spec merging, digests and rollback

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deploys_protocol::{DeploymentSpec, DeploymentType, ErrorCode, Status};

use crate::errors::ControlError;
use crate::models::deployment::DeploymentDeploy;
use crate::store::record::{DeploymentRecord, RevisionRecord};
use crate::utils::sha256_hash;
use crate::validate::format::valid_schedule;
use crate::validate::{ValidationError, ValidationRules, Validator};

/// Spec of a brand new deployment before the request is applied
fn initial_spec() -> DeploymentSpec {
    DeploymentSpec {
        deployment_type: DeploymentType::WebService,
        min_replicas: 1,
        max_replicas: 1,
        ..Default::default()
    }
}

/// Apply `env`, then `add`, then `remove` on top of `base`
pub fn merge_env(
    base: &BTreeMap<String, String>,
    env: Option<&BTreeMap<String, String>>,
    add: &BTreeMap<String, String>,
    remove: &[String],
) -> BTreeMap<String, String> {
    let mut merged = env.cloned().unwrap_or_else(|| base.clone());
    merged.extend(add.iter().map(|(k, v)| (k.clone(), v.clone())));
    for key in remove {
        merged.remove(key);
    }
    merged
}

fn detachable(value: &Option<String>, base: Option<String>) -> Option<String> {
    match value {
        Some(v) if v.is_empty() => None,
        Some(v) => Some(v.clone()),
        None => base,
    }
}

/// Build the next spec from the previous revision (if any) and a request
pub fn merge_spec(base: Option<&DeploymentSpec>, req: &DeploymentDeploy) -> DeploymentSpec {
    let base = base.cloned().unwrap_or_else(initial_spec);
    let mut spec = base.clone();

    spec.image = req.image.clone();
    if let Some(t) = req.deployment_type {
        spec.deployment_type = t;
    }
    if let Some(min) = req.min_replicas {
        spec.min_replicas = u32::try_from(min).unwrap_or_default();
    }
    if let Some(max) = req.max_replicas {
        spec.max_replicas = u32::try_from(max).unwrap_or_default();
    }
    if let Some(port) = req.port {
        spec.port = u16::try_from(port).ok();
    }
    if req.protocol.is_some() {
        spec.protocol = req.protocol;
    }
    spec.env = merge_env(&base.env, req.env.as_ref(), &req.add_env, &req.remove_env);
    if let Some(command) = &req.command {
        spec.command = command.clone();
    }
    if let Some(args) = &req.args {
        spec.args = args.clone();
    }
    spec.workload_identity = detachable(&req.workload_identity, base.workload_identity);
    spec.pull_secret = detachable(&req.pull_secret, base.pull_secret);
    if req.disk.is_some() {
        spec.disk = req.disk.clone();
    }
    spec.schedule = detachable(&req.schedule, base.schedule);
    if let Some(resources) = &req.resources {
        spec.resources = resources.clone();
    }
    if let Some(annotations) = &req.annotations {
        spec.annotations = annotations.clone();
    }
    if let Some(mount_data) = &req.mount_data {
        spec.mount_data = mount_data.clone();
    }
    if let Some(sidecars) = &req.sidecars {
        spec.sidecars = sidecars.clone();
    }
    spec
}

/// Checks that only hold on the merged spec
pub fn validate_spec(spec: &DeploymentSpec, rules: &ValidationRules) -> Result<(), ValidationError> {
    let mut v = Validator::new(rules);
    let t = spec.deployment_type;

    if t.requires_port() {
        v.must(spec.port.is_some_and(|p| p > 0), "port", "port required");
    }
    if t.requires_schedule() {
        match spec.schedule.as_deref() {
            None | Some("") => {
                v.must(false, "schedule", "schedule required");
            }
            Some(s) => {
                v.must(valid_schedule(s), "schedule", "schedule invalid");
            }
        }
    }
    if spec.protocol.is_some() {
        v.must(
            t.allows_protocol(),
            "protocol",
            format!("protocol not support for {}", t),
        );
    }
    v.must(
        i64::from(spec.max_replicas) <= rules.max_replicas,
        "maxReplicas",
        format!("max replicas value must be in range [0, {}]", rules.max_replicas),
    );
    v.must(
        spec.min_replicas <= spec.max_replicas,
        "maxReplicas",
        "max replicas must higher or equal min replicas",
    );
    if spec.disk.is_some() {
        v.must(
            !spec.is_autoscaling(),
            "disk",
            "using disk not support auto-scaling",
        );
    }
    v.finish()
}

/// SHA-256 of the spec's JSON encoding. Maps are ordered, so equal specs
/// always hash equal.
pub fn spec_digest(spec: &DeploymentSpec) -> Result<String, ControlError> {
    let bytes = serde_json::to_vec(spec)?;
    Ok(sha256_hash(&bytes))
}

/// Append a revision holding `spec` and return its number
pub fn push_revision(
    record: &mut DeploymentRecord,
    spec: DeploymentSpec,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<u64, ControlError> {
    let revision = record.revision + 1;
    let digest = spec_digest(&spec)?;
    record.revisions.push(RevisionRecord {
        revision,
        spec,
        digest,
        status: Status::Pending,
        created_at: now,
        created_by: actor.to_string(),
    });
    record.revision = revision;
    Ok(revision)
}

/// Spec of an earlier revision, copied unchanged
pub fn rollback_spec(record: &DeploymentRecord, revision: u64) -> Result<DeploymentSpec, ControlError> {
    record
        .revision(revision)
        .map(|r| r.spec.clone())
        .ok_or(ControlError::NotFound(ErrorCode::RevisionNotFound))
}
