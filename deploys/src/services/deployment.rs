//! Deployment operations

use chrono::{DateTime, Utc};
use deploys_protocol::{
    Action, CommandKind, DeploymentSpec, DeploymentType, Empty, ErrorCode, Status,
};
use tracing::info;

use super::{admit_action, key_of, ControlPlane};
use crate::deploy::fsm::{ActionFsm, Admission};
use crate::deploy::revision::{merge_spec, push_revision, rollback_spec, validate_spec};
use crate::errors::ControlError;
use crate::models::deployment::{
    DeploymentDelete, DeploymentDeploy, DeploymentGet, DeploymentGetResult, DeploymentItem,
    DeploymentList, DeploymentListResult, DeploymentPause, DeploymentResume,
    DeploymentRevisions, DeploymentRevisionsResult, DeploymentRollback, RevisionItem,
};
use crate::models::ResourceTarget;
use crate::storage::registry::Feature;
use crate::store::record::{DeploymentRecord, Resource, ResourceKey, ResourceMeta, ResourceType};
use crate::store::StoreInner;

/// Issue a deployment command, cancelling the revision of a superseded deploy
fn issue(
    record: &mut DeploymentRecord,
    action: Action,
    kind: CommandKind,
    revision: u64,
    now: DateTime<Utc>,
) {
    let cancelled = ActionFsm::new(&mut record.meta).install(action, kind, Some(revision), now);
    if let Some(c) = cancelled {
        if let (CommandKind::DeploymentDeploy, Some(rev)) = (c.kind, c.revision) {
            record.set_revision_status(rev, Status::Cancelled);
        }
    }
    if kind == CommandKind::DeploymentDeploy {
        record.set_revision_status(revision, Status::Pending);
    }
}

fn deployment_key(target: &ResourceTarget) -> ResourceKey {
    key_of(ResourceType::Deployment, target)
}

fn item(d: &DeploymentRecord) -> DeploymentItem {
    let spec = d.current().map(|r| r.spec.clone()).unwrap_or_default();
    DeploymentItem {
        project: d.meta.project.clone(),
        location: d.meta.location.clone(),
        name: d.meta.name.clone(),
        deployment_type: spec.deployment_type,
        image: spec.image,
        revision: d.revision,
        min_replicas: spec.min_replicas,
        max_replicas: spec.max_replicas,
        status: d.meta.status,
        action: d.meta.action,
        created_at: d.meta.created_at,
        created_by: d.meta.created_by.clone(),
        success_at: d.meta.success_at,
    }
}

impl ControlPlane {
    /// Disk, pull secret and workload identity must exist next to the deployment
    fn check_references(
        &self,
        s: &StoreInner,
        project: &str,
        location: &str,
        spec: &DeploymentSpec,
    ) -> Result<(), ControlError> {
        let live = |resource_type: ResourceType, name: &str| {
            s.get(&ResourceKey::new(resource_type, project, location, name))
                .is_some_and(|r| !r.meta().is_deleting())
        };

        if let Some(disk) = &spec.disk {
            self.registry.require(location, Feature::Disk)?;
            if !live(ResourceType::Disk, &disk.name) {
                return Err(ControlError::NotFound(ErrorCode::DiskNotFound));
            }
        }
        if let Some(name) = &spec.pull_secret {
            if !live(ResourceType::PullSecret, name) {
                return Err(ControlError::NotFound(ErrorCode::PullSecretNotFound));
            }
        }
        if let Some(name) = &spec.workload_identity {
            self.registry.require(location, Feature::WorkloadIdentity)?;
            if !live(ResourceType::WorkloadIdentity, name) {
                return Err(ControlError::NotFound(ErrorCode::WorkloadIdentityNotFound));
            }
        }
        Ok(())
    }

    pub fn deployment_deploy(&self, actor: &str, req: DeploymentDeploy) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        self.registry.get(&req.location)?;

        let key = ResourceKey::new(
            ResourceType::Deployment,
            req.project.as_str(),
            req.location.as_str(),
            req.name.as_str(),
        );
        let now = Utc::now();

        let revision = self.store.update(|s| -> Result<u64, ControlError> {
            let base = match s.deployment(&key) {
                Some(d) => {
                    admit_action(&d.meta, Action::Deploy)?;
                    let current = d.current().map(|r| &r.spec);
                    if let (Some(t), Some(spec)) = (req.deployment_type, current) {
                        if t != spec.deployment_type {
                            return Err(ControlError::Conflict(ErrorCode::TypeNotAllowChange));
                        }
                    }
                    current.cloned()
                }
                None => {
                    let count = s.scan(ResourceType::Deployment, &req.project, None).count();
                    if count >= self.limits.max_deployments_per_project {
                        return Err(ControlError::Conflict(ErrorCode::MaximumDeploymentReach));
                    }
                    None
                }
            };

            let spec = merge_spec(base.as_ref(), &req);
            validate_spec(&spec, &self.rules)?;
            self.check_references(s, &req.project, &req.location, &spec)?;

            if s.deployment(&key).is_none() {
                s.insert(Resource::Deployment(DeploymentRecord {
                    meta: ResourceMeta::new(
                        req.project.as_str(),
                        req.location.as_str(),
                        req.name.as_str(),
                        actor,
                        now,
                    ),
                    revision: 0,
                    revisions: Vec::new(),
                    node_port: None,
                }));
            }
            let record = s
                .deployment_mut(&key)
                .ok_or_else(|| ControlError::Internal(format!("{} vanished", key)))?;
            let revision = push_revision(record, spec, actor, now)?;
            issue(record, Action::Deploy, CommandKind::DeploymentDeploy, revision, now);
            Ok(revision)
        })?;

        info!("Deploying {} revision {} by {}", key, revision, actor);
        Ok(Empty {})
    }

    pub fn deployment_rollback(
        &self,
        actor: &str,
        req: DeploymentRollback,
    ) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = ResourceKey::new(
            ResourceType::Deployment,
            req.project.as_str(),
            req.location.as_str(),
            req.name.as_str(),
        );
        let now = Utc::now();

        let revision = self.store.update(|s| -> Result<u64, ControlError> {
            let d = s
                .deployment(&key)
                .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;
            admit_action(&d.meta, Action::Deploy)?;
            let spec = rollback_spec(d, req.revision as u64)?;
            self.check_references(s, &req.project, &req.location, &spec)?;

            let record = s
                .deployment_mut(&key)
                .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;
            let revision = push_revision(record, spec, actor, now)?;
            issue(record, Action::Deploy, CommandKind::DeploymentDeploy, revision, now);
            Ok(revision)
        })?;

        info!(
            "Rolled back {} to revision {} as revision {} by {}",
            key, req.revision, revision, actor
        );
        Ok(Empty {})
    }

    pub fn deployment_pause(&self, req: DeploymentPause) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = deployment_key(&req);

        self.store.update(|s| -> Result<(), ControlError> {
            let record = s
                .deployment_mut(&key)
                .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;
            if admit_action(&record.meta, Action::Pause)? == Admission::Noop {
                return Ok(());
            }
            let revision = record.revision;
            issue(record, Action::Pause, CommandKind::DeploymentPause, revision, Utc::now());
            info!("Pausing {}", key);
            Ok(())
        })?;
        Ok(Empty {})
    }

    pub fn deployment_resume(&self, req: DeploymentResume) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = deployment_key(&req);

        self.store.update(|s| -> Result<(), ControlError> {
            let record = s
                .deployment_mut(&key)
                .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;
            if record.meta.action != Action::Pause {
                return Err(ControlError::Conflict(ErrorCode::CanNotResume));
            }
            admit_action(&record.meta, Action::Deploy)?;
            let revision = record.revision;
            issue(record, Action::Deploy, CommandKind::DeploymentDeploy, revision, Utc::now());
            info!("Resuming {} at revision {}", key, revision);
            Ok(())
        })?;
        Ok(Empty {})
    }

    pub fn deployment_delete(&self, req: DeploymentDelete) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = deployment_key(&req);

        self.store.update(|s| -> Result<(), ControlError> {
            let record = s
                .deployment_mut(&key)
                .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;
            if admit_action(&record.meta, Action::Delete)? == Admission::Noop {
                return Ok(());
            }
            let kind = if record.meta.status == Status::ErrorPendingCleanupResource {
                CommandKind::DeploymentCleanup
            } else {
                CommandKind::DeploymentDelete
            };
            let revision = record.revision;
            issue(record, Action::Delete, kind, revision, Utc::now());
            info!("Deleting {} ({})", key, kind);
            Ok(())
        })?;
        Ok(Empty {})
    }

    pub fn deployment_get(&self, req: DeploymentGet) -> Result<DeploymentGetResult, ControlError> {
        let req = self.validate(req)?;
        let key = ResourceKey::new(
            ResourceType::Deployment,
            req.project.as_str(),
            req.location.as_str(),
            req.name.as_str(),
        );
        let d = self
            .store
            .read(|s| s.deployment(&key).cloned())
            .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;

        let revision = if req.revision == 0 {
            d.current()
        } else {
            d.revision(req.revision as u64)
        }
        .ok_or(ControlError::NotFound(ErrorCode::RevisionNotFound))?;

        let suffix = self
            .registry
            .get(&d.meta.location)
            .map(|l| l.domain_suffix.clone())
            .unwrap_or_default();
        let host = format!("{}-{}{}", d.meta.name, d.meta.project, suffix);
        let spec = revision.spec.clone();
        let url = (spec.deployment_type == DeploymentType::WebService)
            .then(|| format!("https://{}", host));
        let address = match (spec.deployment_type, d.node_port) {
            (DeploymentType::TcpService, Some(port)) => Some(format!("{}:{}", host, port)),
            _ => None,
        };

        Ok(DeploymentGetResult {
            project: d.meta.project.clone(),
            location: d.meta.location.clone(),
            name: d.meta.name.clone(),
            revision: revision.revision,
            spec,
            node_port: d.node_port,
            url,
            address,
            status: d.meta.status,
            action: d.meta.action,
            message: d.meta.message.clone(),
            created_at: d.meta.created_at,
            created_by: d.meta.created_by.clone(),
            success_at: d.meta.success_at,
        })
    }

    pub fn deployment_list(&self, req: DeploymentList) -> Result<DeploymentListResult, ControlError> {
        let req = self.validate(req)?;
        let deployments = self
            .collect(ResourceType::Deployment, &req)
            .iter()
            .filter_map(|r| match r {
                Resource::Deployment(d) => Some(item(d)),
                _ => None,
            })
            .collect();
        Ok(DeploymentListResult { deployments })
    }

    pub fn deployment_revisions(
        &self,
        req: DeploymentRevisions,
    ) -> Result<DeploymentRevisionsResult, ControlError> {
        let req = self.validate(req)?;
        let key = deployment_key(&req);
        let d = self
            .store
            .read(|s| s.deployment(&key).cloned())
            .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;

        let items = d
            .revisions
            .iter()
            .rev()
            .map(|r| RevisionItem {
                revision: r.revision,
                deployment_type: r.spec.deployment_type,
                image: r.spec.image.clone(),
                digest: r.digest.clone(),
                status: r.status,
                created_at: r.created_at,
                created_by: r.created_by.clone(),
            })
            .collect();
        Ok(DeploymentRevisionsResult { items })
    }
}
