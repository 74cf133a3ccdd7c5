//! Derive agent commands from outstanding actions

use deploys_protocol::{
    Command, CommandKind, CommandTarget, DeploymentCommand, DeploymentRef, DiskCommand,
    PullSecretCommand, RouteCommand, Sidecar, WorkloadIdentityCommand,
};
use tracing::warn;

use crate::store::record::Resource;
use crate::store::StoreInner;

/// Command for the resource's outstanding action, if any
pub fn command_for(resource: &Resource) -> Option<Command> {
    let meta = resource.meta();
    let pending = meta.pending.as_ref()?;
    let target = CommandTarget {
        id: meta.id,
        project_id: meta.project.clone(),
        name: meta.name.clone(),
    };

    let deployment_ref = |target: CommandTarget| {
        pending.revision.map(|revision| DeploymentRef {
            resource: target,
            revision,
        })
    };

    let command = match (resource, pending.kind) {
        (Resource::PullSecret(r), CommandKind::PullSecretCreate) => {
            Command::PullSecretCreate(PullSecretCommand {
                resource: target,
                value: r.value.clone(),
            })
        }
        (Resource::PullSecret(_), CommandKind::PullSecretDelete) => {
            Command::PullSecretDelete(target)
        }
        (Resource::WorkloadIdentity(r), CommandKind::WorkloadIdentityCreate) => {
            Command::WorkloadIdentityCreate(WorkloadIdentityCommand {
                resource: target,
                gsa: r.gsa.clone(),
            })
        }
        (Resource::WorkloadIdentity(_), CommandKind::WorkloadIdentityDelete) => {
            Command::WorkloadIdentityDelete(target)
        }
        (Resource::Disk(r), CommandKind::DiskCreate) => Command::DiskCreate(DiskCommand {
            resource: target,
            size: r.size,
        }),
        (Resource::Disk(_), CommandKind::DiskDelete) => Command::DiskDelete(target),
        (Resource::Deployment(d), CommandKind::DeploymentDeploy) => {
            let revision = pending.revision?;
            let Some(record) = d.revision(revision) else {
                warn!("Deployment {} has no revision {}", d.meta.name, revision);
                return None;
            };
            let spec = record.spec.clone();
            let sidecars = spec.sidecars.iter().map(Sidecar::config).collect();
            Command::DeploymentDeploy(DeploymentCommand {
                resource: target,
                revision,
                spec,
                sidecars,
            })
        }
        (Resource::Deployment(_), CommandKind::DeploymentDelete) => {
            Command::DeploymentDelete(deployment_ref(target)?)
        }
        (Resource::Deployment(_), CommandKind::DeploymentPause) => {
            Command::DeploymentPause(deployment_ref(target)?)
        }
        (Resource::Deployment(_), CommandKind::DeploymentCleanup) => {
            Command::DeploymentCleanup(deployment_ref(target)?)
        }
        (Resource::Route(r), CommandKind::RouteCreate) => Command::RouteCreate(RouteCommand {
            resource: target,
            domain: r.domain.clone(),
            path: r.path.clone(),
            target: r.target.clone(),
            config: r.config.clone(),
        }),
        (Resource::Route(_), CommandKind::RouteDelete) => Command::RouteDelete(target),
        (resource, kind) => {
            warn!(
                "Command {} does not apply to {}",
                kind,
                resource.resource_type()
            );
            return None;
        }
    };
    Some(command)
}

/// Every unacknowledged command of a location.
///
/// Creates come first in dependency order (pull secrets, workload identities,
/// disks, deployments, routes), removals after them in reverse order; ties
/// break on issue time.
pub fn outstanding(inner: &StoreInner, location: &str) -> Vec<Command> {
    let mut entries: Vec<_> = inner
        .iter()
        .filter(|r| r.meta().location == location)
        .filter_map(|r| {
            let pending = r.meta().pending.as_ref()?;
            let rank = r.resource_type() as u8;
            let order = if pending.kind.is_removal() {
                (1, u8::MAX - rank)
            } else {
                (0, rank)
            };
            Some((order, pending.issued_at, command_for(r)?))
        })
        .collect();

    entries.sort_by_key(|(order, issued_at, _)| (*order, *issued_at));
    entries.into_iter().map(|(_, _, c)| c).collect()
}
