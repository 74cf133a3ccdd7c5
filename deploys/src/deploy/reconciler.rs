//! Apply agent results onto the store

use chrono::{DateTime, Utc};
use deploys_protocol::{CommandKind, CommandResult};
use tracing::{debug, info, warn};

use super::fsm::{ActionFsm, Applied};
use crate::store::record::Resource;
use crate::store::StoreInner;

/// Counts of one result batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub applied: usize,
    pub removed: usize,
    pub stale: usize,
}

/// Apply every result independently; stale entries are dropped
pub fn reconcile(
    inner: &mut StoreInner,
    location: &str,
    results: &[CommandResult],
    now: DateTime<Utc>,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    for result in results {
        match apply_result(inner, location, result, now) {
            Applied::Status(_) => summary.applied += 1,
            Applied::Removed => summary.removed += 1,
            Applied::Stale => summary.stale += 1,
        }
    }
    summary
}

pub fn apply_result(
    inner: &mut StoreInner,
    location: &str,
    result: &CommandResult,
    now: DateTime<Utc>,
) -> Applied {
    let Some(key) = inner.key_of(&result.id).cloned() else {
        debug!("Dropping {} result for unknown resource {}", result.kind, result.id);
        return Applied::Stale;
    };
    let Some(resource) = inner.get_mut(&key) else {
        return Applied::Stale;
    };
    if resource.meta().location != location {
        warn!(
            "Dropping {} result for {} reported by location {}",
            result.kind, key, location
        );
        return Applied::Stale;
    }

    let applied = ActionFsm::new(resource.meta_mut()).apply(result, now);

    match (applied, resource) {
        (Applied::Stale, _) => {
            debug!(
                "Dropping stale {} result for {} (revision {:?})",
                result.kind, key, result.revision
            );
        }
        (Applied::Status(status), Resource::Deployment(d))
            if result.kind == CommandKind::DeploymentDeploy =>
        {
            if let Some(revision) = result.revision {
                d.set_revision_status(revision, status);
            }
            if result.success {
                if let Some(port) = result.node_port {
                    d.node_port = Some(port);
                }
            }
            info!("{} revision {:?} is {}", key, result.revision, status.as_str());
        }
        (Applied::Status(status), _) => {
            info!("{} {} is {}", key, result.kind, status.as_str());
        }
        (Applied::Removed, _) => {}
    }

    if applied == Applied::Removed {
        inner.remove(&key);
        info!("{} removed", key);
    }
    applied
}
