//! Workload identity operations

use chrono::Utc;
use deploys_protocol::{CommandKind, Empty, ErrorCode};
use tracing::info;

use super::{create_resource, delete_resource, deployments_using, key_of, ControlPlane};
use crate::errors::ControlError;
use crate::models::workload_identity::{
    WorkloadIdentityCreate, WorkloadIdentityDelete, WorkloadIdentityGet, WorkloadIdentityItem,
    WorkloadIdentityList, WorkloadIdentityListResult,
};
use crate::storage::registry::Feature;
use crate::store::record::{Resource, ResourceMeta, ResourceType, WorkloadIdentityRecord};

fn item(r: &WorkloadIdentityRecord) -> WorkloadIdentityItem {
    WorkloadIdentityItem {
        project: r.meta.project.clone(),
        location: r.meta.location.clone(),
        name: r.meta.name.clone(),
        gsa: r.gsa.clone(),
        state: (&r.meta).into(),
    }
}

impl ControlPlane {
    pub fn workload_identity_create(
        &self,
        actor: &str,
        req: WorkloadIdentityCreate,
    ) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        self.registry
            .require(&req.location, Feature::WorkloadIdentity)?;

        let now = Utc::now();
        let record = WorkloadIdentityRecord {
            meta: ResourceMeta::new(
                req.project.as_str(),
                req.location.as_str(),
                req.name.as_str(),
                actor,
                now,
            ),
            gsa: req.gsa.clone(),
        };
        self.store.update(|s| {
            create_resource(
                s,
                Resource::WorkloadIdentity(record),
                CommandKind::WorkloadIdentityCreate,
                now,
            )
        })?;

        info!("Creating workload identity {}/{} for {}", req.project, req.name, req.gsa);
        Ok(Empty {})
    }

    pub fn workload_identity_get(
        &self,
        req: WorkloadIdentityGet,
    ) -> Result<WorkloadIdentityItem, ControlError> {
        let req = self.validate(req)?;
        let key = key_of(ResourceType::WorkloadIdentity, &req);
        match self.fetch(&key, ErrorCode::WorkloadIdentityNotFound)? {
            Resource::WorkloadIdentity(r) => Ok(item(&r)),
            _ => Err(ControlError::NotFound(ErrorCode::WorkloadIdentityNotFound)),
        }
    }

    pub fn workload_identity_list(
        &self,
        req: WorkloadIdentityList,
    ) -> Result<WorkloadIdentityListResult, ControlError> {
        let req = self.validate(req)?;
        let items = self
            .collect(ResourceType::WorkloadIdentity, &req)
            .iter()
            .filter_map(|r| match r {
                Resource::WorkloadIdentity(w) => Some(item(w)),
                _ => None,
            })
            .collect();
        Ok(WorkloadIdentityListResult { items })
    }

    pub fn workload_identity_delete(
        &self,
        req: WorkloadIdentityDelete,
    ) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = key_of(ResourceType::WorkloadIdentity, &req);

        self.store.update(|s| {
            delete_resource(
                s,
                &key,
                CommandKind::WorkloadIdentityDelete,
                ErrorCode::WorkloadIdentityNotFound,
                |s| {
                    deployments_using(s, &req.project, &req.location, |spec| {
                        spec.workload_identity.as_deref() == Some(req.name.as_str())
                    })
                },
                Utc::now(),
            )
        })?;

        info!("Deleting workload identity {}", key);
        Ok(Empty {})
    }
}
