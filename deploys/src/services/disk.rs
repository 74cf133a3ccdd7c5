//! Disk operations

use chrono::Utc;
use deploys_protocol::{Action, CommandKind, Empty, ErrorCode};
use tracing::info;

use super::{admit_action, create_resource, delete_resource, deployments_using, key_of, ControlPlane};
use crate::deploy::fsm::ActionFsm;
use crate::errors::ControlError;
use crate::models::disk::{
    DiskCreate, DiskDelete, DiskGet, DiskItem, DiskList, DiskListResult, DiskUpdate,
};
use crate::models::ResourceTarget;
use crate::storage::registry::Feature;
use crate::store::record::{DiskRecord, Resource, ResourceKey, ResourceMeta, ResourceType};

fn disk_key(project: &str, location: &str, name: &str) -> ResourceKey {
    ResourceKey::new(ResourceType::Disk, project, location, name)
}

fn item(r: &DiskRecord) -> DiskItem {
    DiskItem {
        project: r.meta.project.clone(),
        location: r.meta.location.clone(),
        name: r.meta.name.clone(),
        size: r.size,
        state: (&r.meta).into(),
    }
}

impl ControlPlane {
    pub fn disk_create(&self, actor: &str, req: DiskCreate) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        self.registry.require(&req.location, Feature::Disk)?;

        let now = Utc::now();
        let record = DiskRecord {
            meta: ResourceMeta::new(
                req.project.as_str(),
                req.location.as_str(),
                req.name.as_str(),
                actor,
                now,
            ),
            size: req.size as u32,
        };
        self.store
            .update(|s| create_resource(s, Resource::Disk(record), CommandKind::DiskCreate, now))?;

        info!("Creating disk {}/{} ({} Gi)", req.project, req.name, req.size);
        Ok(Empty {})
    }

    pub fn disk_update(&self, req: DiskUpdate) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = disk_key(&req.project, &req.location, &req.name);
        let size = req.size as u32;

        self.store.update(|s| -> Result<(), ControlError> {
            let Some(Resource::Disk(disk)) = s.get_mut(&key) else {
                return Err(ControlError::NotFound(ErrorCode::DiskNotFound));
            };
            if size <= disk.size {
                return Err(ControlError::Conflict(ErrorCode::DiskSizeMustScaleUp));
            }
            admit_action(&disk.meta, Action::Deploy)?;
            disk.size = size;
            ActionFsm::new(&mut disk.meta).install(
                Action::Deploy,
                CommandKind::DiskCreate,
                None,
                Utc::now(),
            );
            Ok(())
        })?;

        info!("Resizing disk {} to {} Gi", key, size);
        Ok(Empty {})
    }

    pub fn disk_get(&self, req: DiskGet) -> Result<DiskItem, ControlError> {
        let req = self.validate(req)?;
        match self.fetch(&key_of(ResourceType::Disk, &req), ErrorCode::DiskNotFound)? {
            Resource::Disk(r) => Ok(item(&r)),
            _ => Err(ControlError::NotFound(ErrorCode::DiskNotFound)),
        }
    }

    pub fn disk_list(&self, req: DiskList) -> Result<DiskListResult, ControlError> {
        let req = self.validate(req)?;
        let items = self
            .collect(ResourceType::Disk, &req)
            .iter()
            .filter_map(|r| match r {
                Resource::Disk(d) => Some(item(d)),
                _ => None,
            })
            .collect();
        Ok(DiskListResult { items })
    }

    pub fn disk_delete(&self, req: DiskDelete) -> Result<Empty, ControlError> {
        let req: ResourceTarget = self.validate(req)?;
        let key = key_of(ResourceType::Disk, &req);

        self.store.update(|s| {
            delete_resource(
                s,
                &key,
                CommandKind::DiskDelete,
                ErrorCode::DiskNotFound,
                |s| {
                    deployments_using(s, &req.project, &req.location, |spec| {
                        spec.disk.as_ref().is_some_and(|d| d.name == req.name)
                    })
                },
                Utc::now(),
            )
        })?;

        info!("Deleting disk {}", key);
        Ok(Empty {})
    }
}
