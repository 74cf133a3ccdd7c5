//! Pull secret operations

use chrono::Utc;
use deploys_protocol::{CommandKind, Empty, ErrorCode};
use tracing::info;

use super::{create_resource, delete_resource, deployments_using, key_of, ControlPlane};
use crate::errors::ControlError;
use crate::models::pullsecret::{
    PullSecretCreate, PullSecretDelete, PullSecretGet, PullSecretItem, PullSecretList,
    PullSecretListResult, PullSecretSpec,
};
use crate::store::record::{PullSecretRecord, Resource, ResourceMeta, ResourceType};

fn item(r: &PullSecretRecord) -> PullSecretItem {
    PullSecretItem {
        project: r.meta.project.clone(),
        location: r.meta.location.clone(),
        name: r.meta.name.clone(),
        spec: PullSecretSpec {
            server: r.server.clone(),
            username: r.username.clone(),
            password: String::new(),
        },
        state: (&r.meta).into(),
    }
}

impl ControlPlane {
    pub fn pullsecret_create(&self, actor: &str, req: PullSecretCreate) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        self.registry.get(&req.location)?;

        let now = Utc::now();
        let record = PullSecretRecord {
            meta: ResourceMeta::new(
                req.project.as_str(),
                req.location.as_str(),
                req.name.as_str(),
                actor,
                now,
            ),
            server: req.spec.server.clone(),
            username: req.spec.username.clone(),
            value: req.docker_config(),
        };
        self.store.update(|s| {
            create_resource(s, Resource::PullSecret(record), CommandKind::PullSecretCreate, now)
        })?;

        info!("Creating pull secret {}/{}", req.project, req.name);
        Ok(Empty {})
    }

    pub fn pullsecret_get(&self, req: PullSecretGet) -> Result<PullSecretItem, ControlError> {
        let req = self.validate(req)?;
        match self.fetch(&key_of(ResourceType::PullSecret, &req), ErrorCode::PullSecretNotFound)? {
            Resource::PullSecret(r) => Ok(item(&r)),
            _ => Err(ControlError::NotFound(ErrorCode::PullSecretNotFound)),
        }
    }

    pub fn pullsecret_list(&self, req: PullSecretList) -> Result<PullSecretListResult, ControlError> {
        let req = self.validate(req)?;
        let items = self
            .collect(ResourceType::PullSecret, &req)
            .iter()
            .filter_map(|r| match r {
                Resource::PullSecret(p) => Some(item(p)),
                _ => None,
            })
            .collect();
        Ok(PullSecretListResult { items })
    }

    pub fn pullsecret_delete(&self, req: PullSecretDelete) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = key_of(ResourceType::PullSecret, &req);

        self.store.update(|s| {
            delete_resource(
                s,
                &key,
                CommandKind::PullSecretDelete,
                ErrorCode::PullSecretNotFound,
                |s| {
                    deployments_using(s, &req.project, &req.location, |spec| {
                        spec.pull_secret.as_deref() == Some(req.name.as_str())
                    })
                },
                Utc::now(),
            )
        })?;

        info!("Deleting pull secret {}", key);
        Ok(Empty {})
    }
}
