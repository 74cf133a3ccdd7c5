//! Route operations

use chrono::Utc;
use deploys_protocol::{CommandKind, DeploymentType, Empty, ErrorCode};
use tracing::info;

use super::{create_resource, delete_resource, ControlPlane};
use crate::errors::ControlError;
use crate::models::route::{
    route_name, RouteCreate, RouteDelete, RouteGet, RouteItem, RouteList, RouteListResult,
    RouteRef,
};
use crate::store::record::{Resource, ResourceKey, ResourceMeta, ResourceType, RouteRecord};
use crate::validate::ValidationError;

fn route_key(req: &RouteRef) -> ResourceKey {
    ResourceKey::new(
        ResourceType::Route,
        req.project.as_str(),
        req.location.as_str(),
        route_name(&req.domain, &req.path),
    )
}

fn item(r: &RouteRecord) -> RouteItem {
    RouteItem {
        project: r.meta.project.clone(),
        location: r.meta.location.clone(),
        domain: r.domain.clone(),
        path: r.path.clone(),
        target: r.target.clone(),
        deployment: r.deployment().unwrap_or_default().to_string(),
        config: r.config.clone(),
        state: (&r.meta).into(),
    }
}

impl ControlPlane {
    pub fn route_create(&self, actor: &str, req: RouteCreate) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        self.registry.get(&req.location)?;
        if !self.registry.valid_route_target(&req.target) {
            return Err(ValidationError::single("target", "target invalid").into());
        }

        let now = Utc::now();
        let name = route_name(&req.domain, &req.path);
        let record = RouteRecord {
            meta: ResourceMeta::new(
                req.project.as_str(),
                req.location.as_str(),
                name.as_str(),
                actor,
                now,
            ),
            domain: req.domain.clone(),
            path: req.path.clone(),
            target: req.target.clone(),
            config: req.config.clone(),
        };

        self.store.update(|s| -> Result<(), ControlError> {
            // Domain and path are global across projects and locations
            let taken = s.iter().any(|r| match r {
                Resource::Route(other) => other.domain == record.domain && other.path == record.path,
                _ => false,
            });
            if taken {
                return Err(ControlError::Conflict(ErrorCode::NameNotAvailable));
            }

            if let Some(deployment) = record.deployment() {
                let key = ResourceKey::new(
                    ResourceType::Deployment,
                    req.project.as_str(),
                    req.location.as_str(),
                    deployment,
                );
                let d = s
                    .deployment(&key)
                    .ok_or(ControlError::NotFound(ErrorCode::DeploymentNotFound))?;
                let is_service = d
                    .current()
                    .is_some_and(|r| r.spec.deployment_type == DeploymentType::WebService);
                if !is_service {
                    return Err(ControlError::Conflict(ErrorCode::CanMapOnlyService));
                }
            }

            create_resource(s, Resource::Route(record), CommandKind::RouteCreate, now)
        })?;

        info!("Creating route {}{} -> {}", req.domain, req.path, req.target);
        Ok(Empty {})
    }

    pub fn route_get(&self, req: RouteGet) -> Result<RouteItem, ControlError> {
        let req = self.validate(req)?;
        match self.fetch(&route_key(&req), ErrorCode::RouteNotFound)? {
            Resource::Route(r) => Ok(item(&r)),
            _ => Err(ControlError::NotFound(ErrorCode::RouteNotFound)),
        }
    }

    pub fn route_list(&self, req: RouteList) -> Result<RouteListResult, ControlError> {
        let req = self.validate(req)?;
        let items = self
            .collect(ResourceType::Route, &req)
            .iter()
            .filter_map(|r| match r {
                Resource::Route(route) => Some(item(route)),
                _ => None,
            })
            .collect();
        Ok(RouteListResult { items })
    }

    pub fn route_delete(&self, req: RouteDelete) -> Result<Empty, ControlError> {
        let req = self.validate(req)?;
        let key = route_key(&req);

        self.store.update(|s| {
            delete_resource(
                s,
                &key,
                CommandKind::RouteDelete,
                ErrorCode::RouteNotFound,
                |_| false,
                Utc::now(),
            )
        })?;

        info!("Deleting route {}{}", req.domain, req.path);
        Ok(Empty {})
    }
}
