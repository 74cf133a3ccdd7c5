//! Control plane operations
//!
//! Each resource module adds its methods to [`ControlPlane`]. Every mutating
//! operation validates first, then performs its checks and writes inside one
//! store update.

pub mod deployer;
pub mod deployment;
pub mod disk;
pub mod location;
pub mod pullsecret;
pub mod route;
pub mod workload_identity;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use deploys_protocol::{Action, CommandKind, ErrorCode};

use crate::deploy::fsm::{admit, state_of, ActionFsm, Admission};
use crate::errors::ControlError;
use crate::models::{ListScope, ResourceTarget};
use crate::storage::registry::LocationRegistry;
use crate::storage::settings::{LimitSettings, Settings};
use crate::store::record::{Resource, ResourceKey, ResourceMeta, ResourceType};
use crate::store::{ResourceStore, StoreInner};
use crate::validate::{admit as admit_request, Validatable, ValidationRules};

/// Shared state behind every API method
#[derive(Debug, Clone)]
pub struct ControlPlane {
    pub store: Arc<ResourceStore>,
    pub registry: Arc<LocationRegistry>,
    pub rules: ValidationRules,
    pub limits: LimitSettings,
}

impl ControlPlane {
    pub fn new(
        store: Arc<ResourceStore>,
        registry: Arc<LocationRegistry>,
        rules: ValidationRules,
        limits: LimitSettings,
    ) -> Self {
        Self {
            store,
            registry,
            rules,
            limits,
        }
    }

    pub fn from_settings(settings: &Settings, store: Arc<ResourceStore>) -> Self {
        Self::new(
            store,
            Arc::new(LocationRegistry::from_settings(settings)),
            settings.validation.clone(),
            settings.limits.clone(),
        )
    }

    /// Normalize and validate a request
    pub fn validate<T: Validatable>(&self, request: T) -> Result<T, ControlError> {
        Ok(admit_request(request, &self.rules)?)
    }

    /// Clone the record under `key`, or fail with `not_found`
    pub(crate) fn fetch(&self, key: &ResourceKey, not_found: ErrorCode) -> Result<Resource, ControlError> {
        self.store
            .read(|s| s.get(key).cloned())
            .ok_or(ControlError::NotFound(not_found))
    }

    /// Clone every record of a type in a list scope
    pub(crate) fn collect(&self, resource_type: ResourceType, scope: &ListScope) -> Vec<Resource> {
        self.store.read(|s| {
            s.scan(resource_type, &scope.project, scope.location())
                .cloned()
                .collect()
        })
    }
}

pub(crate) fn key_of(resource_type: ResourceType, target: &ResourceTarget) -> ResourceKey {
    ResourceKey::new(
        resource_type,
        target.project.as_str(),
        target.location.as_str(),
        target.name.as_str(),
    )
}

/// Admission of `action` on a resource
pub(crate) fn admit_action(meta: &ResourceMeta, action: Action) -> Result<Admission, ControlError> {
    admit(state_of(meta), action).map_err(ControlError::from_code)
}

/// Create-style resources: reject a taken name, else insert and issue the create
pub(crate) fn create_resource(
    s: &mut StoreInner,
    resource: Resource,
    kind: CommandKind,
    now: DateTime<Utc>,
) -> Result<(), ControlError> {
    let key = resource.key();
    if s.get(&key).is_some() {
        return Err(ControlError::Conflict(ErrorCode::NameNotAvailable));
    }
    let mut resource = resource;
    ActionFsm::new(resource.meta_mut()).install(Action::Deploy, kind, None, now);
    s.insert(resource);
    Ok(())
}

/// Delete a non-deployment resource unless something still uses it
pub(crate) fn delete_resource(
    s: &mut StoreInner,
    key: &ResourceKey,
    kind: CommandKind,
    not_found: ErrorCode,
    in_use: impl FnOnce(&StoreInner) -> bool,
    now: DateTime<Utc>,
) -> Result<(), ControlError> {
    if s.get(key).is_none() {
        return Err(ControlError::NotFound(not_found));
    }
    if in_use(s) {
        return Err(ControlError::Conflict(ErrorCode::CanNotDelete));
    }
    let resource = s
        .get_mut(key)
        .ok_or(ControlError::NotFound(not_found))?;
    if admit_action(resource.meta(), Action::Delete)? == Admission::Noop {
        return Ok(());
    }
    ActionFsm::new(resource.meta_mut()).install(Action::Delete, kind, None, now);
    Ok(())
}

/// Live deployments in a project+location whose current spec matches `uses`.
///
/// A deployment being deleted no longer holds its references.
pub(crate) fn deployments_using(
    s: &StoreInner,
    project: &str,
    location: &str,
    uses: impl Fn(&deploys_protocol::DeploymentSpec) -> bool,
) -> bool {
    s.scan(ResourceType::Deployment, project, Some(location))
        .any(|r| match r {
            Resource::Deployment(d) => {
                !d.meta.is_deleting() && d.current().is_some_and(|rev| uses(&rev.spec))
            }
            _ => false,
        })
}
