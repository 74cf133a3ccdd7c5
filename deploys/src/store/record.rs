//! Desired-state records kept by the resource store

use std::fmt;

use chrono::{DateTime, Utc};
use deploys_protocol::{Action, CommandKind, DeploymentSpec, RouteConfig, Status};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    PullSecret,
    WorkloadIdentity,
    Disk,
    Deployment,
    Route,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::PullSecret => "pullSecret",
            ResourceType::WorkloadIdentity => "workloadIdentity",
            ResourceType::Disk => "disk",
            ResourceType::Deployment => "deployment",
            ResourceType::Route => "route",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store key: one live record per type, project, location and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub resource_type: ResourceType,
    pub project: String,
    pub location: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(
        resource_type: ResourceType,
        project: impl Into<String>,
        location: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            project: project.into(),
            location: location.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.resource_type, self.project, self.location, self.name
        )
    }
}

/// The command issued for the outstanding action, awaiting a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCommand {
    pub kind: CommandKind,
    pub revision: Option<u64>,
    pub issued_at: DateTime<Utc>,
}

/// One entry of a resource's action history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub action: Action,
    pub kind: CommandKind,
    pub revision: Option<u64>,
    pub status: Status,
    pub at: DateTime<Utc>,
}

/// Attributes shared by every resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    pub id: Uuid,
    pub project: String,
    pub location: String,
    pub name: String,
    pub status: Status,
    pub action: Action,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub success_at: Option<DateTime<Utc>>,
    /// Last failure reported by the agent
    pub message: Option<String>,
    pub pending: Option<PendingCommand>,
    pub history: Vec<ActionRecord>,
}

impl ResourceMeta {
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        name: impl Into<String>,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project: project.into(),
            location: location.into(),
            name: name.into(),
            status: Status::Pending,
            action: Action::Deploy,
            created_at: now,
            created_by: created_by.into(),
            success_at: None,
            message: None,
            pending: None,
            history: Vec::new(),
        }
    }

    /// Deleted or being deleted
    pub fn is_deleting(&self) -> bool {
        self.action == Action::Delete
    }
}

/// Immutable snapshot of one deployment revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRecord {
    pub revision: u64,
    pub spec: DeploymentSpec,
    /// SHA-256 of the canonical spec JSON
    pub digest: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub meta: ResourceMeta,
    /// Latest revision number
    pub revision: u64,
    /// Ascending by revision
    pub revisions: Vec<RevisionRecord>,
    pub node_port: Option<u16>,
}

impl DeploymentRecord {
    pub fn current(&self) -> Option<&RevisionRecord> {
        self.revisions.last()
    }

    pub fn revision(&self, revision: u64) -> Option<&RevisionRecord> {
        self.revisions.iter().find(|r| r.revision == revision)
    }

    pub fn set_revision_status(&mut self, revision: u64, status: Status) {
        if let Some(r) = self.revisions.iter_mut().find(|r| r.revision == revision) {
            r.status = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskRecord {
    pub meta: ResourceMeta,
    /// Size in GiB
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullSecretRecord {
    pub meta: ResourceMeta,
    pub server: String,
    pub username: String,
    /// Base64 docker config handed to the agent
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIdentityRecord {
    pub meta: ResourceMeta,
    pub gsa: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub meta: ResourceMeta,
    pub domain: String,
    pub path: String,
    pub target: String,
    pub config: RouteConfig,
}

impl RouteRecord {
    /// Deployment name when the route targets a deployment
    pub fn deployment(&self) -> Option<&str> {
        self.target.strip_prefix("deployment://")
    }
}

/// Any managed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Resource {
    Deployment(DeploymentRecord),
    Disk(DiskRecord),
    PullSecret(PullSecretRecord),
    WorkloadIdentity(WorkloadIdentityRecord),
    Route(RouteRecord),
}

impl Resource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Deployment(_) => ResourceType::Deployment,
            Resource::Disk(_) => ResourceType::Disk,
            Resource::PullSecret(_) => ResourceType::PullSecret,
            Resource::WorkloadIdentity(_) => ResourceType::WorkloadIdentity,
            Resource::Route(_) => ResourceType::Route,
        }
    }

    pub fn meta(&self) -> &ResourceMeta {
        match self {
            Resource::Deployment(r) => &r.meta,
            Resource::Disk(r) => &r.meta,
            Resource::PullSecret(r) => &r.meta,
            Resource::WorkloadIdentity(r) => &r.meta,
            Resource::Route(r) => &r.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ResourceMeta {
        match self {
            Resource::Deployment(r) => &mut r.meta,
            Resource::Disk(r) => &mut r.meta,
            Resource::PullSecret(r) => &mut r.meta,
            Resource::WorkloadIdentity(r) => &mut r.meta,
            Resource::Route(r) => &mut r.meta,
        }
    }

    pub fn key(&self) -> ResourceKey {
        let meta = self.meta();
        ResourceKey::new(
            self.resource_type(),
            meta.project.clone(),
            meta.location.clone(),
            meta.name.clone(),
        )
    }
}
