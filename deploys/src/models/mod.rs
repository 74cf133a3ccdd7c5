//! API request and result models

pub mod deployment;
pub mod disk;
pub mod location;
pub mod pullsecret;
pub mod route;
pub mod workload_identity;

use chrono::{DateTime, Utc};
use deploys_protocol::{Action, Status};
use serde::{Deserialize, Serialize};

use crate::store::record::ResourceMeta;
use crate::validate::{Validatable, Validator};

/// Results rendered as a text table by the CLI
pub trait Table {
    /// Header row first
    fn table(&self) -> Vec<Vec<String>>;
}

impl Table for deploys_protocol::Empty {
    fn table(&self) -> Vec<Vec<String>> {
        vec![vec!["Operation success".to_string()]]
    }
}

/// Identifies one named resource in a project and location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceTarget {
    pub project: String,
    pub location: String,
    pub name: String,
}

impl Validatable for ResourceTarget {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);
    }
}

/// List scope: one project, optionally one location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListScope {
    pub project: String,
    /// Empty lists every location
    pub location: String,
}

impl ListScope {
    pub fn location(&self) -> Option<&str> {
        Some(self.location.as_str()).filter(|l| !l.is_empty())
    }
}

impl Validatable for ListScope {
    fn normalize(&mut self) {
        self.location = self.location.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
    }
}

/// Reconciliation state shared by every resource item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    pub status: Status,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub success_at: Option<DateTime<Utc>>,
}

impl From<&ResourceMeta> for ResourceState {
    fn from(meta: &ResourceMeta) -> Self {
        Self {
            status: meta.status,
            action: meta.action,
            message: meta.message.clone(),
            created_at: meta.created_at,
            created_by: meta.created_by.clone(),
            success_at: meta.success_at,
        }
    }
}

/// Compact age of a timestamp, e.g. `3d`, `5h`, `12m`, `40s`
pub fn age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        s if s >= 86_400 => format!("{}d", s / 86_400),
        s if s >= 3_600 => format!("{}h", s / 3_600),
        s if s >= 60 => format!("{}m", s / 60),
        s => format!("{}s", s),
    }
}
