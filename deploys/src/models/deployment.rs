//! Deployment models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deploys_protocol::{
    Action, DeploymentDisk, DeploymentProtocol, DeploymentResources, DeploymentSpec,
    DeploymentType, Sidecar, Status,
};
use serde::{Deserialize, Serialize};

use super::{age, ListScope, ResourceTarget, Table};
use crate::validate::format::{
    is_absolute_path, valid_env_name, valid_image, valid_schedule,
};
use crate::validate::{Validatable, Validator};

/// Deploy a new revision.
///
/// Unset fields copy from the previous revision. `env` replaces the previous
/// env, then `addEnv` entries are upserted, then `removeEnv` keys are removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentDeploy {
    pub project: String,
    pub location: String,
    pub name: String,
    pub image: String,
    #[serde(rename = "type")]
    pub deployment_type: Option<DeploymentType>,
    pub min_replicas: Option<i64>,
    pub max_replicas: Option<i64>,
    pub port: Option<u32>,
    pub protocol: Option<DeploymentProtocol>,
    pub env: Option<BTreeMap<String, String>>,
    pub add_env: BTreeMap<String, String>,
    pub remove_env: Vec<String>,
    pub command: Option<Vec<String>>,
    pub args: Option<Vec<String>>,
    /// Workload identity name, empty to detach
    pub workload_identity: Option<String>,
    /// Pull secret name, empty to detach
    pub pull_secret: Option<String>,
    pub disk: Option<DeploymentDisk>,
    pub schedule: Option<String>,
    pub resources: Option<DeploymentResources>,
    pub annotations: Option<BTreeMap<String, String>>,
    pub mount_data: Option<BTreeMap<String, String>>,
    pub sidecars: Option<Vec<Sidecar>>,
}

impl Validatable for DeploymentDeploy {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
        self.image.retain(|c| c != ' ');
        if let Some(schedule) = &mut self.schedule {
            *schedule = schedule.trim().to_string();
        }
    }

    fn validate(&self, v: &mut Validator) {
        let max_replicas = v.rules().max_replicas;

        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);
        if v.required("image", &self.image) {
            v.must(valid_image(&self.image), "image", "image invalid");
        }

        if let Some(min) = self.min_replicas {
            v.must(
                (0..=max_replicas).contains(&min),
                "minReplicas",
                format!("min replicas value must be in range [0, {}]", max_replicas),
            );
        }
        if let Some(max) = self.max_replicas {
            v.must(
                (0..=max_replicas).contains(&max),
                "maxReplicas",
                format!("max replicas value must be in range [0, {}]", max_replicas),
            );
        }
        if let (Some(min), Some(max)) = (self.min_replicas, self.max_replicas) {
            v.must(
                min <= max,
                "maxReplicas",
                "max replicas must higher or equal min replicas",
            );
            if min != max {
                v.must(
                    self.disk.is_none(),
                    "disk",
                    "using disk not support auto-scaling",
                );
            }
        }

        if let Some(disk) = &self.disk {
            v.must(!disk.name.is_empty(), "disk.name", "disk name required");
            v.must(
                !disk.mount_path.is_empty(),
                "disk.mountPath",
                "disk mount path required",
            );
            if !disk.sub_path.is_empty() {
                v.must(
                    !is_absolute_path(&disk.sub_path),
                    "disk.subPath",
                    "disk sub path must be relative path",
                );
            }
        }

        if let Some(port) = self.port {
            v.must(port > 0 && port <= u16::MAX as u32, "port", "invalid port");
        }
        if let Some(schedule) = &self.schedule {
            if !schedule.is_empty() {
                v.must(valid_schedule(schedule), "schedule", "schedule invalid");
            }
        }
        if let (Some(t), Some(_)) = (self.deployment_type, self.protocol) {
            v.must(
                t.allows_protocol(),
                "protocol",
                format!("protocol not support for {}", t),
            );
        }

        let env_ok = self
            .env
            .iter()
            .flat_map(|e| e.keys())
            .chain(self.add_env.keys())
            .all(|k| valid_env_name(k));
        v.must(env_ok, "env", "env name invalid");

        if let Some(mount_data) = &self.mount_data {
            validate_mount_data(mount_data, v);
        }

        if let Some(sidecars) = &self.sidecars {
            let max = v.rules().max_sidecars;
            v.must(
                sidecars.len() <= max,
                "sidecars",
                format!("sidecars must not exceed {} items", max),
            );
            for sidecar in sidecars {
                match sidecar {
                    Sidecar::CloudSqlProxy(s) => {
                        v.must(
                            !s.instance.is_empty(),
                            "sidecars.cloudSqlProxy",
                            "cloudSqlProxy: instance is required",
                        );
                    }
                }
            }
        }
    }
}

fn validate_mount_data(mount_data: &BTreeMap<String, String>, v: &mut Validator) {
    let (max_item, max_total) = (v.rules().mount_data_max_item, v.rules().mount_data_max_total);

    let mut total = 0;
    for (path, data) in mount_data {
        v.must(
            is_absolute_path(path),
            "mountData",
            format!("mount data path '{}' must be absolute path", path),
        );
        v.must(
            data.len() < max_item,
            "mountData",
            format!("mount data '{}' must be less than {} bytes", path, max_item),
        );
        total += data.len();
    }
    v.must(
        total < max_total,
        "mountData",
        format!("total mount data must be less than {} bytes", max_total),
    );
}

pub type DeploymentRevisions = ResourceTarget;
pub type DeploymentResume = ResourceTarget;
pub type DeploymentPause = ResourceTarget;
pub type DeploymentDelete = ResourceTarget;
pub type DeploymentList = ListScope;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentGet {
    pub project: String,
    pub location: String,
    pub name: String,
    /// 0 means latest
    pub revision: i64,
}

impl Validatable for DeploymentGet {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);
        v.must(self.revision >= 0, "revision", "invalid revision");
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentRollback {
    pub project: String,
    pub location: String,
    pub name: String,
    pub revision: i64,
}

impl Validatable for DeploymentRollback {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);
        v.must(self.revision >= 1, "revision", "invalid revision");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentItem {
    pub project: String,
    pub location: String,
    pub name: String,
    #[serde(rename = "type")]
    pub deployment_type: DeploymentType,
    pub image: String,
    pub revision: u64,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub status: Status,
    pub action: Action,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub success_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentListResult {
    pub deployments: Vec<DeploymentItem>,
}

impl Table for DeploymentListResult {
    fn table(&self) -> Vec<Vec<String>> {
        let now = Utc::now();
        let mut table = vec![vec![
            "NAME".to_string(),
            "TYPE".to_string(),
            "LOCATION".to_string(),
            "REVISION".to_string(),
            "STATUS".to_string(),
            "AGE".to_string(),
        ]];
        for x in &self.deployments {
            table.push(vec![
                x.name.clone(),
                x.deployment_type.to_string(),
                x.location.clone(),
                x.revision.to_string(),
                x.status.text().to_string(),
                age(x.created_at, now),
            ]);
        }
        table
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentGetResult {
    pub project: String,
    pub location: String,
    pub name: String,
    pub revision: u64,
    #[serde(flatten)]
    pub spec: DeploymentSpec,
    pub node_port: Option<u16>,
    /// Public URL of a web service
    pub url: Option<String>,
    /// External address of a TCP service
    pub address: Option<String>,
    pub status: Status,
    pub action: Action,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub success_at: Option<DateTime<Utc>>,
}

impl Table for DeploymentGetResult {
    fn table(&self) -> Vec<Vec<String>> {
        let endpoint = self
            .url
            .clone()
            .or_else(|| self.address.clone())
            .unwrap_or_else(|| "-".to_string());
        vec![
            vec![
                "NAME".to_string(),
                "TYPE".to_string(),
                "REVISION".to_string(),
                "IMAGE".to_string(),
                "STATUS".to_string(),
                "ENDPOINT".to_string(),
            ],
            vec![
                self.name.clone(),
                self.spec.deployment_type.to_string(),
                self.revision.to_string(),
                self.spec.image.clone(),
                self.status.text().to_string(),
                endpoint,
            ],
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionItem {
    pub revision: u64,
    #[serde(rename = "type")]
    pub deployment_type: DeploymentType,
    pub image: String,
    pub digest: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRevisionsResult {
    /// Newest first
    pub items: Vec<RevisionItem>,
}

impl Table for DeploymentRevisionsResult {
    fn table(&self) -> Vec<Vec<String>> {
        let now = Utc::now();
        let mut table = vec![vec![
            "REVISION".to_string(),
            "IMAGE".to_string(),
            "STATUS".to_string(),
            "DIGEST".to_string(),
            "AGE".to_string(),
        ]];
        for x in &self.items {
            table.push(vec![
                x.revision.to_string(),
                x.image.clone(),
                x.status.text().to_string(),
                x.digest.chars().take(12).collect(),
                age(x.created_at, now),
            ]);
        }
        table
    }
}
