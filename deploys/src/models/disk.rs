//! Disk models

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{age, ListScope, ResourceState, ResourceTarget, Table};
use crate::validate::{Validatable, Validator};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskCreate {
    pub project: String,
    pub location: String,
    pub name: String,
    /// Size in GiB
    pub size: i64,
}

/// Same shape as create; the new size must be larger
pub type DiskUpdate = DiskCreate;
pub type DiskGet = ResourceTarget;
pub type DiskDelete = ResourceTarget;
pub type DiskList = ListScope;

impl Validatable for DiskCreate {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        let (min, max) = (v.rules().disk_min_size, v.rules().disk_max_size);

        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);
        v.must(self.size >= min, "size", format!("minimum disk size {} Gi", min));
        v.must(self.size <= max, "size", format!("maximum disk size {} Gi", max));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskItem {
    pub project: String,
    pub location: String,
    pub name: String,
    pub size: u32,
    #[serde(flatten)]
    pub state: ResourceState,
}

impl DiskItem {
    fn row(&self, now: chrono::DateTime<Utc>) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{}Gi", self.size),
            self.state.status.text().to_string(),
            self.location.clone(),
            age(self.state.created_at, now),
        ]
    }
}

fn header() -> Vec<String> {
    ["NAME", "SIZE", "STATUS", "LOCATION", "AGE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Table for DiskItem {
    fn table(&self) -> Vec<Vec<String>> {
        vec![header(), self.row(Utc::now())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskListResult {
    pub items: Vec<DiskItem>,
}

impl Table for DiskListResult {
    fn table(&self) -> Vec<Vec<String>> {
        let now = Utc::now();
        let mut table = vec![header()];
        table.extend(self.items.iter().map(|x| x.row(now)));
        table
    }
}
