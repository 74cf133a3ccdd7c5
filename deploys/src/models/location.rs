//! Location models

use serde::{Deserialize, Serialize};

use super::Table;
use crate::validate::{Validatable, Validator};

/// Optional capabilities of a location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationFeatures {
    pub workload_identity: bool,
    pub disk: bool,
}

/// Execution domain served by its own agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub domain_suffix: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub cname: String,
    #[serde(default)]
    pub features: LocationFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationList {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationGet {
    pub id: String,
}

impl Validatable for LocationList {
    fn validate(&self, _v: &mut Validator) {}
}

impl Validatable for LocationGet {
    fn normalize(&mut self) {
        self.id = self.id.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.required("id", &self.id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationListResult {
    pub locations: Vec<Location>,
}

impl Table for LocationListResult {
    fn table(&self) -> Vec<Vec<String>> {
        let mut table = vec![vec![
            "ID".to_string(),
            "DOMAIN SUFFIX".to_string(),
            "ENDPOINT".to_string(),
            "CNAME".to_string(),
        ]];
        for x in &self.locations {
            table.push(vec![
                x.id.clone(),
                x.domain_suffix.clone(),
                x.endpoint.clone(),
                x.cname.clone(),
            ]);
        }
        table
    }
}

impl Table for Location {
    fn table(&self) -> Vec<Vec<String>> {
        vec![
            vec![
                "ID".to_string(),
                "DOMAIN SUFFIX".to_string(),
                "WORKLOAD IDENTITY".to_string(),
                "DISK".to_string(),
            ],
            vec![
                self.id.clone(),
                self.domain_suffix.clone(),
                self.features.workload_identity.to_string(),
                self.features.disk.to_string(),
            ],
        ]
    }
}
