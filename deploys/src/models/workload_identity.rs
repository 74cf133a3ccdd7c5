//! Workload identity models

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{age, ListScope, ResourceState, ResourceTarget, Table};
use crate::validate::format::valid_email;
use crate::validate::{Validatable, Validator};

const GSA_SUFFIX: &str = ".iam.gserviceaccount.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadIdentityCreate {
    pub project: String,
    pub location: String,
    pub name: String,
    /// Google service account e-mail
    pub gsa: String,
}

pub type WorkloadIdentityGet = ResourceTarget;
pub type WorkloadIdentityDelete = ResourceTarget;
pub type WorkloadIdentityList = ListScope;

impl Validatable for WorkloadIdentityCreate {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
        self.gsa = self.gsa.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);
        v.must(valid_email(&self.gsa), "gsa", "gsa must be an email");
        v.must(
            self.gsa.ends_with(GSA_SUFFIX),
            "gsa",
            format!("gsa must end with '{}'", GSA_SUFFIX),
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIdentityItem {
    pub project: String,
    pub location: String,
    pub name: String,
    pub gsa: String,
    #[serde(flatten)]
    pub state: ResourceState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadIdentityListResult {
    pub items: Vec<WorkloadIdentityItem>,
}

impl Table for WorkloadIdentityListResult {
    fn table(&self) -> Vec<Vec<String>> {
        let now = Utc::now();
        let mut table = vec![vec![
            "NAME".to_string(),
            "GSA".to_string(),
            "STATUS".to_string(),
            "LOCATION".to_string(),
            "AGE".to_string(),
        ]];
        for x in &self.items {
            table.push(vec![
                x.name.clone(),
                x.gsa.clone(),
                x.state.status.text().to_string(),
                x.location.clone(),
                age(x.state.created_at, now),
            ]);
        }
        table
    }
}

impl Table for WorkloadIdentityItem {
    fn table(&self) -> Vec<Vec<String>> {
        vec![
            vec![
                "NAME".to_string(),
                "GSA".to_string(),
                "STATUS".to_string(),
                "LOCATION".to_string(),
            ],
            vec![
                self.name.clone(),
                self.gsa.clone(),
                self.state.status.text().to_string(),
                self.location.clone(),
            ],
        ]
    }
}
