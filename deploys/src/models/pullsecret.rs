//! Pull secret models

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{age, ListScope, ResourceState, ResourceTarget, Table};
use crate::validate::format::{valid_base64, valid_registry};
use crate::validate::{Validatable, Validator};

/// Registry credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullSecretSpec {
    pub server: String,
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullSecretCreate {
    pub project: String,
    pub location: String,
    pub name: String,
    pub spec: PullSecretSpec,
    /// Prebuilt base64 docker config; replaces `spec` when set
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

pub type PullSecretGet = ResourceTarget;
pub type PullSecretDelete = ResourceTarget;
pub type PullSecretList = ListScope;

impl PullSecretCreate {
    /// Base64 docker config JSON handed to the agent
    pub fn docker_config(&self) -> String {
        if !self.value.is_empty() {
            return self.value.clone();
        }
        let auth = STANDARD.encode(format!("{}:{}", self.spec.username, self.spec.password));
        let mut auths = serde_json::Map::new();
        auths.insert(
            self.spec.server.clone(),
            json!({
                "username": self.spec.username,
                "password": self.spec.password,
                "auth": auth,
            }),
        );
        STANDARD.encode(json!({ "auths": auths }).to_string())
    }
}

impl Validatable for PullSecretCreate {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.location = self.location.trim().to_string();
        self.spec.server = self.spec.server.trim().to_string();
        self.spec.username = self.spec.username.trim().to_string();
        self.value = self.value.trim().to_string();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        v.name("name", &self.name);

        if !self.value.is_empty() {
            v.must(valid_base64(&self.value), "value", "value invalid");
            return;
        }
        if v.required("spec.server", &self.spec.server) {
            v.must(
                valid_registry(&self.spec.server),
                "spec.server",
                "spec.server must be an url",
            );
        }
        v.required("spec.username", &self.spec.username);
        v.required("spec.password", &self.spec.password);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullSecretItem {
    pub project: String,
    pub location: String,
    pub name: String,
    /// Server and username only
    pub spec: PullSecretSpec,
    #[serde(flatten)]
    pub state: ResourceState,
}

fn header() -> Vec<String> {
    ["NAME", "STATUS", "LOCATION", "AGE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl PullSecretItem {
    fn row(&self, now: chrono::DateTime<Utc>) -> Vec<String> {
        vec![
            self.name.clone(),
            self.state.status.text().to_string(),
            self.location.clone(),
            age(self.state.created_at, now),
        ]
    }
}

impl Table for PullSecretItem {
    fn table(&self) -> Vec<Vec<String>> {
        vec![header(), self.row(Utc::now())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullSecretListResult {
    pub items: Vec<PullSecretItem>,
}

impl Table for PullSecretListResult {
    fn table(&self) -> Vec<Vec<String>> {
        let now = Utc::now();
        let mut table = vec![header()];
        table.extend(self.items.iter().map(|x| x.row(now)));
        table
    }
}
