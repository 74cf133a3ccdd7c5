//! Route models

use deploys_protocol::RouteConfig;
use serde::{Deserialize, Serialize};

use super::{ListScope, ResourceState, Table};
use crate::validate::format::{valid_dns_name, valid_url};
use crate::validate::{Validatable, Validator};

pub const DEPLOYMENT_SCHEME: &str = "deployment://";

/// Name a route is stored under
pub fn route_name(domain: &str, path: &str) -> String {
    format!("{}{}", domain, path)
}

fn normalize_domain_path(domain: &mut String, path: &mut String) {
    *domain = domain.trim().trim_end_matches('.').to_lowercase();
    *path = path.trim().to_string();
    if path.is_empty() {
        *path = "/".to_string();
    }
}

fn validate_domain_path(domain: &str, path: &str, v: &mut Validator) {
    v.must(valid_dns_name(domain), "domain", "domain invalid");
    v.must(path.starts_with('/'), "path", "path must start with /");
}

/// Create a route, the domain and path must not be taken.
///
/// `deployment` is the older form of `target: deployment://<name>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteCreate {
    pub project: String,
    pub location: String,
    pub domain: String,
    pub path: String,
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment: String,
    pub config: RouteConfig,
}

impl Validatable for RouteCreate {
    fn normalize(&mut self) {
        self.location = self.location.trim().to_string();
        normalize_domain_path(&mut self.domain, &mut self.path);
        self.target = self.target.trim().to_string();
        let deployment = self.deployment.trim();
        if self.target.is_empty() && !deployment.is_empty() {
            self.target = format!("{}{}", DEPLOYMENT_SCHEME, deployment);
        }
        self.deployment.clear();
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        validate_domain_path(&self.domain, &self.path, v);

        let target_ok = self
            .target
            .split_once("://")
            .is_some_and(|(scheme, rest)| !scheme.is_empty() && !rest.is_empty());
        v.must(target_ok, "target", "target invalid");
        if let Some(name) = self.target.strip_prefix(DEPLOYMENT_SCHEME) {
            v.name("target", name);
        }

        if let Some(basic) = &self.config.basic_auth {
            v.must(
                self.config.forward_auth.is_none(),
                "config",
                "basicAuth and forwardAuth cannot be used together",
            );
            v.required("user", &basic.user);
            v.required("password", &basic.password);
        }

        if let Some(forward) = &self.config.forward_auth {
            if v.must(
                !forward.target.is_empty(),
                "config.forwardAuth.target",
                "target required",
            ) {
                v.must(
                    valid_url(&forward.target),
                    "config.forwardAuth.target",
                    "target invalid",
                );
                v.must(
                    forward.target.starts_with("http://"),
                    "config.forwardAuth.target",
                    "target must start with http://",
                );
            }
        }
    }
}

/// Identifies one route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteRef {
    pub project: String,
    pub location: String,
    pub domain: String,
    pub path: String,
}

pub type RouteGet = RouteRef;
pub type RouteDelete = RouteRef;
pub type RouteList = ListScope;

impl Validatable for RouteRef {
    fn normalize(&mut self) {
        self.location = self.location.trim().to_string();
        normalize_domain_path(&mut self.domain, &mut self.path);
    }

    fn validate(&self, v: &mut Validator) {
        v.project(&self.project);
        v.required("location", &self.location);
        validate_domain_path(&self.domain, &self.path, v);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteItem {
    pub project: String,
    pub location: String,
    pub domain: String,
    pub path: String,
    pub target: String,
    /// Deployment name when the target is a deployment
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deployment: String,
    pub config: RouteConfig,
    #[serde(flatten)]
    pub state: ResourceState,
}

impl Table for RouteItem {
    fn table(&self) -> Vec<Vec<String>> {
        vec![
            vec![
                "DOMAIN".to_string(),
                "PATH".to_string(),
                "TARGET".to_string(),
                "LOCATION".to_string(),
            ],
            vec![
                self.domain.clone(),
                self.path.clone(),
                self.target.clone(),
                self.location.clone(),
            ],
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteListResult {
    pub items: Vec<RouteItem>,
}

impl Table for RouteListResult {
    fn table(&self) -> Vec<Vec<String>> {
        let mut table = vec![vec![
            "DOMAIN".to_string(),
            "PATH".to_string(),
            "DEPLOYMENT".to_string(),
            "LOCATION".to_string(),
        ]];
        for x in &self.items {
            table.push(vec![
                x.domain.clone(),
                x.path.clone(),
                x.deployment.clone(),
                x.location.clone(),
            ]);
        }
        table
    }
}
