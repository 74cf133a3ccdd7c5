//! Deployment spec models

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of workload a deployment runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentType {
    #[default]
    WebService,
    Worker,
    CronJob,
    #[serde(rename = "TCPService")]
    TcpService,
    #[serde(rename = "InternalTCPService")]
    InternalTcpService,
}

impl DeploymentType {
    pub const ALL: [DeploymentType; 5] = [
        DeploymentType::WebService,
        DeploymentType::Worker,
        DeploymentType::CronJob,
        DeploymentType::TcpService,
        DeploymentType::InternalTcpService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::WebService => "WebService",
            DeploymentType::Worker => "Worker",
            DeploymentType::CronJob => "CronJob",
            DeploymentType::TcpService => "TCPService",
            DeploymentType::InternalTcpService => "InternalTCPService",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            DeploymentType::WebService => "Web Service",
            DeploymentType::Worker => "Worker",
            DeploymentType::CronJob => "CronJob",
            DeploymentType::TcpService => "TCP Service",
            DeploymentType::InternalTcpService => "Internal TCP Service",
        }
    }

    /// Types that expose a port
    pub fn requires_port(&self) -> bool {
        matches!(
            self,
            DeploymentType::WebService
                | DeploymentType::TcpService
                | DeploymentType::InternalTcpService
        )
    }

    /// Only web services may override the serving protocol
    pub fn allows_protocol(&self) -> bool {
        matches!(self, DeploymentType::WebService)
    }

    pub fn requires_schedule(&self) -> bool {
        matches!(self, DeploymentType::CronJob)
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeploymentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid deployment type: {}", s))
    }
}

/// Serving protocol of a web service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProtocol {
    Http,
    Https,
    H2c,
}

impl FromStr for DeploymentProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(DeploymentProtocol::Http),
            "https" => Ok(DeploymentProtocol::Https),
            "h2c" => Ok(DeploymentProtocol::H2c),
            _ => Err(format!("invalid protocol: {}", s)),
        }
    }
}

/// Disk mounted into a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentDisk {
    pub name: String,
    pub mount_path: String,
    pub sub_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceItem {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentResources {
    pub requests: ResourceItem,
    pub limits: ResourceItem,
}

/// Helper container running next to the workload.
///
/// Exactly one variant is encoded per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sidecar {
    CloudSqlProxy(CloudSqlProxySidecar),
}

impl Sidecar {
    /// Resolve the container config the agent runs
    pub fn config(&self) -> SidecarConfig {
        match self {
            Sidecar::CloudSqlProxy(s) => s.config(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSqlProxySidecar {
    pub instance: String,
    pub port: Option<u16>,
    pub credentials: String,
}

impl CloudSqlProxySidecar {
    pub const DEFAULT_PORT: u16 = 3300;
    pub const IMAGE: &'static str = "gcr.io/cloud-sql-connectors/cloud-sql-proxy:2.7.0";
    const CREDENTIALS_PATH: &'static str = "/sidecar/cloudsqlproxy/credentials.json";

    fn config(&self) -> SidecarConfig {
        let port = self.port.filter(|p| *p > 0).unwrap_or(Self::DEFAULT_PORT);

        let mut args = vec![
            self.instance.clone(),
            format!("-p={}", port),
            "--max-sigterm-delay=30".to_string(),
        ];
        let mut mount_data = BTreeMap::new();
        if !self.credentials.is_empty() {
            args.push(format!("--credentials-file={}", Self::CREDENTIALS_PATH));
            mount_data.insert(Self::CREDENTIALS_PATH.to_string(), self.credentials.clone());
        }

        SidecarConfig {
            name: "cloudsql-proxy".to_string(),
            image: Self::IMAGE.to_string(),
            env: BTreeMap::new(),
            command: Vec::new(),
            args,
            port: Some(port),
            mount_data,
        }
    }
}

/// Fully resolved sidecar container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarConfig {
    pub name: String,
    pub image: String,
    pub env: BTreeMap<String, String>,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub port: Option<u16>,
    pub mount_data: BTreeMap<String, String>,
}

/// Immutable snapshot of a deployment revision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSpec {
    #[serde(rename = "type")]
    pub deployment_type: DeploymentType,
    pub image: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub port: Option<u16>,
    pub protocol: Option<DeploymentProtocol>,
    pub env: BTreeMap<String, String>,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub workload_identity: Option<String>,
    pub pull_secret: Option<String>,
    pub disk: Option<DeploymentDisk>,
    pub schedule: Option<String>,
    pub resources: DeploymentResources,
    pub annotations: BTreeMap<String, String>,
    pub mount_data: BTreeMap<String, String>,
    pub sidecars: Vec<Sidecar>,
}

impl DeploymentSpec {
    pub fn is_autoscaling(&self) -> bool {
        self.min_replicas != self.max_replicas
    }
}
