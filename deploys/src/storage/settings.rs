//! Settings file management

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;
use crate::models::location::{Location, LocationFeatures};
use crate::validate::ValidationRules;

/// Control plane settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON logs on stdout
    #[serde(default)]
    pub log_json: bool,

    /// Also write daily rolling log files under the storage logs dir
    #[serde(default)]
    pub log_to_file: bool,

    #[serde(default)]
    pub server: ServerSettings,

    /// Known locations. Loaded once, never mutated at runtime
    #[serde(default = "default_locations")]
    pub locations: Vec<Location>,

    /// Allowed route target schemes
    #[serde(default = "default_route_target_prefixes")]
    pub route_target_prefixes: Vec<String>,

    #[serde(default)]
    pub validation: ValidationRules,

    #[serde(default)]
    pub limits: LimitSettings,

    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

fn default_true() -> bool {
    true
}

fn default_locations() -> Vec<Location> {
    vec![Location {
        id: "local".to_string(),
        domain_suffix: ".local.deploys.app".to_string(),
        endpoint: String::new(),
        cname: String::new(),
        features: LocationFeatures {
            workload_identity: true,
            disk: true,
        },
    }]
}

pub fn default_route_target_prefixes() -> Vec<String> {
    ["deployment://", "redirect://", "ipfs://", "ipns://", "dnslink://"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            log_to_file: false,
            server: ServerSettings::default(),
            locations: default_locations(),
            route_target_prefixes: default_route_target_prefixes(),
            validation: ValidationRules::default(),
            limits: LimitSettings::default(),
            snapshot: SnapshotSettings::default(),
        }
    }
}

/// API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Control plane limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Live deployments allowed per project
    #[serde(default = "default_max_deployments")]
    pub max_deployments_per_project: usize,
}

fn default_max_deployments() -> usize {
    50
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_deployments_per_project: default_max_deployments(),
        }
    }
}

/// Store snapshot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_snapshot_interval")]
    pub interval_secs: u64,
}

fn default_snapshot_interval() -> u64 {
    30
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_snapshot_interval(),
        }
    }
}
