//! Validation constants

use serde::{Deserialize, Serialize};

/// Limits applied by request validation, loaded from settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub name_min_length: usize,
    pub name_max_length: usize,
    pub project_min_length: usize,
    pub project_max_length: usize,
    pub max_replicas: i64,
    pub disk_min_size: i64,
    pub disk_max_size: i64,
    /// Maximum size of one mount data entry, in bytes (exclusive)
    pub mount_data_max_item: usize,
    /// Maximum size of all mount data entries, in bytes (exclusive)
    pub mount_data_max_total: usize,
    pub max_sidecars: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            name_min_length: 3,
            name_max_length: 27,
            project_min_length: 6,
            project_max_length: 32,
            max_replicas: 20,
            disk_min_size: 1,
            disk_max_size: 20,
            mount_data_max_item: 10 * 1024,
            mount_data_max_total: 500 * 1024,
            max_sidecars: 2,
        }
    }
}
