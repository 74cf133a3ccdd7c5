//! Application configuration options

use std::time::Duration;

use crate::logs::LogOptions;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::workers::snapshot;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Storage configuration
    pub storage: StorageOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Persist the resource store between runs
    pub enable_snapshots: bool,

    /// Snapshot worker options
    pub snapshot: snapshot::Options,

    /// Logging
    pub logs: LogOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            storage: StorageOptions::default(),
            server: ServerOptions::default(),
            enable_snapshots: true,
            snapshot: snapshot::Options::default(),
            logs: LogOptions::default(),
        }
    }
}

impl AppOptions {
    /// Map the settings file onto runtime options
    pub fn from_settings(settings: &Settings, layout: StorageLayout) -> Self {
        let logs = LogOptions {
            log_level: settings.log_level.clone(),
            stdout: true,
            log_dir: settings.log_to_file.then(|| layout.logs_dir()),
            json_format: settings.log_json,
        };

        Self {
            lifecycle: LifecycleOptions::default(),
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            enable_snapshots: settings.snapshot.enabled,
            snapshot: snapshot::Options {
                interval: Duration::from_secs(settings.snapshot.interval_secs.max(1)),
                ..Default::default()
            },
            storage: StorageOptions { layout },
            logs,
        }
    }
}

/// Lifecycle options for the control plane
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Storage configuration options
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    /// Storage layout paths
    pub layout: StorageLayout,
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}
