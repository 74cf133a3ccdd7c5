//! Periodic store snapshots

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::filesys::file::File;
use crate::store::ResourceStore;
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Snapshot worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Time between snapshots
    pub interval: Duration,

    /// Backoff after a failed write
    pub cooldown: CooldownOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            cooldown: CooldownOptions {
                max_delay: Duration::from_secs(60),
                ..Default::default()
            },
        }
    }
}

/// Save the store whenever it changed since the last snapshot.
///
/// A final snapshot is written on shutdown.
pub async fn run<S, F>(
    options: &Options,
    store: Arc<ResourceStore>,
    file: File,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Snapshot worker starting, writing to {}", file.path().display());

    let mut saved_generation = store.generation();
    let mut failures: u32 = 0;

    loop {
        let delay = if failures == 0 {
            options.interval
        } else {
            calc_exp_backoff(&options.cooldown, failures - 1)
        };

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Snapshot worker shutting down...");
                if store.generation() != saved_generation {
                    if let Err(e) = store.save(&file).await {
                        error!("Final snapshot failed: {}", e);
                    }
                }
                return;
            }
            _ = sleep_fn(delay) => {}
        }

        if store.generation() == saved_generation {
            debug!("Store unchanged, skipping snapshot");
            continue;
        }

        match store.save(&file).await {
            Ok(generation) => {
                debug!("Snapshot saved at generation {}", generation);
                saved_generation = generation;
                failures = 0;
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                error!("Snapshot failed (attempt {}): {}", failures, e);
            }
        }
    }
}
