//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::errors::ControlError;
use crate::filesys::file::File;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::services::ControlPlane;
use crate::storage::settings::Settings;
use crate::store::ResourceStore;
use crate::workers::snapshot;

/// Run the control plane until `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    settings: Settings,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ControlError> {
    info!("Initializing deploys control plane...");

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    if let Err(e) = init(&options, &settings, shutdown_tx.clone(), &mut shutdown_manager).await {
        error!("Failed to start control plane: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    // Shutdown
    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    settings: &Settings,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), ControlError> {
    let store = init_store(options).await?;
    let control = ControlPlane::from_settings(settings, store.clone());

    if options.enable_snapshots {
        init_snapshot_worker(options, store, shutdown_manager).await?;
    }

    init_socket_server(options, control, shutdown_manager, shutdown_tx.subscribe()).await?;

    Ok(())
}

async fn init_store(options: &AppOptions) -> Result<Arc<ResourceStore>, ControlError> {
    let store = Arc::new(ResourceStore::new());
    if !options.enable_snapshots {
        return Ok(store);
    }

    let file = options.storage.layout.snapshot_file();
    if !store.load(&file).await? {
        info!("No snapshot at {}, starting empty", file.path().display());
    }
    Ok(store)
}

async fn init_snapshot_worker(
    options: &AppOptions,
    store: Arc<ResourceStore>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), ControlError> {
    info!("Initializing snapshot worker...");

    let file = options.storage.layout.snapshot_file();
    let (handle, trigger) = spawn_snapshot_worker(options.snapshot.clone(), store, file);
    shutdown_manager.with_snapshot_worker_handle(handle, trigger)?;
    Ok(())
}

/// The worker stops on its own trigger, fired once the server has drained
fn spawn_snapshot_worker(
    snapshot_options: snapshot::Options,
    store: Arc<ResourceStore>,
    file: File,
) -> (JoinHandle<()>, oneshot::Sender<()>) {
    let (trigger, stop_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        snapshot::run(
            &snapshot_options,
            store,
            file,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = stop_rx.await;
            }),
        )
        .await;
    });
    (handle, trigger)
}

async fn init_socket_server(
    options: &AppOptions,
    control: ControlPlane,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), ControlError> {
    info!("Initializing HTTP server...");

    let server_state = ServerState::new(control);
    let server_handle = serve(&options.server, Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_socket_server_handle(server_handle)?;
    Ok(())
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    socket_server_handle: Option<JoinHandle<Result<(), ControlError>>>,
    snapshot_worker_handle: Option<JoinHandle<()>>,
    snapshot_trigger: Option<oneshot::Sender<()>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            shutdown_tx,
            lifecycle_options,
            socket_server_handle: None,
            snapshot_worker_handle: None,
            snapshot_trigger: None,
        }
    }

    pub fn with_snapshot_worker_handle(
        &mut self,
        handle: JoinHandle<()>,
        trigger: oneshot::Sender<()>,
    ) -> Result<(), ControlError> {
        if self.snapshot_worker_handle.is_some() {
            return Err(ControlError::Shutdown("snapshot_handle already set".to_string()));
        }
        self.snapshot_worker_handle = Some(handle);
        self.snapshot_trigger = Some(trigger);
        Ok(())
    }

    pub fn with_socket_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), ControlError>>,
    ) -> Result<(), ControlError> {
        if self.socket_server_handle.is_some() {
            return Err(ControlError::Shutdown("server_handle already set".to_string()));
        }
        self.socket_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), ControlError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), ControlError> {
        info!("Shutting down deploys control plane...");

        // 1. Stop taking requests
        if let Some(handle) = self.socket_server_handle.take() {
            handle.await.map_err(|e| ControlError::Shutdown(e.to_string()))??;
        }

        // 2. Snapshot worker, writes a final snapshot once no request can land
        if let Some(trigger) = self.snapshot_trigger.take() {
            let _ = trigger.send(());
        }
        if let Some(handle) = self.snapshot_worker_handle.take() {
            handle.await.map_err(|e| ControlError::Shutdown(e.to_string()))?;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
