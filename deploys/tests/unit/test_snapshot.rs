//! Snapshot persistence tests

use std::sync::Arc;
use std::time::Duration;

use deploys::filesys::file::File;
use deploys::services::ControlPlane;
use deploys::storage::settings::Settings;
use deploys::store::ResourceStore;
use deploys::workers::snapshot;
use deploys_protocol::{CommandResult, Status};
use tokio::sync::oneshot;

use crate::common::*;

#[tokio::test]
async fn test_restored_store_keeps_outstanding_commands() {
    let dir = tempfile::tempdir().unwrap();
    let file = File::new(dir.path().join("snapshot.json"));

    let cp = control_plane();
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    let before = commands(&cp, LOCATION);
    cp.store.save(&file).await.unwrap();

    let store = Arc::new(ResourceStore::new());
    assert!(store.load(&file).await.unwrap());
    let restored = ControlPlane::from_settings(&Settings::default(), store);

    let after = commands(&restored, LOCATION);
    assert_eq!(after, before);

    report(&restored, LOCATION, vec![CommandResult::success(&after[0])]);
    let revisions = restored.deployment_revisions(target("web")).unwrap();
    assert_eq!(revisions.items[0].status, Status::Success);
}

#[tokio::test]
async fn test_load_missing_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let file = File::new(dir.path().join("missing.json"));

    let store = ResourceStore::new();
    assert!(!store.load(&file).await.unwrap());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_worker_writes_final_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("snapshot.json");

    let cp = control_plane();
    let (tx, rx) = oneshot::channel::<()>();
    let options = snapshot::Options {
        interval: Duration::from_secs(3600),
        ..Default::default()
    };
    let store = cp.store.clone();
    let file = File::new(path.clone());
    let worker = tokio::spawn(async move {
        snapshot::run(
            &options,
            store,
            file,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = rx.await;
            }),
        )
        .await;
    });

    // Let the worker record the starting generation first
    tokio::time::sleep(Duration::from_millis(20)).await;
    cp.deployment_deploy(ACTOR, web_deploy("web", "nginx:1.27")).unwrap();
    tx.send(()).unwrap();
    worker.await.unwrap();

    let store = ResourceStore::new();
    assert!(store.load(&File::new(path)).await.unwrap());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_worker_skips_unchanged_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let cp = control_plane();
    let (tx, rx) = oneshot::channel::<()>();
    let options = snapshot::Options {
        interval: Duration::from_millis(10),
        ..Default::default()
    };
    let store = cp.store.clone();
    let file = File::new(path.clone());
    let worker = tokio::spawn(async move {
        snapshot::run(
            &options,
            store,
            file,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = rx.await;
            }),
        )
        .await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();
    worker.await.unwrap();

    assert!(!path.exists());
}
