//! In-memory resource store
//!
//! Every record lives behind one `RwLock`. Mutations run inside
//! [`ResourceStore::update`], so a check and the write it guards can never
//! interleave with another request or result.

pub mod record;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ControlError;
use crate::filesys::file::File;
use record::{DeploymentRecord, Resource, ResourceKey, ResourceType};

const SNAPSHOT_VERSION: u32 = 1;

/// Records plus the id index, only reachable through the store lock
#[derive(Debug, Default)]
pub struct StoreInner {
    resources: BTreeMap<ResourceKey, Resource>,
    ids: HashMap<Uuid, ResourceKey>,
}

impl StoreInner {
    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        self.resources.get(key)
    }

    pub fn get_mut(&mut self, key: &ResourceKey) -> Option<&mut Resource> {
        self.resources.get_mut(key)
    }

    pub fn key_of(&self, id: &Uuid) -> Option<&ResourceKey> {
        self.ids.get(id)
    }

    pub fn by_id_mut(&mut self, id: &Uuid) -> Option<&mut Resource> {
        let key = self.ids.get(id)?;
        self.resources.get_mut(key)
    }

    pub fn deployment(&self, key: &ResourceKey) -> Option<&DeploymentRecord> {
        match self.resources.get(key) {
            Some(Resource::Deployment(d)) => Some(d),
            _ => None,
        }
    }

    pub fn deployment_mut(&mut self, key: &ResourceKey) -> Option<&mut DeploymentRecord> {
        match self.resources.get_mut(key) {
            Some(Resource::Deployment(d)) => Some(d),
            _ => None,
        }
    }

    /// Insert or replace the record stored under its key
    pub fn insert(&mut self, resource: Resource) {
        let key = resource.key();
        if let Some(old) = self.resources.get(&key) {
            self.ids.remove(&old.meta().id);
        }
        self.ids.insert(resource.meta().id, key.clone());
        self.resources.insert(key, resource);
    }

    pub fn remove(&mut self, key: &ResourceKey) -> Option<Resource> {
        let resource = self.resources.remove(key)?;
        self.ids.remove(&resource.meta().id);
        Some(resource)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Records of one type in a project, optionally narrowed to a location
    pub fn scan<'a>(
        &'a self,
        resource_type: ResourceType,
        project: &'a str,
        location: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        let start = ResourceKey::new(resource_type, project, location.unwrap_or(""), "");
        self.resources
            .range(start..)
            .take_while(move |(k, _)| {
                k.resource_type == resource_type
                    && k.project == project
                    && location.is_none_or(|l| k.location == l)
            })
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Serialized form of the whole store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Default)]
pub struct ResourceStore {
    inner: RwLock<StoreInner>,
    generation: AtomicU64,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&StoreInner) -> R) -> R {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&inner)
    }

    /// Run `f` under the write lock; the whole closure is one atomic step
    pub fn update<R>(&self, f: impl FnOnce(&mut StoreInner) -> R) -> R {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        out
    }

    /// Bumped by every update; used to skip unchanged snapshots
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.read(|s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|s| s.is_empty())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            resources: self.read(|s| s.iter().cloned().collect()),
        }
    }

    /// Replace the store content with a snapshot
    pub fn restore(&self, snapshot: StoreSnapshot) -> Result<(), ControlError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ControlError::Config(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        self.update(|s| {
            *s = StoreInner::default();
            for resource in snapshot.resources {
                s.insert(resource);
            }
        });
        Ok(())
    }

    /// Write the store to `file`, returning the generation that was saved
    pub async fn save(&self, file: &File) -> Result<u64, ControlError> {
        let generation = self.generation();
        let snapshot = self.snapshot();
        file.write_json(&snapshot).await?;
        Ok(generation)
    }

    /// Load a snapshot from `file` if it exists
    pub async fn load(&self, file: &File) -> Result<bool, ControlError> {
        if !file.exists().await {
            return Ok(false);
        }
        let snapshot: StoreSnapshot = file.read_json().await?;
        let count = snapshot.resources.len();
        self.restore(snapshot)?;
        info!("Restored {} resources from {}", count, file.path().display());
        Ok(true)
    }
}
