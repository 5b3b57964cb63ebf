//! In-memory object store for tests
//!
//! Deterministic listings plus per-object delete failure injection, so
//! callers can exercise the continue-on-failure contract without a real
//! backend.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{ObjectMeta, ObjectStore, Result, StorageError};

type Container = BTreeMap<String, Option<DateTime<Utc>>>;

/// Object store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    containers: BTreeMap<String, Container>,
    failing: HashSet<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, creating its container on first use
    pub fn put(&self, container: &str, name: &str, created: Option<DateTime<Utc>>) {
        self.inner
            .lock()
            .containers
            .entry(container.to_string())
            .or_default()
            .insert(name.to_string(), created);
    }

    /// Make every future delete of this object fail
    pub fn fail_delete(&self, container: &str, name: &str) {
        self.inner
            .lock()
            .failing
            .insert((container.to_string(), name.to_string()));
    }

    /// Current object names in a container, sorted
    pub fn names(&self, container: &str) -> Vec<String> {
        self.inner
            .lock()
            .containers
            .get(container)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, container: &str, name: &str) -> bool {
        self.inner
            .lock()
            .containers
            .get(container)
            .is_some_and(|c| c.contains_key(name))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, container: &str) -> Result<Vec<ObjectMeta>> {
        let inner = self.inner.lock();
        let objects = inner
            .containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;

        Ok(objects
            .iter()
            .map(|(name, created)| ObjectMeta {
                name: name.clone(),
                created: *created,
            })
            .collect())
    }

    async fn delete_object(&self, container: &str, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner
            .failing
            .contains(&(container.to_string(), name.to_string()))
        {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected delete failure",
            )));
        }

        let objects = inner
            .containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        if objects.remove(name).is_none() {
            return Err(StorageError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
