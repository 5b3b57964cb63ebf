//! Filesystem-backed object store
//!
//! Containers are sub-directories of a root; object names are
//! slash-separated paths relative to the container directory. Creation
//! times come from filesystem metadata, falling back to the modified time
//! on filesystems that don't record creation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use walkdir::WalkDir;

use crate::{ObjectMeta, ObjectStore, Result, StorageError};

/// Object store rooted at a local directory
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_path(&self, container: &str) -> PathBuf {
        self.root.join(container)
    }
}

#[async_trait]
impl ObjectStore for DirStore {
    async fn list_objects(&self, container: &str) -> Result<Vec<ObjectMeta>> {
        let dir = self.container_path(container);
        if !dir.is_dir() {
            return Err(StorageError::ContainerNotFound(container.to_string()));
        }

        let mut objects = Vec::new();
        for entry in WalkDir::new(&dir).follow_links(false) {
            let entry = entry.map_err(|e| StorageError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&dir) else {
                continue;
            };
            let name = slash_name(rel);
            let created = entry
                .metadata()
                .ok()
                .and_then(|m| m.created().or_else(|_| m.modified()).ok())
                .map(DateTime::<Utc>::from);
            objects.push(ObjectMeta { name, created });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(container, objects = objects.len(), "listed container");
        Ok(objects)
    }

    async fn delete_object(&self, container: &str, name: &str) -> Result<()> {
        let path = self.container_path(container).join(name);
        if !path.is_file() {
            return Err(StorageError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        std::fs::remove_file(&path)?;
        debug!(container, name, "deleted object");
        Ok(())
    }
}

/// Normalize a relative path to a slash-separated object name
fn slash_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_container(root: &Path, container: &str, names: &[&str]) {
        for name in names {
            let path = root.join(container).join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, b"backup payload").unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_with_timestamps() {
        let tmp = TempDir::new().unwrap();
        seed_container(tmp.path(), "orders", &["b.bak", "a.bak", "nested/c.bak"]);

        let store = DirStore::new(tmp.path());
        let objects = store.list_objects("orders").await.unwrap();

        let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["a.bak", "b.bak", "nested/c.bak"]);
        assert!(objects.iter().all(|o| o.created.is_some()));
    }

    #[tokio::test]
    async fn test_missing_container_errors() {
        let tmp = TempDir::new().unwrap();
        let store = DirStore::new(tmp.path());

        match store.list_objects("nope").await {
            Err(StorageError::ContainerNotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("expected ContainerNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let tmp = TempDir::new().unwrap();
        seed_container(tmp.path(), "orders", &["a.bak", "b.bak"]);

        let store = DirStore::new(tmp.path());
        store.delete_object("orders", "a.bak").await.unwrap();

        assert!(!tmp.path().join("orders/a.bak").exists());
        assert!(tmp.path().join("orders/b.bak").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_object_errors() {
        let tmp = TempDir::new().unwrap();
        seed_container(tmp.path(), "orders", &["a.bak"]);

        let store = DirStore::new(tmp.path());
        assert!(matches!(
            store.delete_object("orders", "ghost.bak").await,
            Err(StorageError::ObjectNotFound { .. })
        ));
    }
}
