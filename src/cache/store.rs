//! Snapshot persistence backends.
//!
//! # Responsibilities
//! - Persist a `RouteTable` snapshot
//! - Return the last persisted snapshot, or nothing
//!
//! # Design Decisions
//! - Backends are synchronous; callers on an async runtime use `spawn_blocking`
//! - The file backend writes a sibling temp file and renames it into place,
//!   so a reader never sees a half-written snapshot

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::config::schema::{CacheBackend, CacheConfig};
use crate::routing::table::{RouteTable, SnapshotError, TableSnapshot};

/// Errors raised while reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("corrupt route snapshot: {0}")]
    Corrupt(#[from] SnapshotError),
}

/// A place the route table can be persisted to and rehydrated from.
pub trait CacheStore: Send + Sync {
    /// Last persisted table, `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<RouteTable>, CacheError>;

    /// Replace the persisted table.
    fn save(&self, table: &RouteTable) -> Result<(), CacheError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the store selected in configuration.
pub fn store_from_config(config: &CacheConfig) -> Box<dyn CacheStore> {
    match config.backend {
        CacheBackend::Memory => Box::new(MemoryStore::new()),
        CacheBackend::File => Box::new(FileStore::new(&config.path)),
    }
}

/// Process-local store. Survives rebuild failures, not restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<TableSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<Option<RouteTable>, CacheError> {
        let snapshot = self
            .snapshot
            .lock()
            .expect("memory store mutex poisoned")
            .clone();
        Ok(snapshot.map(RouteTable::from_snapshot).transpose()?)
    }

    fn save(&self, table: &RouteTable) -> Result<(), CacheError> {
        *self.snapshot.lock().expect("memory store mutex poisoned") = Some(table.to_snapshot());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// JSON snapshot on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), CacheError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<Option<RouteTable>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let snapshot: TableSnapshot = serde_json::from_reader(reader)?;
        let table = RouteTable::from_snapshot(snapshot)?;

        tracing::info!(
            path = %self.path.display(),
            routes = table.len(),
            "Loaded route table snapshot"
        );
        Ok(Some(table))
    }

    fn save(&self, table: &RouteTable) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        if let Err(e) = self.write_json(&temp, &table.to_snapshot()) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::info!(
            path = %self.path.display(),
            routes = table.len(),
            "Saved route table snapshot"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::definition::{HandlerId, HttpMethod, RouteDefinition, Segment};

    fn sample_table() -> RouteTable {
        RouteTable::from_definitions(vec![RouteDefinition::new(
            HttpMethod::Get,
            vec![Segment::Literal("Users".into()), Segment::Wildcard],
            vec![String::new(), "id".into()],
            HandlerId::new("UsersController", "read"),
            0,
            "Users",
        )
        .unwrap()])
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&sample_table()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_file_store_persistence() {
        let path = temp_file("route-cache");
        let store = FileStore::new(&path);
        assert!(store.load().unwrap().is_none());

        store.save(&sample_table()).unwrap();
        assert!(!store.temp_path().exists());

        // Fresh instance reads what the first wrote.
        let loaded = FileStore::new(&path).load().unwrap().unwrap();
        let bucket = loaded.bucket(HttpMethod::Get, 2);
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].handler().method, "read");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_file_store_garbage() {
        let path = temp_file("route-cache-garbage");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CacheError::Serialize(_)));

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
