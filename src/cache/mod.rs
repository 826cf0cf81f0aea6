//! Route cache subsystem.
//!
//! # Data Flow
//! ```text
//! Maintenance trigger (admin API, CLI, SIGHUP)
//!     → RouteCache::rebuild()
//!     → RouteDiscoverer::discover() (new RouteTable)
//!     → CacheStore::save() (persist snapshot, failure only warns)
//!     → atomic publish of Arc<RouteTable>
//!
//! Request path:
//!     → RouteCache::load() (lock-free read of the published table)
//!     → RouteTable::bucket(method, length)
//! ```
//!
//! # Design Decisions
//! - Readers never lock: the table lives in an `ArcSwapOption`
//! - One rebuild at a time, enforced by a mutex held for the whole rebuild
//! - A table is never mutated after it is published

pub mod store;

use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::observability::metrics;
use crate::routing::discovery::{DiscoveryReport, RouteDiscoverer};
use crate::routing::table::RouteTable;

pub use store::{store_from_config, CacheError, CacheStore, FileStore, MemoryStore};

/// Summary of one rebuild, returned to the admin surface.
#[derive(Debug)]
pub struct RebuildReport {
    pub routes: usize,
    pub buckets: usize,
    pub discovery: DiscoveryReport,
    /// False when the snapshot could not be written; the table is still live.
    pub persisted: bool,
    pub elapsed: Duration,
}

/// Owns the current route table and the means to rebuild it.
pub struct RouteCache {
    current: ArcSwapOption<RouteTable>,
    discoverer: RouteDiscoverer,
    store: Box<dyn CacheStore>,
    rebuild_lock: Mutex<()>,
}

impl RouteCache {
    pub fn new(discoverer: RouteDiscoverer, store: Box<dyn CacheStore>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            discoverer,
            store,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// The published table, if any, without touching the store.
    pub fn current(&self) -> Option<Arc<RouteTable>> {
        self.current.load_full()
    }

    /// The published table; rehydrates from the store or rebuilds on first use.
    pub fn load(&self) -> Arc<RouteTable> {
        if let Some(table) = self.current.load_full() {
            return table;
        }

        let _guard = self.rebuild_lock.lock().expect("rebuild mutex poisoned");

        // Another caller may have published while we waited.
        if let Some(table) = self.current.load_full() {
            return table;
        }

        match self.store.load() {
            Ok(Some(table)) => {
                tracing::info!(
                    store = self.store.name(),
                    routes = table.len(),
                    "Route table restored from cache"
                );
                return self.publish(table);
            }
            Ok(None) => {
                tracing::info!(store = self.store.name(), "No cached route table, running discovery");
            }
            Err(e) => {
                tracing::warn!(
                    store = self.store.name(),
                    error = %e,
                    "Cached route table unusable, running discovery"
                );
            }
        }

        self.rebuild_locked().0
    }

    /// Re-run discovery and replace the published table.
    pub fn rebuild(&self) -> RebuildReport {
        let _guard = self.rebuild_lock.lock().expect("rebuild mutex poisoned");
        self.rebuild_locked().1
    }

    fn rebuild_locked(&self) -> (Arc<RouteTable>, RebuildReport) {
        let start = Instant::now();
        let (table, discovery) = self.discoverer.discover();

        let persisted = match self.store.save(&table) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    store = self.store.name(),
                    error = %e,
                    "Failed to persist route table; serving it from memory"
                );
                false
            }
        };

        let report = RebuildReport {
            routes: table.len(),
            buckets: table.bucket_count(),
            discovery,
            persisted,
            elapsed: start.elapsed(),
        };
        metrics::record_rebuild(persisted);

        tracing::info!(
            routes = report.routes,
            buckets = report.buckets,
            rejected = report.discovery.rejected.len(),
            persisted,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Route table rebuilt"
        );

        (self.publish(table), report)
    }

    fn publish(&self, table: RouteTable) -> Arc<RouteTable> {
        let table = Arc::new(table);
        metrics::record_table_size(table.len());
        self.current.store(Some(table.clone()));
        table
    }
}

impl std::fmt::Debug for RouteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCache")
            .field("store", &self.store.name())
            .field("routes", &self.current().map(|t| t.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::declaration::{RouteDeclaration, RouteSource};
    use crate::routing::definition::HttpMethod;
    use crate::routing::sources::StaticRouteSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often discovery asks for routes.
    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl RouteSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn register_routes(&self) -> Vec<RouteDeclaration> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![RouteDeclaration::new("GET", "/?", "A", "list").with_params(["modelName"])]
        }
    }

    /// A store whose writes always fail.
    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn load(&self) -> Result<Option<RouteTable>, CacheError> {
            Ok(None)
        }

        fn save(&self, _table: &RouteTable) -> Result<(), CacheError> {
            Err(CacheError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_load_discovers_once() {
        let source = Arc::new(CountingSource::default());
        let discoverer = RouteDiscoverer::new("?").with_source(source.clone());
        let cache = RouteCache::new(discoverer, Box::new(MemoryStore::new()));

        assert!(cache.current().is_none());
        let first = cache.load();
        let second = cache.load();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_prefers_persisted_snapshot() {
        let store = MemoryStore::new();
        let seeded = RouteDiscoverer::new("?")
            .with_source(Arc::new(StaticRouteSource::new(
                "seed",
                vec![RouteDeclaration::new("DELETE", "/?/?", "A", "delete")],
            )))
            .discover()
            .0;
        store.save(&seeded).unwrap();

        let source = Arc::new(CountingSource::default());
        let cache = RouteCache::new(RouteDiscoverer::new("?").with_source(source.clone()), Box::new(store));

        let table = cache.load();
        assert_eq!(table.bucket(HttpMethod::Delete, 2).len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rebuild_replaces_table() {
        let source = Arc::new(CountingSource::default());
        let cache = RouteCache::new(
            RouteDiscoverer::new("?").with_source(source.clone()),
            Box::new(MemoryStore::new()),
        );

        let before = cache.load();
        let report = cache.rebuild();
        let after = cache.load();

        assert!(report.persisted);
        assert_eq!(report.routes, 1);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_write_failure_keeps_table_live() {
        let discoverer = RouteDiscoverer::new("?").with_source(Arc::new(CountingSource::default()));
        let cache = RouteCache::new(discoverer, Box::new(BrokenStore));

        let report = cache.rebuild();
        assert!(!report.persisted);
        assert_eq!(cache.load().bucket(HttpMethod::Get, 1).len(), 1);
    }
}
