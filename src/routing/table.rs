//! Bucketed route table.
//!
//! # Responsibilities
//! - Group definitions by `(method, path length)`
//! - O(1) bucket lookup on the request path
//! - Convert to and from the persisted snapshot form
//!
//! # Design Decisions
//! - Buckets keep declaration order (ascending ordinal)
//! - The table is never mutated after construction; a rebuild makes a new one
//! - Snapshots are re-checked on load, a misfiled route makes the whole
//!   snapshot unusable

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::routing::definition::{DefinitionError, HttpMethod, RouteDefinition};

/// Version written into every snapshot; older or newer versions are rejected.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Identifies one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub method: HttpMethod,
    pub length: usize,
}

impl BucketKey {
    pub fn new(method: HttpMethod, length: usize) -> Self {
        Self { method, length }
    }

    pub fn of(definition: &RouteDefinition) -> Self {
        Self::new(definition.method(), definition.path_length())
    }
}

/// Immutable route table, shared behind an `Arc` by every request.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    buckets: HashMap<BucketKey, Vec<RouteDefinition>>,
    route_count: usize,
    built_at: u64,
}

impl RouteTable {
    /// Build a table stamped with the current time.
    pub fn from_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        let built_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self::assemble(definitions, built_at)
    }

    fn assemble<I>(definitions: I, built_at: u64) -> Self
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        let mut buckets: HashMap<BucketKey, Vec<RouteDefinition>> = HashMap::new();
        let mut route_count = 0;

        for definition in definitions {
            route_count += 1;
            buckets
                .entry(BucketKey::of(&definition))
                .or_default()
                .push(definition);
        }

        for bucket in buckets.values_mut() {
            bucket.sort_by_key(RouteDefinition::ordinal);
        }

        Self {
            buckets,
            route_count,
            built_at,
        }
    }

    /// Candidates for a request; empty when nothing was declared there.
    pub fn bucket(&self, method: HttpMethod, length: usize) -> &[RouteDefinition] {
        self.buckets
            .get(&BucketKey::new(method, length))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.route_count
    }

    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Unix timestamp (seconds) of the discovery run that produced this table.
    pub fn built_at(&self) -> u64 {
        self.built_at
    }

    /// Buckets ordered by method, then length.
    pub fn buckets(&self) -> Vec<(BucketKey, &[RouteDefinition])> {
        let mut all: Vec<_> = self
            .buckets
            .iter()
            .map(|(key, routes)| (*key, routes.as_slice()))
            .collect();
        all.sort_by_key(|(key, _)| *key);
        all
    }

    pub fn to_snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            built_at: self.built_at,
            route_count: self.route_count,
            buckets: self
                .buckets()
                .into_iter()
                .map(|(key, routes)| BucketSnapshot {
                    method: key.method,
                    length: key.length,
                    routes: routes.to_vec(),
                })
                .collect(),
        }
    }

    /// Rehydrate a persisted snapshot, re-checking every route.
    pub fn from_snapshot(snapshot: TableSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.format_version));
        }

        let mut definitions = Vec::with_capacity(snapshot.route_count);
        for bucket in snapshot.buckets {
            let key = BucketKey::new(bucket.method, bucket.length);
            for route in bucket.routes {
                if BucketKey::of(&route) != key {
                    return Err(SnapshotError::Misfiled {
                        route: route.to_string(),
                        method: key.method,
                        length: key.length,
                    });
                }
                route.check().map_err(|source| SnapshotError::Invalid {
                    route: route.to_string(),
                    source,
                })?;
                definitions.push(route);
            }
        }

        if definitions.len() != snapshot.route_count {
            return Err(SnapshotError::CountMismatch {
                expected: snapshot.route_count,
                found: definitions.len(),
            });
        }

        Ok(Self::assemble(definitions, snapshot.built_at))
    }
}

/// Persisted form of a [`RouteTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub format_version: u32,
    pub built_at: u64,
    pub route_count: usize,
    pub buckets: Vec<BucketSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSnapshot {
    pub method: HttpMethod,
    pub length: usize,
    pub routes: Vec<RouteDefinition>,
}

/// A snapshot that cannot be trusted.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),

    #[error("route '{route}' filed under bucket {method} length {length}")]
    Misfiled {
        route: String,
        method: HttpMethod,
        length: usize,
    },

    #[error("route '{route}' is invalid: {source}")]
    Invalid {
        route: String,
        #[source]
        source: DefinitionError,
    },

    #[error("snapshot declares {expected} routes but holds {found}")]
    CountMismatch { expected: usize, found: usize },
}
