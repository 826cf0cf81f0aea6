//! Route table persistence and concurrent access.

mod common;

use std::fs;
use std::sync::Arc;
use std::thread;

use api_router::cache::{CacheStore, FileStore, MemoryStore};
use api_router::routing::{RouteDeclaration, Router};
use common::{cache_with, temp_snapshot_path};

fn crud_routes() -> Vec<RouteDeclaration> {
    vec![
        RouteDeclaration::new("GET", "/?", "CrudController", "list").with_params(["modelName"]),
        RouteDeclaration::new("GET", "/?/?", "CrudController", "retrieve").with_params(["modelName", "id"]),
        RouteDeclaration::new("GET", "/?/?/link/?", "CrudController", "listRelated")
            .with_params(["modelName", "id", "", "relationship"]),
    ]
}

#[test]
fn test_snapshot_survives_restart() {
    let path = temp_snapshot_path();

    let first = cache_with(vec![("crud", crud_routes())], Box::new(FileStore::new(&path)));
    let report = first.rebuild();
    assert!(report.persisted);
    assert!(path.exists());

    // A fresh process with no sources still serves the persisted table.
    let second = cache_with(vec![], Box::new(FileStore::new(&path)));
    let router = Router::new(second);
    let resolved = router.route("GET", "/Users/7/link/roles").unwrap();
    assert_eq!(resolved.handler.method, "listRelated");
    assert_eq!(resolved.parameters["relationship"], "roles");
    assert!(!resolved.parameters.contains_key(""));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_corrupt_snapshot_triggers_discovery() {
    let path = temp_snapshot_path();
    fs::write(&path, "{ not a route table").unwrap();

    let cache = cache_with(vec![("crud", crud_routes())], Box::new(FileStore::new(&path)));
    let table = cache.load();
    assert_eq!(table.len(), 3);

    // Discovery rewrote the snapshot with a readable table.
    let restored = FileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(restored.len(), 3);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_unwritable_snapshot_keeps_table_in_memory() {
    let dir = std::env::temp_dir().join(format!("api-router-test-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();

    // The snapshot path is a directory, so the final rename fails.
    let cache = cache_with(vec![("crud", crud_routes())], Box::new(FileStore::new(&dir)));
    let report = cache.rebuild();
    assert!(!report.persisted);
    assert_eq!(report.routes, 3);

    let router = Router::new(cache);
    assert!(router.route("GET", "/Users").is_ok());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_readers_never_see_a_partial_table() {
    let cache = cache_with(vec![("crud", crud_routes())], Box::new(MemoryStore::new()));
    let router = Arc::new(Router::new(cache.clone()));
    cache.load();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let router = router.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let path = format!("/Users/{i}");
                    let resolved = router.route("GET", &path).unwrap();
                    assert_eq!(resolved.parameters["id"], i.to_string());
                }
            })
        })
        .collect();

    let rebuilder = {
        let cache = cache.clone();
        thread::spawn(move || {
            for _ in 0..20 {
                assert_eq!(cache.rebuild().routes, 3);
            }
        })
    };

    for reader in readers {
        reader.join().unwrap();
    }
    rebuilder.join().unwrap();
}
