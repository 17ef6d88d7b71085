//! Integration tests for Prodboard
//!
//! These tests drive `prodboard-store` through its public API against
//! file-backed SQLite databases:
//! - user/workspace pairing
//! - item ID assignment under concurrent writers
//! - bounded retries when the write lock is contended
//! - persistence across reopen

use std::collections::BTreeSet;
use std::sync::Arc;

use prodboard_store::{
    Error, ErrorKind, ItemCreate, StoreConfig, WorkspaceRepository, WorkspaceStore,
};
use tempfile::TempDir;

async fn file_store(dir: &TempDir) -> WorkspaceStore {
    let config = StoreConfig {
        max_connections: 8,
        ..StoreConfig::default()
    };
    WorkspaceStore::from_path(&dir.path().join("prodboard.db"), &config)
        .await
        .unwrap()
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let ws = store
        .create_user_with_workspace("ada", "hash")
        .await
        .unwrap()
        .workspace_id();

    let handles: Vec<_> = (0..10)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create_item(ws, &ItemCreate::text(format!("note {n}")))
                    .await
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(ids, (1..=10).collect::<BTreeSet<u32>>());

    let loaded = store.load_workspace(ws).await.unwrap();
    assert_eq!(loaded.items.len(), 10);
    assert!(loaded.items.iter().all(|i| i.populated_variants() == 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_todo_lists_number_fields_independently() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let ws = store
        .create_user_with_workspace("ada", "hash")
        .await
        .unwrap()
        .workspace_id();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = store.clone();
            let request = ItemCreate::todo_list([("a", false), ("b", true), ("c", false)]);
            tokio::spawn(async move { store.create_item(ws, &request).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let loaded = store.load_workspace(ws).await.unwrap();
    assert_eq!(loaded.items.len(), 5);
    for item in &loaded.items {
        let fields = item.todo_list.as_ref().unwrap();
        let texts: Vec<_> = fields.iter().map(|f| f.text.content.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_users_each_get_a_workspace() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .create_user_with_workspace(&format!("user{n}"), "hash")
                    .await
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        let user = handle.await.unwrap().unwrap();
        assert!(store.workspace_exists(user.id).await.unwrap());
        ids.insert(user.id);
    }
    assert_eq!(ids.len(), 8);
    assert_eq!(store.user_count().await.unwrap(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exhausted_retries_surface_as_storage() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig {
        max_connections: 8,
        busy_timeout_ms: 0,
        max_sequence_retries: 2,
    };
    let store = WorkspaceStore::from_path(&dir.path().join("prodboard.db"), &config)
        .await
        .unwrap();
    let ws = store
        .create_user_with_workspace("ada", "hash")
        .await
        .unwrap()
        .workspace_id();

    let handles: Vec<_> = (0..40)
        .map(|n| {
            let store = store.clone();
            let request = ItemCreate::todo_list((0..20).map(|f| (format!("{n}.{f}"), false)));
            tokio::spawn(async move { store.create_item(ws, &request).await })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(id) => assert!(ids.insert(id), "id {id} assigned twice"),
            Err(err) => {
                assert!(!matches!(err, Error::SequenceConflict { .. }), "{err}");
                assert_eq!(err.kind(), ErrorKind::Storage, "{err}");
            }
        }
    }

    let loaded = store.load_workspace(ws).await.unwrap();
    assert_eq!(loaded.items.len(), ids.len());
    for item in &loaded.items {
        assert_eq!(item.todo_list.as_ref().unwrap().len(), 20);
    }
}

// ============================================================================
// Pairing and persistence
// ============================================================================

#[tokio::test]
async fn test_duplicate_login_keeps_first_user() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;

    let first = store.create_user_with_workspace("ada", "h1").await.unwrap();
    let err = store
        .create_user_with_workspace("ada", "h2")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateLogin);
    assert_eq!(err.kind().status_code(), 409);

    let users = store.list_users(1, 10).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, first.id);
    assert_eq!(users[0].password_hash, "h1");
}

#[tokio::test]
async fn test_workspace_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let ws = {
        let store = file_store(&dir).await;
        let ws = store
            .create_user_with_workspace("ada", "hash")
            .await
            .unwrap()
            .workspace_id();
        store.create_item(ws, &ItemCreate::text("Hello")).await.unwrap();
        store
            .create_item(ws, &ItemCreate::drawing([(0.0, 0.0), (5.0, 5.0)]))
            .await
            .unwrap();
        store.close().await;
        ws
    };

    let store = file_store(&dir).await;
    let loaded = store.load_workspace(ws).await.unwrap();
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.items[0].text.as_ref().unwrap().content, "Hello");
    assert_eq!(loaded.items[1].drawing.as_ref().unwrap().points.len(), 2);

    let next = store.create_item(ws, &ItemCreate::shape("circle")).await.unwrap();
    assert_eq!(next, 3);
}

#[tokio::test]
async fn test_projection_json_shape() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn WorkspaceRepository> = Arc::new(file_store(&dir).await);
    let ws = store
        .create_user_with_workspace("ada", "hash")
        .await
        .unwrap()
        .workspace_id();

    let request: ItemCreate = serde_json::from_str(
        r#"{"position_x": 1, "position_y": 2, "todo_list": [{"content": "milk", "done": true}]}"#,
    )
    .unwrap();
    store.create_item(ws, &request).await.unwrap();

    let json = serde_json::to_value(store.load_workspace(ws).await.unwrap()).unwrap();
    let item = &json["items"][0];
    assert_eq!(item["id"], 1);
    assert_eq!(item["workspace_id"], ws);
    assert_eq!(item["color"], "#FFFFFF");
    assert_eq!(item["todo_list"][0]["text"]["content"], "milk");
    assert_eq!(item["todo_list"][0]["done"], true);
    assert!(item.get("text").is_none());
    assert!(item.get("drawing").is_none());
}

#[tokio::test]
async fn test_user_json_hides_credential_hash() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let user = store.create_user_with_workspace("ada", "hash").await.unwrap();

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["login"], "ada");
    assert!(json.get("password_hash").is_none());
}
