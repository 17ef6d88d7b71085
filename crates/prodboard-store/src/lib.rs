//! Prodboard Store: persistence for users, workspaces and board items
//!
//! Every user owns exactly one workspace that shares the user's ID. A
//! workspace holds items identified by a workspace-scoped sequential ID;
//! each item is exactly one of text, image, todo list, shape or drawing.
//! Todo lists own their fields (IDs scoped to the list) and drawings own an
//! ordered stroke of points.
//!
//! # Architecture
//!
//! ```text
//! ItemCreate ──► resolver ──► ResolvedItem
//!                                  │
//!                 sequencer (max + 1 per scope)
//!                                  │
//!                        WorkspaceStore (SQLite)
//!                                  │
//!                    loader ──► Workspace graph
//!                                  │
//!                        projection ──► WorkspaceRead
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod projection;
pub mod request;
pub mod resolver;
pub mod sequencer;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{Error, ErrorKind, Result};
pub use projection::{
    DrawingItemRead, DrawingPointRead, ImageItemRead, ItemRead, ShapeItemRead, TextItemRead,
    TodoListItemFieldRead, WorkspaceRead,
};
pub use request::{
    DrawingItemCreate, ImageItemCreate, ItemCreate, PointCreate, ShapeItemCreate,
    TextItemCreate, TodoItemFieldCreate,
};
pub use store::WorkspaceStore;
pub use types::{
    DrawingItem, ImageItem, Item, ItemAttributes, ItemContent, ItemKind, LocalId, Point,
    ShapeItem, TextItem, TodoListField, TodoListItem, User, UserId, Workspace, WorkspaceId,
};

use async_trait::async_trait;

/// Operations a transport layer needs from the store.
///
/// [`WorkspaceStore`] is the SQLite implementation; callers hold it as
/// `Arc<dyn WorkspaceRepository>` so handlers can be tested against fakes.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Create a user and the workspace that shares its ID.
    async fn create_user_with_workspace(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<User>;

    /// Get a user by ID.
    async fn get_user(&self, id: UserId) -> Result<User>;

    /// Look up a user by login.
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>>;

    /// Page through users (1-based `page`).
    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<User>>;

    /// Number of registered users.
    async fn user_count(&self) -> Result<u64>;

    /// Change a user's login and, optionally, credential hash.
    async fn update_user(
        &self,
        id: UserId,
        login: &str,
        password_hash: Option<&str>,
    ) -> Result<User>;

    /// Create an item and return its workspace-scoped ID.
    async fn create_item(
        &self,
        workspace_id: WorkspaceId,
        request: &ItemCreate,
    ) -> Result<LocalId>;

    /// Delete an item and everything it owns.
    async fn delete_item(&self, workspace_id: WorkspaceId, local_id: LocalId) -> Result<()>;

    /// Load the flattened projection of a workspace.
    async fn load_workspace(&self, workspace_id: WorkspaceId) -> Result<WorkspaceRead>;
}

#[async_trait]
impl WorkspaceRepository for WorkspaceStore {
    async fn create_user_with_workspace(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<User> {
        WorkspaceStore::create_user_with_workspace(self, login, password_hash).await
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        WorkspaceStore::get_user(self, id).await
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        WorkspaceStore::find_user_by_login(self, login).await
    }

    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<User>> {
        WorkspaceStore::list_users(self, page, limit).await
    }

    async fn user_count(&self) -> Result<u64> {
        WorkspaceStore::user_count(self).await
    }

    async fn update_user(
        &self,
        id: UserId,
        login: &str,
        password_hash: Option<&str>,
    ) -> Result<User> {
        WorkspaceStore::update_user(self, id, login, password_hash).await
    }

    async fn create_item(
        &self,
        workspace_id: WorkspaceId,
        request: &ItemCreate,
    ) -> Result<LocalId> {
        WorkspaceStore::create_item(self, workspace_id, request).await
    }

    async fn delete_item(&self, workspace_id: WorkspaceId, local_id: LocalId) -> Result<()> {
        WorkspaceStore::delete_item(self, workspace_id, local_id).await
    }

    async fn load_workspace(&self, workspace_id: WorkspaceId) -> Result<WorkspaceRead> {
        WorkspaceStore::load_workspace(self, workspace_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_store_behind_trait_object() {
        let store = WorkspaceStore::in_memory().await.unwrap();
        let repo: Arc<dyn WorkspaceRepository> = Arc::new(store);
        let user = repo.create_user_with_workspace("ada", "hash").await.unwrap();

        let id = repo
            .create_item(user.workspace_id(), &ItemCreate::shape("circle"))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let ws = repo.load_workspace(user.workspace_id()).await.unwrap();
        assert_eq!(ws.items.len(), 1);
        assert_eq!(ws.items[0].shape.as_ref().unwrap().name, "circle");
        assert_eq!(repo.user_count().await.unwrap(), 1);
    }
}
