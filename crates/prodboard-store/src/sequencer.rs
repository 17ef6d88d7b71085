//! Scoped identifier assignment.
//!
//! The next ID in a scope is `max(existing) + 1`, or 1 for an empty scope.
//! IDs vacated at the top of a scope are handed out again; IDs below the
//! current maximum are not.
//!
//! [`next_id`] must run on a connection inside a transaction that already
//! holds the SQLite write lock (the store bumps the workspace revision
//! first). Otherwise two writers can observe the same maximum; the
//! composite primary keys then reject the second insert and the store
//! retries with a fresh ID.

use crate::error::{is_busy, is_unique_violation, Error, Result};
use crate::types::{LocalId, WorkspaceId};
use sqlx::{Row, SqliteConnection};

/// Scope an identifier is unique within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Item IDs within a workspace
    Workspace(WorkspaceId),
    /// Field IDs within one todo list of a workspace
    TodoList {
        /// Owning workspace
        workspace_id: WorkspaceId,
        /// Local ID of the todo list item
        todo_list_id: LocalId,
    },
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workspace(ws) => write!(f, "workspace {ws}"),
            Self::TodoList {
                workspace_id,
                todo_list_id,
            } => write!(f, "todo list {todo_list_id} of workspace {workspace_id}"),
        }
    }
}

/// Compute the next free identifier in `scope`.
pub async fn next_id(conn: &mut SqliteConnection, scope: Scope) -> Result<LocalId> {
    let row = match scope {
        Scope::Workspace(ws) => {
            sqlx::query(
                "SELECT COALESCE(MAX(local_id), 0) AS max_id FROM items WHERE workspace_id = ?1",
            )
            .bind(ws)
            .fetch_one(&mut *conn)
            .await
        }
        Scope::TodoList {
            workspace_id,
            todo_list_id,
        } => {
            sqlx::query(
                "SELECT COALESCE(MAX(field_id), 0) AS max_id FROM todo_list_fields
                 WHERE todo_list_item_id = ?1 AND workspace_id = ?2",
            )
            .bind(todo_list_id)
            .bind(workspace_id)
            .fetch_one(&mut *conn)
            .await
        }
    }
    .map_err(|e| conflict_or_database(e, scope))?;

    let max: i64 = row.try_get("max_id")?;
    LocalId::try_from(max)
        .ok()
        .and_then(|m| m.checked_add(1))
        .ok_or_else(|| Error::Storage(format!("identifier space exhausted in {scope}")))
}

/// Classify a write failure in `scope`: key clashes and lock timeouts are
/// retryable conflicts, anything else is an engine fault.
pub(crate) fn conflict_or_database(err: sqlx::Error, scope: Scope) -> Error {
    if is_unique_violation(&err) || is_busy(&err) {
        Error::SequenceConflict {
            scope: scope.to_string(),
        }
    } else {
        Error::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Workspace(4).to_string(), "workspace 4");
        assert_eq!(
            Scope::TodoList {
                workspace_id: 4,
                todo_list_id: 2
            }
            .to_string(),
            "todo list 2 of workspace 4"
        );
    }

    #[tokio::test]
    async fn test_key_clash_is_conflict() {
        let store = crate::WorkspaceStore::in_memory().await.unwrap();
        let ws = store
            .create_user_with_workspace("ada", "hash")
            .await
            .unwrap()
            .workspace_id();
        store
            .create_item(ws, &crate::ItemCreate::text("taken"))
            .await
            .unwrap();

        let mut conn = store.pool.acquire().await.unwrap();
        let err = sqlx::query(
            "INSERT INTO items
             (local_id, workspace_id, kind, position_x, position_y, z_index, width, height)
             VALUES (1, ?1, 'text', 0, 0, 0, 0, 0)",
        )
        .bind(ws)
        .execute(&mut *conn)
        .await
        .unwrap_err();

        assert!(is_unique_violation(&err));
        match conflict_or_database(err, Scope::Workspace(ws)) {
            Error::SequenceConflict { scope } => assert_eq!(scope, format!("workspace {ws}")),
            other => panic!("expected a sequence conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_next_id_per_scope() {
        let store = crate::WorkspaceStore::in_memory().await.unwrap();
        let ws = store
            .create_user_with_workspace("ada", "hash")
            .await
            .unwrap()
            .workspace_id();
        // The in-memory pool has a single connection; release it between calls.
        let mut conn = store.pool.acquire().await.unwrap();
        assert_eq!(next_id(&mut *conn, Scope::Workspace(ws)).await.unwrap(), 1);
        drop(conn);

        store
            .create_item(ws, &crate::ItemCreate::todo_list([("a", false), ("b", true)]))
            .await
            .unwrap();

        let mut conn = store.pool.acquire().await.unwrap();
        assert_eq!(next_id(&mut *conn, Scope::Workspace(ws)).await.unwrap(), 2);
        let list = Scope::TodoList {
            workspace_id: ws,
            todo_list_id: 1,
        };
        assert_eq!(next_id(&mut *conn, list).await.unwrap(), 3);
    }

    #[test]
    fn test_other_errors_are_not_conflicts() {
        let err = conflict_or_database(sqlx::Error::RowNotFound, Scope::Workspace(1));
        assert!(matches!(err, Error::Database(_)));
    }
}
