use super::WorkspaceStore;
use crate::error::{is_unique_violation, Error, Result};
use crate::types::{User, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::info;

#[derive(FromRow)]
struct UserRow {
    id: i64,
    login: String,
    password_hash: String,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Internal(format!("bad created_at on user {}: {e}", row.id)))?;
        Ok(User {
            id: row.id,
            login: row.login,
            password_hash: row.password_hash,
            created_at,
        })
    }
}

fn map_login_conflict(err: sqlx::Error, login: &str) -> Error {
    if is_unique_violation(&err) {
        Error::DuplicateLogin(login.to_string())
    } else {
        Error::Database(err)
    }
}

fn require_credentials(login: &str, password_hash: &str) -> Result<()> {
    if login.is_empty() {
        return Err(Error::validation("login is required"));
    }
    if password_hash.is_empty() {
        return Err(Error::validation("credential hash is required"));
    }
    Ok(())
}

impl WorkspaceStore {
    // ── Users ───────────────────────────────────────────────────

    /// Create a user and its workspace atomically.
    ///
    /// The workspace shares the new user's ID. A taken login yields
    /// [`Error::DuplicateLogin`] and leaves no rows behind.
    pub async fn create_user_with_workspace(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<User> {
        require_credentials(login, password_hash)?;
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO users (login, password_hash, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(login)
        .bind(password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_login_conflict(e, login))?;
        let id = result.last_insert_rowid();

        sqlx::query("INSERT INTO workspaces (user_id, revision) VALUES (?1, 0)")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(user_id = id, login, "User and workspace created");

        Ok(User {
            id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<User> {
        let row: UserRow = sqlx::query_as(
            "SELECT id, login, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;

        row.try_into()
    }

    /// Look up a user by login.
    pub async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, login, password_hash, created_at FROM users WHERE login = ?1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Page through users ordered by ID. `page` is 1-based.
    pub async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<User>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, login, password_hash, created_at FROM users
             ORDER BY id LIMIT ?1 OFFSET ?2",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Change a user's login and, optionally, credential hash.
    pub async fn update_user(
        &self,
        id: UserId,
        login: &str,
        password_hash: Option<&str>,
    ) -> Result<User> {
        if login.is_empty() {
            return Err(Error::validation("login is required"));
        }
        if password_hash.is_some_and(str::is_empty) {
            return Err(Error::validation("credential hash is required"));
        }

        let result = sqlx::query(
            "UPDATE users SET login = ?1, password_hash = COALESCE(?2, password_hash)
             WHERE id = ?3",
        )
        .bind(login)
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_login_conflict(e, login))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("user not found"));
        }
        info!(user_id = id, login, "User updated");
        self.get_user(id).await
    }

    /// True if a workspace exists for `id`.
    pub async fn workspace_exists(&self, id: UserId) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        super::workspace_row_exists(&mut *conn, id).await
    }
}
