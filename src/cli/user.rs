//! User CLI commands
//!
//! `prodboard user create <login> --password ..`  register user and workspace
//! `prodboard user login <login> --password ..`   verify credentials

use super::{print_json, UserCommands};
use crate::credentials::{hash_password, verify_password};
use anyhow::{bail, Result};
use prodboard_store::{UserId, WorkspaceRepository};
use tracing::{info, warn};

/// Run a user subcommand.
pub async fn run(repo: &dyn WorkspaceRepository, secret: &str, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Create { login, password } => {
            require_password(&password)?;
            let hash = hash_password(&login, &password, secret);
            let user = repo.create_user_with_workspace(&login, &hash).await?;
            info!(user_id = user.id, "Registered user");
            print_json(&user)
        }
        UserCommands::Show { id } => print_json(&repo.get_user(id).await?),
        UserCommands::List { page, limit } => print_json(&repo.list_users(page, limit).await?),
        UserCommands::Count => {
            print_json(&serde_json::json!({ "users": repo.user_count().await? }))
        }
        UserCommands::Update {
            id,
            login,
            password,
        } => update(repo, secret, id, login, password).await,
        UserCommands::Login { login, password } => {
            let user = match repo.find_user_by_login(&login).await? {
                Some(user) if verify_password(&login, &password, secret, &user.password_hash) => {
                    user
                }
                _ => {
                    warn!(login = %login, "Rejected login");
                    bail!("invalid login or password");
                }
            };
            print_json(&user)
        }
    }
}

async fn update(
    repo: &dyn WorkspaceRepository,
    secret: &str,
    id: UserId,
    login: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let current = repo.get_user(id).await?;
    let login = login.unwrap_or_else(|| current.login.clone());

    // Hashes embed the login, so a rename needs the password to rehash.
    if login != current.login && password.is_none() {
        bail!("changing the login requires --password");
    }
    let hash = match &password {
        Some(password) => {
            require_password(password)?;
            Some(hash_password(&login, password, secret))
        }
        None => None,
    };

    let user = repo.update_user(id, &login, hash.as_deref()).await?;
    print_json(&user)
}

fn require_password(password: &str) -> Result<()> {
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(())
}
