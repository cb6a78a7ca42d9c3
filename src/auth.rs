//! Credential matching and user administration.
//!
//! Usernames are matched trimmed and case-insensitively; passwords are
//! compared trimmed but exactly, in plain text. This is deliberate: the
//! system is a roleplay prop and accounts are handed out by an admin.

use crate::errors::{BichoError, BichoResult};
use crate::ledger::{now_millis, User, UserRole, PROTECTED_ADMIN_ID};
use tracing::info;
use uuid::Uuid;

/// Request to authorize a new player.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub rp_name: String,
    pub role: UserRole,
    pub balance: i64,
}

fn username_key(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Resolve a credential pair to a user record.
///
/// `UserNotFound` and `InvalidPassword` are distinct so the caller can
/// surface a useful message.
pub fn login<'a>(users: &'a [User], username: &str, password: &str) -> BichoResult<&'a User> {
    let key = username_key(username);
    let candidate = users
        .iter()
        .find(|u| username_key(&u.username) == key)
        .ok_or_else(|| BichoError::UserNotFound(username.trim().to_string()))?;

    if candidate.password.trim() != password.trim() {
        return Err(BichoError::InvalidPassword);
    }
    Ok(candidate)
}

/// Create a user with a fresh id and append it.
///
/// Role and balance are taken verbatim from the request.
pub fn create_user(users: &mut Vec<User>, request: NewUser) -> BichoResult<User> {
    let key = username_key(&request.username);
    if users.iter().any(|u| username_key(&u.username) == key) {
        return Err(BichoError::DuplicateUsername(request.username.trim().to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: request.username,
        password: request.password,
        rp_name: request.rp_name,
        balance: request.balance,
        role: request.role,
        created_at: now_millis(),
    };
    info!(username = %user.username, role = ?user.role, "user created");
    users.push(user.clone());
    Ok(user)
}

/// Remove a user. A no-op (returns false) for the protected admin or an
/// unknown id. The user's bets are NOT removed: settled and pending bets
/// keep their `user_id` even when it no longer resolves.
pub fn delete_user(users: &mut Vec<User>, id: &str) -> bool {
    if id == PROTECTED_ADMIN_ID {
        return false;
    }
    let before = users.len();
    users.retain(|u| u.id != id);
    let removed = users.len() < before;
    if removed {
        info!(user_id = %id, "user deleted");
    }
    removed
}
