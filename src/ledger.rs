//! Ledger records and the persisted snapshot shape.
//!
//! Field names serialize in camelCase and status enums as SCREAMING strings
//! so snapshots and sync blobs stay byte-compatible with blobs produced by
//! earlier deployments of the system.

use crate::animals::{self, Animal};
use crate::bets::Bet;
use crate::config::SeedConfig;
use crate::draws::Draw;
use serde::{Deserialize, Serialize};

/// The one user id that can never be deleted.
pub const PROTECTED_ADMIN_ID: &str = "1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

/// An authorized player. Balance is the only field that ever mutates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Stored and compared in plain text by design; this is a roleplay
    /// prop, not an authentication system.
    #[serde(default)]
    pub password: String,
    pub rp_name: String,
    pub balance: i64,
    pub role: UserRole,
    pub created_at: i64,
}

/// The full persisted snapshot: everything a running instance knows.
///
/// `current_user` is a denormalized copy of the logged-in user kept for
/// snapshot compatibility; it is materialized from `users` at save time and
/// resolved back to an id at load time, so it can never drift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub current_user: Option<User>,
    pub users: Vec<User>,
    /// Append-only, insertion order = creation order.
    pub bets: Vec<Bet>,
    /// Most-recent-first; new draws are prepended.
    pub draws: Vec<Draw>,
    pub animals: Vec<Animal>,
}

impl LedgerState {
    /// Fresh ledger with the seeded admin and empty bets/draws.
    pub fn seeded(seed: &SeedConfig) -> Self {
        Self {
            current_user: None,
            users: vec![User {
                id: PROTECTED_ADMIN_ID.to_string(),
                username: seed.admin_username.clone(),
                password: seed.admin_password.clone(),
                rp_name: seed.admin_rp_name.clone(),
                balance: seed.admin_balance,
                role: UserRole::Admin,
                created_at: now_millis(),
            }],
            bets: Vec::new(),
            draws: Vec::new(),
            animals: animals::registry().to_vec(),
        }
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
