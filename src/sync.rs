//! Manual cross-device sync codec.
//!
//! Replication here is deliberately naive: one instance exports its
//! `{users, bets, draws}` as a copy-pasteable text blob and another imports
//! it, wholesale replacing its own collections. Last import wins; there is
//! no merge and no conflict detection.

use crate::bets::Bet;
use crate::draws::Draw;
use crate::errors::{BichoError, BichoResult};
use crate::ledger::{LedgerState, User};
use serde::{Deserialize, Serialize};

/// The portable portion of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub users: Vec<User>,
    pub bets: Vec<Bet>,
    pub draws: Vec<Draw>,
}

/// Encode the portable state as a hex text blob.
pub fn export(state: &LedgerState) -> String {
    let payload = SyncPayload {
        users: state.users.clone(),
        bets: state.bets.clone(),
        draws: state.draws.clone(),
    };
    let json = serde_json::to_vec(&payload).expect("sync payload must serialize");
    hex::encode(json)
}

/// Decode a blob produced by [`export`].
///
/// Surrounding whitespace is tolerated since blobs travel through chat
/// windows. Any decoding failure rejects the whole blob; the caller's state
/// is untouched.
pub fn import(blob: &str) -> BichoResult<SyncPayload> {
    let bytes = hex::decode(blob.trim())
        .map_err(|e| BichoError::MalformedSnapshot(format!("invalid sync blob: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| BichoError::MalformedSnapshot(format!("invalid sync payload: {}", e)))
}
