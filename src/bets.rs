//! Bet records and the bet engine.

use crate::animals;
use crate::errors::{BichoError, BichoResult};
use crate::ledger::{now_millis, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

/// A wager on one animal.
///
/// Created `Pending` with no draw; settled exactly once by the draw engine,
/// which assigns `draw_id` and flips the status. Terminal afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: String,
    pub user_id: String,
    pub animal_id: u32,
    pub amount: i64,
    pub draw_id: Option<String>,
    pub status: BetStatus,
    pub potential_win: i64,
    pub created_at: i64,
}

impl Bet {
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }
}

/// Validate and record a wager, debiting the bettor.
///
/// The bettor is only mutated once every check has passed, so a rejected
/// bet leaves the ledger exactly as it was.
pub fn place_bet(bettor: &mut User, animal_id: u32, amount: i64) -> BichoResult<Bet> {
    if amount <= 0 {
        return Err(BichoError::InvalidAmount(amount));
    }
    if bettor.balance < amount {
        return Err(BichoError::InsufficientBalance {
            balance: bettor.balance,
            amount,
        });
    }
    let animal =
        animals::animal_by_id(animal_id).ok_or(BichoError::UnknownAnimal(animal_id))?;

    bettor.balance -= amount;

    Ok(Bet {
        id: Uuid::new_v4().to_string(),
        user_id: bettor.id.clone(),
        animal_id: animal.id,
        amount,
        draw_id: None,
        status: BetStatus::Pending,
        potential_win: amount * animal.multiplier as i64,
        created_at: now_millis(),
    })
}
