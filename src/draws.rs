//! Draw records and the draw/settlement engine.

use crate::animals;
use crate::bets::BetStatus;
use crate::errors::{BichoError, BichoResult};
use crate::ledger::{now_millis, LedgerState};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DrawStatus {
    /// Vestigial placeholder found in some legacy snapshots; no code path
    /// ever advances it. Kept so those snapshots still deserialize.
    Scheduled,
    Completed,
}

/// One completed extraction: the winning number and its animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub id: String,
    pub draw_time: i64,
    pub winning_number: Option<u32>,
    pub winning_animal_id: Option<u32>,
    pub status: DrawStatus,
}

/// Source of winning numbers. The production source is uniform random;
/// tests substitute a fixed one.
pub trait NumberSource {
    /// Next winning number, expected in 1..=100.
    fn draw_number(&mut self) -> u32;
}

/// Uniform draw over 1..=100.
#[derive(Default)]
pub struct RandomNumberSource;

impl NumberSource for RandomNumberSource {
    fn draw_number(&mut self) -> u32 {
        rand::thread_rng().gen_range(animals::MIN_NUMBER..=animals::MAX_NUMBER)
    }
}

/// Always returns the same number. For tests and forced demo draws.
pub struct FixedNumberSource(pub u32);

impl NumberSource for FixedNumberSource {
    fn draw_number(&mut self) -> u32 {
        self.0
    }
}

/// Draw a winning number and settle every pending bet against it.
///
/// Settlement is a total single pass: every bet that was `Pending` before
/// the call leaves it `Won` or `Lost` carrying this draw's id; bets settled
/// by earlier draws are untouched. Winners are credited `potential_win`
/// each; several winning bets by one user all pay out. The new draw is
/// prepended to `draws`, keeping that list reverse-chronological.
///
/// The only failure is a number that resolves to no animal, which means the
/// registry (or the number source) is malformed; nothing is mutated then.
pub fn execute_draw(
    state: &mut LedgerState,
    source: &mut dyn NumberSource,
) -> BichoResult<Draw> {
    let number = source.draw_number();
    let animal = animals::animal_for_number(number).ok_or_else(|| {
        BichoError::RegistryViolation(format!("winning number {} maps to no animal", number))
    })?;

    let draw = Draw {
        id: Uuid::new_v4().to_string(),
        draw_time: now_millis(),
        winning_number: Some(number),
        winning_animal_id: Some(animal.id),
        status: DrawStatus::Completed,
    };

    let mut settled = 0usize;
    for bet in state.bets.iter_mut().filter(|b| b.is_pending()) {
        bet.draw_id = Some(draw.id.clone());
        bet.status = if bet.animal_id == animal.id {
            BetStatus::Won
        } else {
            BetStatus::Lost
        };
        settled += 1;
    }

    let mut winners = 0usize;
    let mut credited = 0i64;
    for bet in state
        .bets
        .iter()
        .filter(|b| b.status == BetStatus::Won && b.draw_id.as_deref() == Some(&draw.id))
    {
        match state.users.iter_mut().find(|u| u.id == bet.user_id) {
            Some(owner) => {
                owner.balance += bet.potential_win;
                winners += 1;
                credited += bet.potential_win;
            }
            // Orphaned bet from a deleted user; the win goes nowhere.
            None => warn!(
                bet_id = %bet.id,
                user_id = %bet.user_id,
                "winning bet references a missing user, skipping credit"
            ),
        }
    }

    state.draws.insert(0, draw.clone());

    info!(
        number,
        animal = %animal.name,
        settled,
        winners,
        credited,
        "draw completed"
    );

    Ok(draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bets::place_bet;
    use crate::config::SeedConfig;
    use crate::ledger::{User, UserRole};

    fn state_with_player(balance: i64) -> LedgerState {
        let mut state = LedgerState::seeded(&SeedConfig::default());
        state.users.push(User {
            id: "u-1".to_string(),
            username: "marcos_silva".to_string(),
            password: "hunter2".to_string(),
            rp_name: "Dr. Marcos".to_string(),
            balance,
            role: UserRole::User,
            created_at: 0,
        });
        state
    }

    fn bet_on(state: &mut LedgerState, user_id: &str, animal_id: u32, amount: i64) {
        let bettor = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .expect("bettor");
        let bet = place_bet(bettor, animal_id, amount).expect("bet accepted");
        state.bets.push(bet);
    }

    #[test]
    fn test_winning_bet_is_credited() {
        // Cobra (id 9) owns 33..=36; force 34.
        let mut state = state_with_player(1_000);
        bet_on(&mut state, "u-1", 9, 100);

        let draw = execute_draw(&mut state, &mut FixedNumberSource(34)).expect("draw");

        assert_eq!(draw.winning_number, Some(34));
        assert_eq!(draw.winning_animal_id, Some(9));
        assert_eq!(draw.status, DrawStatus::Completed);

        let bet = &state.bets[0];
        assert_eq!(bet.status, BetStatus::Won);
        assert_eq!(bet.draw_id.as_deref(), Some(draw.id.as_str()));

        let player = state.users.iter().find(|u| u.id == "u-1").unwrap();
        assert_eq!(player.balance, 1_000 - 100 + 100 * 18);
    }

    #[test]
    fn test_losing_bet_keeps_only_the_debit() {
        // Number 50 belongs to Galo (id 13), not Cobra.
        let mut state = state_with_player(1_000);
        bet_on(&mut state, "u-1", 9, 100);

        let draw = execute_draw(&mut state, &mut FixedNumberSource(50)).expect("draw");

        assert_eq!(draw.winning_animal_id, Some(13));
        assert_eq!(state.bets[0].status, BetStatus::Lost);
        let player = state.users.iter().find(|u| u.id == "u-1").unwrap();
        assert_eq!(player.balance, 900);
    }

    #[test]
    fn test_settled_bets_are_untouched_by_later_draws() {
        let mut state = state_with_player(1_000);
        bet_on(&mut state, "u-1", 9, 100);

        let first = execute_draw(&mut state, &mut FixedNumberSource(50)).expect("draw");
        let settled = state.bets[0].clone();

        execute_draw(&mut state, &mut FixedNumberSource(34)).expect("draw");

        assert_eq!(state.bets[0], settled);
        assert_eq!(state.bets[0].draw_id.as_deref(), Some(first.id.as_str()));
        // No pending bets, so the second draw credits nothing.
        let player = state.users.iter().find(|u| u.id == "u-1").unwrap();
        assert_eq!(player.balance, 900);
    }

    #[test]
    fn test_multiple_winning_bets_accumulate() {
        let mut state = state_with_player(1_000);
        bet_on(&mut state, "u-1", 9, 100);
        bet_on(&mut state, "u-1", 9, 50);
        bet_on(&mut state, "u-1", 13, 200);

        execute_draw(&mut state, &mut FixedNumberSource(33)).expect("draw");

        // Debits 350, wins 100*18 + 50*18.
        let player = state.users.iter().find(|u| u.id == "u-1").unwrap();
        assert_eq!(player.balance, 1_000 - 350 + 150 * 18);
    }

    #[test]
    fn test_balance_deltas_match_winning_potential() {
        let mut state = state_with_player(10_000);
        for animal_id in [1, 9, 9, 13, 25] {
            bet_on(&mut state, "u-1", animal_id, 100);
        }
        let before: i64 = state.users.iter().map(|u| u.balance).sum();

        let draw = execute_draw(&mut state, &mut FixedNumberSource(36)).expect("draw");

        let after: i64 = state.users.iter().map(|u| u.balance).sum();
        let won: i64 = state
            .bets
            .iter()
            .filter(|b| b.status == BetStatus::Won && b.draw_id.as_deref() == Some(&*draw.id))
            .map(|b| b.potential_win)
            .sum();
        assert_eq!(after - before, won);
        assert_eq!(won, 2 * 100 * 18);
    }

    #[test]
    fn test_every_pending_bet_is_settled() {
        let mut state = state_with_player(10_000);
        for animal_id in 1..=10 {
            bet_on(&mut state, "u-1", animal_id, 10);
        }

        let draw = execute_draw(&mut state, &mut FixedNumberSource(1)).expect("draw");

        for bet in &state.bets {
            assert_ne!(bet.status, BetStatus::Pending);
            assert_eq!(bet.draw_id.as_deref(), Some(draw.id.as_str()));
        }
    }

    #[test]
    fn test_draws_are_prepended() {
        let mut state = state_with_player(1_000);
        let first = execute_draw(&mut state, &mut FixedNumberSource(1)).expect("draw");
        let second = execute_draw(&mut state, &mut FixedNumberSource(2)).expect("draw");

        assert_eq!(state.draws.len(), 2);
        assert_eq!(state.draws[0].id, second.id);
        assert_eq!(state.draws[1].id, first.id);
    }

    #[test]
    fn test_out_of_range_number_aborts_without_mutation() {
        let mut state = state_with_player(1_000);
        bet_on(&mut state, "u-1", 9, 100);
        let before = state.clone();

        match execute_draw(&mut state, &mut FixedNumberSource(0)) {
            Err(BichoError::RegistryViolation(_)) => {}
            other => panic!("Expected RegistryViolation, got {:?}", other),
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_random_source_stays_in_range() {
        let mut source = RandomNumberSource;
        for _ in 0..1_000 {
            let n = source.draw_number();
            assert!((1..=100).contains(&n));
        }
    }
}
