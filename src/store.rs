//! The ledger store: single owner of all mutable state.
//!
//! Every operation from the outside world goes through [`LedgerStore`]; it
//! validates, applies the transition, and persists the snapshot. Execution
//! is single-threaded and synchronous, so each operation is atomic from the
//! caller's point of view.

use crate::animals;
use crate::auth::{self, NewUser};
use crate::bets::{self, Bet, BetStatus};
use crate::config::SeedConfig;
use crate::draws::{self, Draw, NumberSource, RandomNumberSource};
use crate::errors::{BichoError, BichoResult};
use crate::ledger::{LedgerState, User};
use crate::storage::SnapshotStore;
use crate::sync;
use tracing::info;

/// On-demand aggregates for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    pub users: usize,
    pub bets: usize,
    pub pending_bets: usize,
    pub draws: usize,
    pub credits_in_circulation: i64,
    pub total_wagered: i64,
    pub total_paid_out: i64,
}

/// Owning service around the ledger.
///
/// The session is just the logged-in user's id; the live record is always
/// resolved from `users`, so balances can never drift between a session
/// copy and the roster. The denormalized `currentUser` field of the
/// snapshot is materialized at save time and resolved back at load time.
pub struct LedgerStore {
    state: LedgerState,
    session: Option<String>,
    storage: Box<dyn SnapshotStore>,
}

impl LedgerStore {
    /// Open the ledger: validate the registry, then load the persisted
    /// snapshot or seed a fresh one.
    pub fn open(storage: Box<dyn SnapshotStore>, seed: &SeedConfig) -> BichoResult<Self> {
        animals::validate_registry(animals::registry())?;

        let state = storage.load().unwrap_or_else(|| {
            info!("no usable snapshot, seeding fresh ledger");
            LedgerState::seeded(seed)
        });

        // A snapshot's currentUser only counts if it still exists in the
        // roster; otherwise the session starts logged out.
        let session = state
            .current_user
            .as_ref()
            .map(|u| u.id.clone())
            .filter(|id| state.users.iter().any(|u| &u.id == id));

        Ok(Self {
            state,
            session,
            storage,
        })
    }

    fn persist(&mut self) {
        self.state.current_user = self.current_user().cloned();
        self.storage.save(&self.state);
    }

    // --- session / auth ---------------------------------------------------

    /// Resolve a credential pair and establish the session.
    pub fn login(&mut self, username: &str, password: &str) -> BichoResult<User> {
        let user = auth::login(&self.state.users, username, password)?.clone();
        self.session = Some(user.id.clone());
        self.persist();
        info!(username = %user.username, "login");
        Ok(user)
    }

    /// Clear the session. Always succeeds.
    pub fn logout(&mut self) {
        self.session = None;
        self.persist();
    }

    /// The live record of the logged-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        let id = self.session.as_deref()?;
        self.state.users.iter().find(|u| u.id == id)
    }

    /// Authorize a new player.
    pub fn create_user(&mut self, request: NewUser) -> BichoResult<User> {
        let user = auth::create_user(&mut self.state.users, request)?;
        self.persist();
        Ok(user)
    }

    /// Remove a player. No-op for the protected admin and unknown ids.
    /// The player's bets stay in the ledger, orphaned.
    pub fn delete_user(&mut self, id: &str) -> bool {
        let removed = auth::delete_user(&mut self.state.users, id);
        if removed {
            if self.session.as_deref() == Some(id) {
                self.session = None;
            }
            self.persist();
        }
        removed
    }

    // --- betting and draws ------------------------------------------------

    /// Place a wager for the logged-in user.
    pub fn place_bet(&mut self, animal_id: u32, amount: i64) -> BichoResult<Bet> {
        let id = self.session.clone().ok_or(BichoError::NotLoggedIn)?;
        let bettor = self
            .state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(BichoError::UserNotFound(id))?;

        let bet = bets::place_bet(bettor, animal_id, amount)?;
        info!(
            user = %bet.user_id,
            animal_id,
            amount,
            potential_win = bet.potential_win,
            "bet placed"
        );
        self.state.bets.push(bet.clone());
        self.persist();
        Ok(bet)
    }

    /// Run a draw with the production random source.
    pub fn execute_draw(&mut self) -> BichoResult<Draw> {
        self.execute_draw_with(&mut RandomNumberSource)
    }

    /// Run a draw with a caller-supplied number source.
    pub fn execute_draw_with(&mut self, source: &mut dyn NumberSource) -> BichoResult<Draw> {
        let draw = draws::execute_draw(&mut self.state, source)?;
        self.persist();
        Ok(draw)
    }

    // --- sync -------------------------------------------------------------

    /// Export the portable state as a copy-pasteable blob.
    pub fn export_sync(&self) -> String {
        sync::export(&self.state)
    }

    /// Import a blob, wholesale replacing users, bets and draws.
    ///
    /// A malformed blob leaves everything untouched. A valid one wins
    /// outright; if the logged-in user no longer exists afterwards the
    /// session is cleared.
    pub fn import_sync(&mut self, blob: &str) -> BichoResult<()> {
        let payload = sync::import(blob)?;
        info!(
            users = payload.users.len(),
            bets = payload.bets.len(),
            draws = payload.draws.len(),
            "importing sync blob"
        );
        self.state.users = payload.users;
        self.state.bets = payload.bets;
        self.state.draws = payload.draws;

        if let Some(id) = self.session.as_deref() {
            if !self.state.users.iter().any(|u| u.id == id) {
                self.session = None;
            }
        }
        self.persist();
        Ok(())
    }

    // --- queries ----------------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.state.users
    }

    pub fn bets(&self) -> &[Bet] {
        &self.state.bets
    }

    /// Bets of one user, in creation order.
    pub fn bets_for(&self, user_id: &str) -> Vec<&Bet> {
        self.state.bets.iter().filter(|b| b.user_id == user_id).collect()
    }

    /// Draws, most recent first.
    pub fn draws(&self) -> &[Draw] {
        &self.state.draws
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            users: self.state.users.len(),
            bets: self.state.bets.len(),
            pending_bets: self.state.bets.iter().filter(|b| b.is_pending()).count(),
            draws: self.state.draws.len(),
            credits_in_circulation: self.state.users.iter().map(|u| u.balance).sum(),
            total_wagered: self.state.bets.iter().map(|b| b.amount).sum(),
            total_paid_out: self
                .state
                .bets
                .iter()
                .filter(|b| b.status == BetStatus::Won)
                .map(|b| b.potential_win)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::FixedNumberSource;
    use crate::ledger::UserRole;
    use crate::storage::MemorySnapshotStore;

    fn open_seeded() -> (LedgerStore, MemorySnapshotStore) {
        let storage = MemorySnapshotStore::new();
        let store = LedgerStore::open(Box::new(storage.clone()), &SeedConfig::default())
            .expect("open");
        (store, storage)
    }

    fn player_request(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "pw".to_string(),
            rp_name: username.to_string(),
            role: UserRole::User,
            balance: 1_000,
        }
    }

    #[test]
    fn test_bet_requires_login() {
        let (mut store, _) = open_seeded();
        match store.place_bet(9, 100) {
            Err(BichoError::NotLoggedIn) => {}
            other => panic!("Expected NotLoggedIn, got {:?}", other),
        }
    }

    #[test]
    fn test_full_winning_round() {
        let (mut store, _) = open_seeded();
        store.create_user(player_request("marcos")).expect("create");
        store.login("marcos", "pw").expect("login");

        store.place_bet(9, 100).expect("bet");
        assert_eq!(store.current_user().unwrap().balance, 900);

        store
            .execute_draw_with(&mut FixedNumberSource(34))
            .expect("draw");

        assert_eq!(store.current_user().unwrap().balance, 900 + 100 * 18);
        let my_bets = store.bets_for(&store.current_user().unwrap().id.clone());
        assert_eq!(my_bets.len(), 1);
        assert_eq!(my_bets[0].status, BetStatus::Won);
    }

    #[test]
    fn test_rejected_bet_persists_nothing_new() {
        let (mut store, storage) = open_seeded();
        store.create_user(player_request("marcos")).expect("create");
        store.login("marcos", "pw").expect("login");
        let persisted_before = storage.persisted().expect("persisted");

        assert!(store.place_bet(9, 5_000).is_err());

        assert_eq!(storage.persisted().expect("persisted"), persisted_before);
        assert!(store.bets().is_empty());
    }

    #[test]
    fn test_snapshot_materializes_current_user() {
        let (mut store, storage) = open_seeded();
        store.create_user(player_request("marcos")).expect("create");
        store.login("marcos", "pw").expect("login");
        store.place_bet(9, 100).expect("bet");

        let snapshot = storage.persisted().expect("persisted");
        let current = snapshot.current_user.expect("currentUser set");
        assert_eq!(current.username, "marcos");
        // The denormalized copy carries the post-debit balance.
        assert_eq!(current.balance, 900);

        store.logout();
        assert!(storage.persisted().unwrap().current_user.is_none());
    }

    #[test]
    fn test_session_survives_reopen() {
        let (mut store, storage) = open_seeded();
        store.create_user(player_request("marcos")).expect("create");
        store.login("marcos", "pw").expect("login");
        drop(store);

        let reopened = LedgerStore::open(Box::new(storage), &SeedConfig::default())
            .expect("reopen");
        assert_eq!(reopened.current_user().unwrap().username, "marcos");
    }

    #[test]
    fn test_deleting_a_user_orphans_their_bets() {
        let (mut store, _) = open_seeded();
        let player = store.create_user(player_request("marcos")).expect("create");
        store.login("marcos", "pw").expect("login");
        store.place_bet(9, 100).expect("bet");

        assert!(store.delete_user(&player.id));

        assert!(store.current_user().is_none());
        assert_eq!(store.bets().len(), 1);
        assert_eq!(store.bets()[0].user_id, player.id);

        // The orphaned bet settles normally but credits no one.
        store
            .execute_draw_with(&mut FixedNumberSource(34))
            .expect("draw");
        assert_eq!(store.bets()[0].status, BetStatus::Won);
    }

    #[test]
    fn test_protected_admin_survives_delete() {
        let (mut store, _) = open_seeded();
        assert!(!store.delete_user("1"));
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn test_import_replaces_wholesale_and_drops_stale_session() {
        let (mut exporter, _) = open_seeded();
        exporter.create_user(player_request("marcos")).expect("create");
        let blob = exporter.export_sync();

        let (mut importer, _) = open_seeded();
        let ghost = importer.create_user(player_request("ghost")).expect("create");
        importer.login("ghost", "pw").expect("login");

        importer.import_sync(&blob).expect("import");

        assert!(importer.users().iter().all(|u| u.id != ghost.id));
        assert!(importer.users().iter().any(|u| u.username == "marcos"));
        assert!(importer.current_user().is_none());
    }

    #[test]
    fn test_malformed_import_leaves_store_untouched() {
        let (mut store, storage) = open_seeded();
        store.create_user(player_request("marcos")).expect("create");
        let persisted_before = storage.persisted().expect("persisted");

        assert!(store.import_sync("zz-not-hex").is_err());

        assert_eq!(storage.persisted().expect("persisted"), persisted_before);
        assert_eq!(store.users().len(), 2);
    }

    #[test]
    fn test_stats_track_the_round() {
        let (mut store, _) = open_seeded();
        store.create_user(player_request("marcos")).expect("create");
        store.login("marcos", "pw").expect("login");
        store.place_bet(9, 100).expect("bet");
        store.place_bet(13, 50).expect("bet");

        let stats = store.stats();
        assert_eq!(stats.users, 2);
        assert_eq!(stats.bets, 2);
        assert_eq!(stats.pending_bets, 2);
        assert_eq!(stats.total_wagered, 150);
        assert_eq!(stats.total_paid_out, 0);

        store
            .execute_draw_with(&mut FixedNumberSource(34))
            .expect("draw");

        let stats = store.stats();
        assert_eq!(stats.pending_bets, 0);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.total_paid_out, 100 * 18);
        assert_eq!(
            stats.credits_in_circulation,
            1_000_000 + 1_000 - 150 + 100 * 18
        );
    }
}
