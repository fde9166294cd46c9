use crate::account::{create_accounts, placeholder_labels, Account};
use crate::clock::Clock;
use crate::config::{EngineConfig, ADDRESS_PREFIX, NAME_PREFIX};
use crate::engine::{RewardEngine, StepResult};
use crate::error::EngineError;
use crate::gate::is_session_valid;
use crate::leaderboard::{build_leaderboard, LeaderboardEntry};
use crate::rng::Rng;
use crate::session::{create_session, GameSession};

/// One run: the session, its accounts and the engine that pays them out.
/// Accounts are only handed out by shared reference; rewards move through
/// `advance_step` / `advance_all`.
#[derive(Clone, Debug)]
pub struct Simulation<C: Clock> {
    config: EngineConfig,
    addresses: Vec<String>,
    names: Vec<String>,
    session: GameSession,
    accounts: Vec<Account>,
    engine: RewardEngine<C>,
}

impl<C: Clock> Simulation<C> {
    /// Uses `0xAddress{i}` / `User{i}` placeholders for every account.
    pub fn new(config: EngineConfig, clock: C, rng: Rng) -> Self {
        let addresses = placeholder_labels(ADDRESS_PREFIX, config.account_count);
        let names = placeholder_labels(NAME_PREFIX, config.account_count);
        Self::with_labels(config, addresses, names, clock, rng)
    }

    pub fn with_labels(
        config: EngineConfig,
        addresses: Vec<String>,
        names: Vec<String>,
        clock: C,
        rng: Rng,
    ) -> Self {
        let config = config.normalized();
        let mut engine = RewardEngine::new(&config, clock, rng);
        let session = create_session(engine.clock(), config.lifespan_seconds);
        let accounts = create_accounts(
            config.account_count,
            &addresses,
            &names,
            engine.rng_mut(),
        );
        Self {
            config,
            addresses,
            names,
            session,
            accounts,
            engine,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, index: usize) -> Option<&Account> {
        self.accounts.get(index)
    }

    pub fn engine(&self) -> &RewardEngine<C> {
        &self.engine
    }

    pub fn is_session_valid(&self) -> bool {
        is_session_valid(&self.session, self.engine.clock().now_ms())
    }

    pub fn session_remaining_ms(&self) -> u64 {
        self.session.remaining_ms(self.engine.clock().now_ms())
    }

    pub fn all_accounts_exhausted(&self) -> bool {
        self.accounts
            .iter()
            .all(|account| account.steps_completed() >= self.config.step_limit)
    }

    pub fn advance_step(&mut self, index: usize) -> Result<StepResult, EngineError> {
        let account = self
            .accounts
            .get_mut(index)
            .ok_or(EngineError::UnknownAccount(index))?;
        self.engine.advance_step(&self.session, account)
    }

    /// One draw attempt per account in creation order. Each account gets its
    /// own result; a failure for one does not stop the rest.
    pub fn advance_all(&mut self) -> Vec<Result<StepResult, EngineError>> {
        let session = &self.session;
        let engine = &mut self.engine;
        self.accounts
            .iter_mut()
            .map(|account| engine.advance_step(session, account))
            .collect()
    }

    pub fn rename_account(
        &mut self,
        index: usize,
        display_name: impl Into<String>,
    ) -> Result<(), EngineError> {
        let account = self
            .accounts
            .get_mut(index)
            .ok_or(EngineError::UnknownAccount(index))?;
        account.set_display_name(display_name);
        Ok(())
    }

    /// Drops the session and every account and rebuilds both from the same
    /// configuration and labels. Avatars are re-rolled.
    pub fn reset_session(&mut self) {
        self.session = create_session(self.engine.clock(), self.config.lifespan_seconds);
        self.accounts = create_accounts(
            self.config.account_count,
            &self.addresses,
            &self.names,
            self.engine.rng_mut(),
        );
    }

    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        build_leaderboard(&self.accounts, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::BlockedReason;
    use crate::rate_limiter::Rejection;

    fn make_simulation(
        clock: &ManualClock,
        step_time_limit_seconds: u64,
    ) -> Simulation<ManualClock> {
        let config = EngineConfig {
            lifespan_seconds: 10,
            step_limit: 2,
            step_time_limit_seconds,
            account_count: 3,
        };
        Simulation::new(config, clock.clone(), Rng::new(8))
    }

    #[test]
    fn new_builds_placeholder_accounts_and_active_session() {
        let clock = ManualClock::new(1_000);
        let sim = make_simulation(&clock, 1);
        assert_eq!(sim.accounts().len(), 3);
        assert_eq!(sim.accounts()[2].address(), "0xAddress2");
        assert_eq!(sim.accounts()[2].display_name(), "User2");
        assert_eq!(sim.session().deadline_ms(), 11_000);
        assert!(sim.is_session_valid());
        assert_eq!(sim.session_remaining_ms(), 10_000);
    }

    #[test]
    fn advance_all_reports_per_account_results() {
        let clock = ManualClock::new(1_000);
        let mut sim = make_simulation(&clock, 1);

        let first = sim.advance_all();
        assert_eq!(first.len(), 3);
        assert!(first
            .iter()
            .all(|result| matches!(result, Ok(StepResult::Advanced(_)))));

        clock.advance(500);
        let second = sim.advance_all();
        assert!(second.iter().all(|result| matches!(
            result,
            Ok(StepResult::Rejected(Rejection::TooSoon { retry_in_ms: 500 }))
        )));

        clock.advance(500);
        sim.advance_all();
        assert!(sim.all_accounts_exhausted());
        let third = sim.advance_all();
        assert!(third
            .iter()
            .all(|result| matches!(result, Err(EngineError::StepLimitReached { .. }))));
    }

    #[test]
    fn new_clamps_config_before_building_accounts() {
        let clock = ManualClock::new(0);
        let config = EngineConfig {
            account_count: 5_000,
            ..EngineConfig::default()
        };
        let sim = Simulation::new(config, clock, Rng::new(2));
        assert_eq!(sim.config().account_count, 1_000);
        assert_eq!(sim.accounts().len(), 1_000);
        assert_eq!(sim.accounts()[999].address(), "0xAddress999");
    }

    #[test]
    fn unknown_account_is_an_error() {
        let clock = ManualClock::new(0);
        let mut sim = make_simulation(&clock, 0);
        assert_eq!(sim.advance_step(3), Err(EngineError::UnknownAccount(3)));
        assert_eq!(
            sim.rename_account(9, "x"),
            Err(EngineError::UnknownAccount(9))
        );
        assert!(sim.account(3).is_none());
    }

    #[test]
    fn rename_only_touches_display_name() {
        let clock = ManualClock::new(0);
        let mut sim = make_simulation(&clock, 0);
        sim.rename_account(1, "Traveller").unwrap();
        let account = sim.account(1).unwrap();
        assert_eq!(account.display_name(), "Traveller");
        assert_eq!(account.address(), "0xAddress1");
        assert_eq!(account.steps_completed(), 0);
    }

    #[test]
    fn expired_session_blocks_until_reset() {
        let clock = ManualClock::new(0);
        let mut sim = make_simulation(&clock, 0);
        assert!(sim.advance_step(0).unwrap().is_advanced());

        clock.set(10_000);
        assert!(!sim.is_session_valid());
        assert_eq!(
            sim.advance_step(0),
            Err(EngineError::SessionBlocked(BlockedReason::LifespanExpired))
        );

        sim.reset_session();
        assert!(sim.is_session_valid());
        assert_eq!(sim.session().deadline_ms(), 20_000);
        assert_eq!(sim.accounts().len(), 3);
        assert!(sim
            .accounts()
            .iter()
            .all(|account| account.steps_completed() == 0 && account.experience() == 0));
        assert_eq!(sim.accounts()[0].display_name(), "User0");
        assert!(sim.advance_step(0).unwrap().is_advanced());
    }

    #[test]
    fn leaderboard_follows_rewards() {
        let clock = ManualClock::new(0);
        let mut sim = make_simulation(&clock, 0);
        sim.advance_step(1).unwrap();
        let board = sim.leaderboard(Some(1));
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].address, "0xAddress1");
        assert!(board[0].score >= 2_000);
    }
}
