use serde::Serialize;

use crate::account::Account;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::gate::check_account;
use crate::noise::{self, NoiseDraw};
use crate::rate_limiter::{Rejection, StepRateLimiter};
use crate::reward_table;
use crate::rng::Rng;
use crate::session::GameSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RewardOutcome {
    pub tier: i64,
    pub experience: u64,
    pub credits: u64,
    #[serde(rename = "stepsCompleted")]
    pub steps_completed: u32,
    #[serde(rename = "drawnAtMs")]
    pub drawn_at_ms: u64,
    pub draw: NoiseDraw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Advanced(RewardOutcome),
    Rejected(Rejection),
}

impl StepResult {
    pub fn outcome(&self) -> Option<&RewardOutcome> {
        match self {
            Self::Advanced(outcome) => Some(outcome),
            Self::Rejected(_) => None,
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced(_))
    }
}

/// Runs one reward draw per call. Session and accounts are borrowed per call;
/// the engine owns only its clock, RNG and limits.
#[derive(Clone, Debug)]
pub struct RewardEngine<C: Clock = SystemClock> {
    clock: C,
    rng: Rng,
    step_limit: u32,
    rate_limiter: StepRateLimiter,
}

impl RewardEngine<SystemClock> {
    pub fn with_system_clock(config: &EngineConfig) -> Self {
        Self::new(config, SystemClock, Rng::from_entropy())
    }
}

impl<C: Clock> RewardEngine<C> {
    pub fn new(config: &EngineConfig, clock: C, rng: Rng) -> Self {
        Self {
            clock,
            rng,
            step_limit: config.step_limit,
            rate_limiter: StepRateLimiter::new(config.step_time_limit_ms()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    pub fn step_limit(&self) -> u32 {
        self.step_limit
    }

    pub fn rate_limiter(&self) -> &StepRateLimiter {
        &self.rate_limiter
    }

    pub fn cooldown_remaining_ms(&self, account: &Account) -> u64 {
        self.rate_limiter
            .cooldown_remaining_ms(account, self.clock.now_ms())
    }

    /// Gate, rate limit, derive a tier, pay it out. The account is written
    /// only after the tier lookup succeeds, so every `Err` and every
    /// `Rejected` leaves it exactly as it was.
    pub fn advance_step(
        &mut self,
        session: &GameSession,
        account: &mut Account,
    ) -> Result<StepResult, EngineError> {
        let now_ms = self.clock.now_ms();
        check_account(session, account, self.step_limit, now_ms)?;
        if let Err(rejection) = self.rate_limiter.check(account, now_ms) {
            return Ok(StepResult::Rejected(rejection));
        }

        let draw = noise::draw(session, &self.clock, &mut self.rng)?;
        let reward = reward_table::lookup(draw.tier)?;

        account.push_draw_timestamp(now_ms);
        account.credit_reward(reward);

        Ok(StepResult::Advanced(RewardOutcome {
            tier: draw.tier,
            experience: reward.experience,
            credits: reward.credits,
            steps_completed: account.steps_completed(),
            drawn_at_ms: now_ms,
            draw,
        }))
    }
}
