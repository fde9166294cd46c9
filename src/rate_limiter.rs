use serde::Serialize;

use crate::account::Account;

/// Why a draw was turned away without touching the account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    TooSoon {
        #[serde(rename = "retryInMs")]
        retry_in_ms: u64,
    },
}

/// Minimum wall-clock spacing between two draws of the same account. The
/// first draw is always admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepRateLimiter {
    interval_ms: u64,
}

impl StepRateLimiter {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn cooldown_remaining_ms(&self, account: &Account, now_ms: u64) -> u64 {
        match account.last_draw_ms() {
            Some(last_ms) => last_ms
                .saturating_add(self.interval_ms)
                .saturating_sub(now_ms),
            None => 0,
        }
    }

    pub fn is_ready(&self, account: &Account, now_ms: u64) -> bool {
        self.cooldown_remaining_ms(account, now_ms) == 0
    }

    /// Read-only admission check.
    pub fn check(&self, account: &Account, now_ms: u64) -> Result<(), Rejection> {
        match self.cooldown_remaining_ms(account, now_ms) {
            0 => Ok(()),
            retry_in_ms => Err(Rejection::TooSoon { retry_in_ms }),
        }
    }

    /// Admits and records `now_ms` in the account's draw log, or leaves the
    /// log untouched and returns false.
    ///
    /// Standalone use only: this records a timestamp without a step, so an
    /// account driven through here no longer has one timestamp per step.
    /// `RewardEngine::advance_step` uses `check` and records on payout.
    pub fn try_consume(&self, account: &mut Account, now_ms: u64) -> bool {
        if self.check(account, now_ms).is_err() {
            return false;
        }
        account.push_draw_timestamp(now_ms);
        true
    }
}
