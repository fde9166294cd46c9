use serde::Serialize;

use crate::error::EngineError;

pub const TIER_COUNT: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Reward {
    pub experience: u64,
    pub credits: u64,
}

const fn reward(experience: u64, credits: u64) -> Reward {
    Reward {
        experience,
        credits,
    }
}

const REWARD_TIERS: [Reward; TIER_COUNT] = [
    reward(1_000, 1_000),
    reward(1_000, 2_000),
    reward(1_000, 3_000),
    reward(2_000, 1_000),
    reward(2_000, 2_000),
    reward(2_000, 3_000),
    reward(3_000, 1_000),
    reward(3_000, 2_000),
    reward(3_000, 3_000),
];

pub fn tiers() -> &'static [Reward; TIER_COUNT] {
    &REWARD_TIERS
}

/// Out-of-range indices fail instead of clamping.
pub fn lookup(tier: i64) -> Result<Reward, EngineError> {
    usize::try_from(tier)
        .ok()
        .and_then(|idx| REWARD_TIERS.get(idx).copied())
        .ok_or(EngineError::InvalidTier(tier))
}
