use serde::Serialize;

use crate::config::{AVATAR_ID_MAX, AVATAR_ID_MIN, DEFAULT_ADDRESS};
use crate::reward_table::Reward;
use crate::rng::Rng;

/// One simulated participant. Reward fields only move through
/// `RewardEngine::advance_step`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    address: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(rename = "avatarId")]
    avatar_id: u8,
    experience: u64,
    credits: u64,
    #[serde(rename = "stepsCompleted")]
    steps_completed: u32,
    #[serde(rename = "drawTimestamps")]
    draw_timestamps: Vec<u64>,
}

impl Account {
    pub fn new(address: impl Into<String>, display_name: impl Into<String>, avatar_id: u8) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
            avatar_id: avatar_id.clamp(AVATAR_ID_MIN, AVATAR_ID_MAX),
            experience: 0,
            credits: 0,
            steps_completed: 0,
            draw_timestamps: Vec::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub fn avatar_id(&self) -> u8 {
        self.avatar_id
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn steps_completed(&self) -> u32 {
        self.steps_completed
    }

    pub fn draw_timestamps(&self) -> &[u64] {
        &self.draw_timestamps
    }

    pub fn last_draw_ms(&self) -> Option<u64> {
        self.draw_timestamps.last().copied()
    }

    pub fn score(&self) -> u64 {
        self.experience.saturating_add(self.credits)
    }

    pub(crate) fn push_draw_timestamp(&mut self, now_ms: u64) {
        self.draw_timestamps.push(now_ms);
    }

    pub(crate) fn credit_reward(&mut self, reward: Reward) {
        self.experience = self.experience.saturating_add(reward.experience);
        self.credits = self.credits.saturating_add(reward.credits);
        self.steps_completed += 1;
    }
}

/// `prefix0`, `prefix1`, ... used as placeholder addresses and names.
pub fn placeholder_labels(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|idx| format!("{prefix}{idx}")).collect()
}

pub fn random_avatar_id(rng: &mut Rng) -> u8 {
    rng.int(AVATAR_ID_MIN as i32, AVATAR_ID_MAX as i32) as u8
}

/// Builds `count` fresh accounts. Missing addresses fall back to the zero
/// address and missing names to an empty label.
pub fn create_accounts(
    count: usize,
    addresses: &[String],
    names: &[String],
    rng: &mut Rng,
) -> Vec<Account> {
    (0..count)
        .map(|idx| {
            let address = addresses
                .get(idx)
                .map(String::as_str)
                .unwrap_or(DEFAULT_ADDRESS);
            let name = names.get(idx).map(String::as_str).unwrap_or("");
            Account::new(address, name, random_avatar_id(rng))
        })
        .collect()
}
