use serde::Serialize;

pub const DEFAULT_LIFESPAN_SECONDS: u64 = 100;
pub const DEFAULT_STEP_LIMIT: u32 = 3;
pub const DEFAULT_STEP_TIME_LIMIT_SECONDS: u64 = 1;
pub const DEFAULT_ACCOUNT_COUNT: usize = 50;

pub const MAX_LIFESPAN_SECONDS: u64 = 24 * 60 * 60;
pub const MAX_STEP_LIMIT: u32 = 1_000;
pub const MAX_STEP_TIME_LIMIT_SECONDS: u64 = 60 * 60;
pub const MAX_ACCOUNT_COUNT: usize = 1_000;

pub const AVATAR_ID_MIN: u8 = 1;
pub const AVATAR_ID_MAX: u8 = 4;

pub const DEFAULT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const ADDRESS_PREFIX: &str = "0xAddress";
pub const NAME_PREFIX: &str = "User";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    #[serde(rename = "lifespanSeconds")]
    pub lifespan_seconds: u64,
    #[serde(rename = "stepLimit")]
    pub step_limit: u32,
    #[serde(rename = "stepTimeLimitSeconds")]
    pub step_time_limit_seconds: u64,
    #[serde(rename = "accountCount")]
    pub account_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lifespan_seconds: DEFAULT_LIFESPAN_SECONDS,
            step_limit: DEFAULT_STEP_LIMIT,
            step_time_limit_seconds: DEFAULT_STEP_TIME_LIMIT_SECONDS,
            account_count: DEFAULT_ACCOUNT_COUNT,
        }
    }
}

impl EngineConfig {
    pub fn lifespan_ms(&self) -> u64 {
        self.lifespan_seconds.saturating_mul(1_000)
    }

    pub fn step_time_limit_ms(&self) -> u64 {
        self.step_time_limit_seconds.saturating_mul(1_000)
    }

    pub fn normalized(self) -> Self {
        Self {
            lifespan_seconds: self.lifespan_seconds.min(MAX_LIFESPAN_SECONDS),
            step_limit: self.step_limit.min(MAX_STEP_LIMIT),
            step_time_limit_seconds: self
                .step_time_limit_seconds
                .min(MAX_STEP_TIME_LIMIT_SECONDS),
            account_count: self.account_count.min(MAX_ACCOUNT_COUNT),
        }
    }
}
