use std::fmt;

use serde::Serialize;

/// Which half of the session check closed the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockedReason {
    PhaseInactive,
    LifespanExpired,
}

impl BlockedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhaseInactive => "phase_inactive",
            Self::LifespanExpired => "lifespan_expired",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    SessionBlocked(BlockedReason),
    StepLimitReached { steps_completed: u32, step_limit: u32 },
    InvalidTier(i64),
    UnknownAccount(usize),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionBlocked(_) => "session_blocked",
            Self::StepLimitReached { .. } => "step_limit_reached",
            Self::InvalidTier(_) => "invalid_tier",
            Self::UnknownAccount(_) => "unknown_account",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionBlocked(reason) => write!(f, "session blocked: {}", reason.as_str()),
            Self::StepLimitReached {
                steps_completed,
                step_limit,
            } => write!(f, "step limit reached: {steps_completed}/{step_limit}"),
            Self::InvalidTier(index) => write!(f, "tier index out of table range: {index}"),
            Self::UnknownAccount(index) => write!(f, "no account at index {index}"),
        }
    }
}

impl std::error::Error for EngineError {}
