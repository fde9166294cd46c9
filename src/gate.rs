use crate::account::Account;
use crate::error::{BlockedReason, EngineError};
use crate::session::{GameSession, SessionPhase};

pub fn is_session_valid(session: &GameSession, now_ms: u64) -> bool {
    check_session(session, now_ms).is_ok()
}

/// Phase is checked before lifespan, so an inactive session always reports
/// `PhaseInactive` whatever its deadline.
pub fn check_session(session: &GameSession, now_ms: u64) -> Result<(), EngineError> {
    if session.phase() != SessionPhase::Active {
        return Err(EngineError::SessionBlocked(BlockedReason::PhaseInactive));
    }
    if now_ms >= session.deadline_ms() {
        return Err(EngineError::SessionBlocked(BlockedReason::LifespanExpired));
    }
    Ok(())
}

pub fn is_account_eligible(
    session: &GameSession,
    account: &Account,
    step_limit: u32,
    now_ms: u64,
) -> bool {
    check_account(session, account, step_limit, now_ms).is_ok()
}

pub fn check_account(
    session: &GameSession,
    account: &Account,
    step_limit: u32,
    now_ms: u64,
) -> Result<(), EngineError> {
    check_session(session, now_ms)?;
    if account.steps_completed() >= step_limit {
        return Err(EngineError::StepLimitReached {
            steps_completed: account.steps_completed(),
            step_limit,
        });
    }
    Ok(())
}
