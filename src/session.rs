use serde::Serialize;

use crate::clock::Clock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Inactive,
    Active,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSession {
    phase: SessionPhase,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "deadlineMs")]
    deadline_ms: u64,
}

impl GameSession {
    pub fn inactive() -> Self {
        Self {
            phase: SessionPhase::Inactive,
            started_at_ms: 0,
            deadline_ms: 0,
        }
    }

    /// Moves an inactive session to `Active` with `deadline = now + lifespan`.
    /// Returns false when the session was already activated.
    pub fn activate(&mut self, now_ms: u64, lifespan_seconds: u64) -> bool {
        if self.phase == SessionPhase::Active {
            return false;
        }
        self.phase = SessionPhase::Active;
        self.started_at_ms = now_ms;
        self.deadline_ms = now_ms.saturating_add(lifespan_seconds.saturating_mul(1_000));
        true
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }
}

pub fn create_session(clock: &impl Clock, lifespan_seconds: u64) -> GameSession {
    let mut session = GameSession::inactive();
    session.activate(clock.now_ms(), lifespan_seconds);
    session
}
