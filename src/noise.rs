use serde::Serialize;

use crate::clock::Clock;
use crate::error::EngineError;
use crate::gate::check_session;
use crate::reward_table::TIER_COUNT;
use crate::rng::Rng;
use crate::session::GameSession;

const SEQUENCE_MIN: i32 = 1;
const SEQUENCE_MAX: i32 = TIER_COUNT as i32;
const MAX_NOISE_INDEX: i64 = TIER_COUNT as i64 - 1;
const NOISE_MODULUS: u64 = 3;

/// Every intermediate value of one tier derivation, kept so callers can
/// inspect how the time noise moved the pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NoiseDraw {
    pub sequence: [u8; TIER_COUNT],
    pub roll: u8,
    pub noise: u8,
    #[serde(rename = "noiseIndex")]
    pub noise_index: i64,
    pub tier: i64,
}

/// Nine distinct values from `1..=9` in draw order. Duplicates are rejected
/// and redrawn, so the loop always terminates with a full permutation.
pub fn random_sequence(
    session: &GameSession,
    clock: &impl Clock,
    rng: &mut Rng,
) -> Result<[u8; TIER_COUNT], EngineError> {
    check_session(session, clock.now_ms())?;
    let mut sequence = [0u8; TIER_COUNT];
    let mut seen = [false; TIER_COUNT];
    let mut filled = 0usize;
    while filled < TIER_COUNT {
        let value = rng.int(SEQUENCE_MIN, SEQUENCE_MAX);
        let slot = (value - SEQUENCE_MIN) as usize;
        if seen[slot] {
            continue;
        }
        seen[slot] = true;
        sequence[filled] = value as u8;
        filled += 1;
    }
    Ok(sequence)
}

pub fn roll(session: &GameSession, clock: &impl Clock, rng: &mut Rng) -> Result<u8, EngineError> {
    check_session(session, clock.now_ms())?;
    Ok(rng.int(SEQUENCE_MIN, SEQUENCE_MAX) as u8)
}

/// `now % 3`, read from the clock at call time.
pub fn noise(session: &GameSession, clock: &impl Clock) -> Result<u8, EngineError> {
    let now_ms = clock.now_ms();
    check_session(session, now_ms)?;
    Ok((now_ms % NOISE_MODULUS) as u8)
}

/// Shifts the zero-based roll up by the noise, or down when that would run
/// past the last slot.
pub fn noise_index(roll: u8, noise: u8) -> i64 {
    let zero_based = roll as i64 - 1;
    let shifted = zero_based + noise as i64;
    if shifted > MAX_NOISE_INDEX {
        zero_based - noise as i64
    } else {
        shifted
    }
}

/// Reads the sequence at `noise_index` and returns it zero-based. An index
/// outside the sequence has no value to read and fails as `InvalidTier`.
pub fn tier_at(sequence: &[u8; TIER_COUNT], noise_index: i64) -> Result<i64, EngineError> {
    usize::try_from(noise_index)
        .ok()
        .and_then(|idx| sequence.get(idx))
        .map(|value| *value as i64 - 1)
        .ok_or(EngineError::InvalidTier(noise_index))
}

pub fn draw(
    session: &GameSession,
    clock: &impl Clock,
    rng: &mut Rng,
) -> Result<NoiseDraw, EngineError> {
    let sequence = random_sequence(session, clock, rng)?;
    let roll = roll(session, clock, rng)?;
    let noise = noise(session, clock)?;
    let noise_index = noise_index(roll, noise);
    let tier = tier_at(&sequence, noise_index)?;
    Ok(NoiseDraw {
        sequence,
        roll,
        noise,
        noise_index,
        tier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::BlockedReason;
    use crate::session::create_session;

    fn active(clock: &ManualClock) -> GameSession {
        create_session(clock, 100)
    }

    #[test]
    fn sequence_is_a_permutation_of_one_to_nine() {
        let clock = ManualClock::new(0);
        let session = active(&clock);
        let mut rng = Rng::new(3);
        for _ in 0..50 {
            let mut sequence = random_sequence(&session, &clock, &mut rng).unwrap();
            sequence.sort_unstable();
            assert_eq!(sequence, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
        }
    }

    #[test]
    fn noise_follows_clock_modulo_three() {
        let clock = ManualClock::new(9_000);
        let session = active(&clock);
        assert_eq!(noise(&session, &clock), Ok(0));
        clock.advance(1);
        assert_eq!(noise(&session, &clock), Ok(1));
        clock.advance(1);
        assert_eq!(noise(&session, &clock), Ok(2));
        clock.advance(1);
        assert_eq!(noise(&session, &clock), Ok(0));
    }

    #[test]
    fn noise_index_shifts_up_then_folds_back() {
        assert_eq!(noise_index(1, 0), 0);
        assert_eq!(noise_index(1, 2), 2);
        assert_eq!(noise_index(7, 2), 8);
        assert_eq!(noise_index(8, 2), 5);
        assert_eq!(noise_index(9, 1), 7);
        assert_eq!(noise_index(9, 2), 6);
        assert_eq!(noise_index(9, 0), 8);
    }

    #[test]
    fn tier_at_reads_sequence_zero_based() {
        let sequence = [5, 3, 9, 1, 2, 4, 6, 7, 8];
        assert_eq!(tier_at(&sequence, 0), Ok(4));
        assert_eq!(tier_at(&sequence, 2), Ok(8));
        assert_eq!(tier_at(&sequence, 8), Ok(7));
        assert_eq!(tier_at(&sequence, -1), Err(EngineError::InvalidTier(-1)));
        assert_eq!(tier_at(&sequence, 9), Err(EngineError::InvalidTier(9)));
    }

    #[test]
    fn draw_is_consistent_with_its_parts() {
        let clock = ManualClock::new(10_000);
        let session = active(&clock);
        let mut rng = Rng::new(99);
        let result = draw(&session, &clock, &mut rng).unwrap();
        assert_eq!(result.noise, 1);
        assert_eq!(result.noise_index, noise_index(result.roll, result.noise));
        assert_eq!(
            result.tier,
            result.sequence[result.noise_index as usize] as i64 - 1
        );
        assert!((0..9).contains(&result.tier));
    }

    #[test]
    fn draw_is_blocked_outside_session() {
        let clock = ManualClock::new(0);
        let mut rng = Rng::new(1);
        assert_eq!(
            draw(&GameSession::inactive(), &clock, &mut rng),
            Err(EngineError::SessionBlocked(BlockedReason::PhaseInactive))
        );

        let session = create_session(&clock, 1);
        clock.set(1_000);
        assert_eq!(
            draw(&session, &clock, &mut rng),
            Err(EngineError::SessionBlocked(BlockedReason::LifespanExpired))
        );
        assert_eq!(
            noise(&session, &clock),
            Err(EngineError::SessionBlocked(BlockedReason::LifespanExpired))
        );
    }

    #[test]
    fn sequence_and_roll_are_gated() {
        let clock = ManualClock::new(0);
        let mut rng = Rng::new(1);
        let inactive = GameSession::inactive();
        assert_eq!(
            random_sequence(&inactive, &clock, &mut rng),
            Err(EngineError::SessionBlocked(BlockedReason::PhaseInactive))
        );
        assert_eq!(
            roll(&inactive, &clock, &mut rng),
            Err(EngineError::SessionBlocked(BlockedReason::PhaseInactive))
        );

        let session = create_session(&clock, 2);
        clock.set(2_000);
        assert_eq!(
            random_sequence(&session, &clock, &mut rng),
            Err(EngineError::SessionBlocked(BlockedReason::LifespanExpired))
        );
        assert_eq!(
            roll(&session, &clock, &mut rng),
            Err(EngineError::SessionBlocked(BlockedReason::LifespanExpired))
        );
    }

    #[test]
    fn noise_index_histogram_is_skewed_and_reproducible() {
        fn histogram(seed: u32) -> [u32; TIER_COUNT] {
            let clock = ManualClock::new(0);
            let session = create_session(&clock, 1_000);
            let mut rng = Rng::new(seed);
            let mut counts = [0u32; TIER_COUNT];
            for _ in 0..3_000 {
                let result = draw(&session, &clock, &mut rng).unwrap();
                counts[result.noise_index as usize] += 1;
                clock.advance(7);
            }
            counts
        }

        let counts = histogram(2024);
        assert_eq!(counts, [97, 231, 328, 327, 335, 451, 472, 439, 320]);
        assert_eq!(counts, histogram(2024));
        assert_eq!(counts.iter().sum::<u32>(), 3_000);

        let min = *counts.iter().min().unwrap();
        let max = *counts.iter().max().unwrap();
        // slot 0 only takes zero noise, the fold-back slots take extra rolls
        assert!(max > min * 2, "expected a skewed histogram, got {counts:?}");
        assert!(counts[0] < counts[5]);
        assert!(counts[1] < counts[6]);
    }
}
