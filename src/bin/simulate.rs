use clap::Parser;
use gcg_reward_sim::clock::{Clock, ManualClock, SystemClock};
use gcg_reward_sim::config::{
    EngineConfig, DEFAULT_ACCOUNT_COUNT, DEFAULT_LIFESPAN_SECONDS, DEFAULT_STEP_LIMIT,
    DEFAULT_STEP_TIME_LIMIT_SECONDS,
};
use gcg_reward_sim::engine::StepResult;
use gcg_reward_sim::error::EngineError;
use gcg_reward_sim::leaderboard::LeaderboardEntry;
use gcg_reward_sim::reward_table::TIER_COUNT;
use gcg_reward_sim::rng::Rng;
use gcg_reward_sim::simulation::Simulation;
use serde::Serialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    accounts: Option<usize>,
    #[arg(long)]
    lifespan: Option<u64>,
    #[arg(long)]
    step_limit: Option<u32>,
    #[arg(long)]
    step_interval: Option<u64>,
    /// Simulated milliseconds between rounds.
    #[arg(long, default_value_t = 1_000)]
    tick_ms: u64,
    #[arg(long, default_value_t = 1_000)]
    max_rounds: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    top: Option<usize>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum StopReason {
    Exhausted,
    Expired,
    RoundCap,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
struct RoundTally {
    advanced: usize,
    rejected: usize,
    #[serde(rename = "stepLimited")]
    step_limited: usize,
    blocked: usize,
    #[serde(rename = "invalidTiers")]
    invalid_tiers: usize,
}

impl RoundTally {
    fn absorb(&mut self, other: &RoundTally) {
        self.advanced += other.advanced;
        self.rejected += other.rejected;
        self.step_limited += other.step_limited;
        self.blocked += other.blocked;
        self.invalid_tiers += other.invalid_tiers;
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    seed: u32,
    config: EngineConfig,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    rounds: u32,
    #[serde(rename = "stopReason")]
    stop_reason: StopReason,
    totals: RoundTally,
    #[serde(rename = "tierHistogram")]
    tier_histogram: [u32; TIER_COUNT],
    #[serde(rename = "noiseIndexHistogram")]
    noise_index_histogram: [u32; TIER_COUNT],
    leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    round: Option<u32>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    let started_at_ms = SystemClock.now_ms();
    let seed = normalize_seed(cli.seed.unwrap_or(started_at_ms));
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, started_at_ms));

    let clock = ManualClock::new(started_at_ms);
    let mut sim = Simulation::new(config, clock.clone(), Rng::new(seed));

    emit_log(
        "info",
        "run_started",
        &run_id,
        None,
        json!({
            "seed": seed,
            "config": sim.config(),
            "tickMs": cli.tick_ms,
            "maxRounds": cli.max_rounds,
        }),
    );

    let mut totals = RoundTally::default();
    let mut tier_histogram = [0u32; TIER_COUNT];
    let mut noise_index_histogram = [0u32; TIER_COUNT];
    let mut rounds = 0u32;
    let mut stop_reason = StopReason::RoundCap;

    while rounds < cli.max_rounds {
        if sim.all_accounts_exhausted() {
            stop_reason = StopReason::Exhausted;
            break;
        }
        if !sim.is_session_valid() {
            stop_reason = StopReason::Expired;
            break;
        }

        let results = sim.advance_all();
        let tally = tally_round(&results);
        for outcome in results
            .iter()
            .filter_map(|result| result.as_ref().ok().and_then(StepResult::outcome))
        {
            bump(&mut tier_histogram, outcome.tier);
            bump(&mut noise_index_histogram, outcome.draw.noise_index);
        }
        for error in results.iter().filter_map(|result| result.as_ref().err()) {
            if let EngineError::InvalidTier(index) = error {
                emit_log(
                    "warn",
                    "invalid_tier",
                    &run_id,
                    Some(rounds),
                    json!({ "noiseIndex": index }),
                );
            }
        }

        emit_log(
            "info",
            "round_finished",
            &run_id,
            Some(rounds),
            json!({
                "tally": tally,
                "sessionRemainingMs": sim.session_remaining_ms(),
            }),
        );
        totals.absorb(&tally);
        rounds += 1;
        clock.advance(cli.tick_ms);
    }

    let summary = RunSummary {
        run_id: run_id.clone(),
        seed,
        config: *sim.config(),
        started_at_ms,
        finished_at_ms: SystemClock.now_ms(),
        rounds,
        stop_reason,
        totals,
        tier_histogram,
        noise_index_histogram,
        leaderboard: sim.leaderboard(cli.top),
    };

    println!(
        "{}",
        serde_json::to_string(&summary).expect("run summary should serialize")
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        json!({
            "rounds": summary.rounds,
            "stopReason": summary.stop_reason,
            "totals": summary.totals,
            "summaryOut": summary_out_written,
        }),
    );

    if summary.totals.invalid_tiers > 0 {
        std::process::exit(1);
    }
}

fn resolve_config(cli: &Cli) -> EngineConfig {
    EngineConfig {
        lifespan_seconds: cli.lifespan.unwrap_or(DEFAULT_LIFESPAN_SECONDS),
        step_limit: cli.step_limit.unwrap_or(DEFAULT_STEP_LIMIT),
        step_time_limit_seconds: cli.step_interval.unwrap_or(DEFAULT_STEP_TIME_LIMIT_SECONDS),
        account_count: cli.accounts.unwrap_or(DEFAULT_ACCOUNT_COUNT),
    }
    .normalized()
}

fn tally_round(results: &[Result<StepResult, EngineError>]) -> RoundTally {
    let mut tally = RoundTally::default();
    for result in results {
        match result {
            Ok(StepResult::Advanced(_)) => tally.advanced += 1,
            Ok(StepResult::Rejected(_)) => tally.rejected += 1,
            Err(EngineError::StepLimitReached { .. }) => tally.step_limited += 1,
            Err(EngineError::SessionBlocked(_)) => tally.blocked += 1,
            Err(EngineError::InvalidTier(_)) => tally.invalid_tiers += 1,
            Err(EngineError::UnknownAccount(_)) => {}
        }
    }
    tally
}

fn bump(histogram: &mut [u32; TIER_COUNT], index: i64) {
    if let Some(slot) = usize::try_from(index)
        .ok()
        .and_then(|idx| histogram.get_mut(idx))
    {
        *slot += 1;
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn emit_log(level: &str, event: &str, run_id: &str, round: Option<u32>, details: Value) {
    let log_line = StructuredLogLine {
        timestamp_ms: SystemClock.now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        round,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
