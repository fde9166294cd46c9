pub mod account;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod leaderboard;
pub mod noise;
pub mod rate_limiter;
pub mod reward_table;
pub mod rng;
pub mod session;
pub mod simulation;
