//! coglab Service — scoring orchestration on top of `coglab-core`.
//!
//! This crate builds on the pure engine to provide:
//! - The repository contract (population store adapter) and an in-memory
//!   implementation with versioned, torn-read-free populations
//! - The scoring service: aggregate → rank → persist → recompute, with
//!   per-test-type serialization and conflict retry
//! - Completed-test-count leaderboards
//! - Distribution, per-type, and global reports
//! - JSONL session history and CSV export
//! - TOML service configuration

pub mod config;
pub mod export;
pub mod history;
pub mod leaderboard;
pub mod memory;
pub mod reports;
pub mod scoring;
pub mod store;

pub use coglab_core::aggregate::{aggregate, AggregateError};
pub use config::{ConfigError, ServiceConfig};
pub use export::{write_distribution_csv, write_leaderboard_csv};
pub use history::{HistoryError, SessionHistory};
pub use leaderboard::{
    build_leaderboard, LeaderboardEntry, LeaderboardError, LeaderboardResult, UserRankInfo,
};
pub use memory::InMemoryRepository;
pub use reports::{
    build_distribution, global_stats, type_stats, DistributionMetric, DistributionReport,
    GlobalStats, MetricSummary, ParseMetricError, TestTypeCount, TestTypeStats,
};
pub use scoring::{CompletedTest, ScoredTest, ScoringError, ScoringService};
pub use store::{LeaderboardRow, PopulationSnapshot, Repository, StatisticsRecord, StoreError};
