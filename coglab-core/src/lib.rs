//! coglab Core — domain types, trial aggregation, percentile ranking,
//! distributions.
//!
//! This crate contains the scoring engine's pure heart:
//! - Domain types (test types, trial observations, derived statistics)
//! - Trial aggregator: ordered observations → one statistics record
//! - Percentile ranking: strict-greater population rank with an
//!   order-statistics fast path
//! - Distribution builder: fixed half-open histogram buckets for
//!   reaction time and accuracy
//!
//! Nothing here touches a store or a lock; persistence and population
//! recomputation live in `coglab-service`.

pub mod aggregate;
pub mod distribution;
pub mod domain;
pub mod ranking;

pub use aggregate::{aggregate, AggregateError};
pub use distribution::{accuracy_distribution, reaction_time_distribution, DistributionBucket};
pub use ranking::{compute_ranks, percentile_rank, RankTable, NEUTRAL_RANK};
