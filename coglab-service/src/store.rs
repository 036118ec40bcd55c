//! Repository contract — the population store adapter.
//!
//! The scoring engine reads and writes statistics only through this
//! trait; locking, versioning, and whatever durable backend sits behind
//! it stay at this boundary. `PopulationSnapshot` carries a per-type
//! version counter so a batch rank write can detect a population that
//! moved between snapshot and write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coglab_core::domain::{TestId, TestStatistics, TestType, UserId};

/// The stored row: one completed test's statistics plus its owning
/// test/user identity. Username is denormalized onto the record at
/// completion time so leaderboard queries need no user-store join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub test_id: TestId,
    pub test_type: TestType,
    pub user_id: UserId,
    pub username: String,
    pub completed_at: DateTime<Utc>,
    pub stats: TestStatistics,
}

/// A consistent read of one test type's population.
#[derive(Debug, Clone)]
pub struct PopulationSnapshot {
    pub test_type: TestType,
    /// Incremented by the store on every write to this type's population.
    pub version: u64,
    pub records: Vec<StatisticsRecord>,
}

impl PopulationSnapshot {
    /// Rows that participate in ranking: present, finite average.
    pub fn ranked_rows(&self) -> Vec<(TestId, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.stats.ranking_key().map(|avg| (r.test_id, avg)))
            .collect()
    }

    /// Averages of the ranked rows, in record order.
    pub fn ranked_averages(&self) -> Vec<f64> {
        self.ranked_rows().into_iter().map(|(_, avg)| avg).collect()
    }
}

/// One row of the completed-test-count leaderboard query, in the store's
/// stable order: test count descending, then user id ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub username: String,
    pub test_count: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no statistics recorded for test {0}")]
    NotFound(TestId),

    #[error("statistics for test {0} already exist")]
    DuplicateTest(TestId),

    #[error("population version moved during recomputation: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Abstract statistics store. Implementations must give readers a
/// committed view: a population is observed either before or after a
/// batch write, never mid-write.
pub trait Repository: Send + Sync {
    /// Persist a newly created record. Statistics are created exactly
    /// once per test; a second save of the same test id is an error.
    fn save(&self, record: StatisticsRecord) -> Result<(), StoreError>;

    fn find_by_test(&self, test_id: TestId) -> Result<StatisticsRecord, StoreError>;

    fn find_all_by_type(&self, test_type: TestType) -> Result<PopulationSnapshot, StoreError>;

    /// Atomic batch upsert of one type's records, used by rank
    /// recomputation. Fails with [`StoreError::Conflict`] when the
    /// type's population version no longer equals `expected_version`.
    fn save_all(
        &self,
        test_type: TestType,
        records: &[StatisticsRecord],
        expected_version: u64,
    ) -> Result<(), StoreError>;

    fn count_by_type(&self, test_type: TestType) -> Result<u64, StoreError>;

    fn count_all_completed(&self) -> Result<u64, StoreError>;

    fn count_completed_since(&self, since: DateTime<Utc>) -> Result<u64, StoreError>;

    fn count_completed_by_user(&self, user_id: UserId) -> Result<u64, StoreError>;

    fn count_distinct_users(&self) -> Result<u64, StoreError>;

    /// Number of distinct users with strictly more completed tests than
    /// `user_id` — the independent current-user rank query.
    fn count_users_with_more_tests(&self, user_id: UserId) -> Result<u64, StoreError>;

    /// Top users by completed-test count, at most `limit` rows, in the
    /// store's stable order.
    fn test_count_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, StoreError>;
}
