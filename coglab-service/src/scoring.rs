//! Scoring pipeline — aggregate a completed test, rank it against its
//! type's population, persist it, and keep the whole population's ranks
//! consistent.
//!
//! Completions of the same test type are a write-write race on the shared
//! population, so they serialize on a per-type mutex; completions of
//! different types do not contend. The store's version check is the
//! second line of defense: if the population still moves between snapshot
//! and batch write (an external writer), the recomputation retries once
//! with a fresh snapshot before surfacing a conflict.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;

use coglab_core::aggregate::{aggregate, AggregateError};
use coglab_core::domain::{rank_description, TestId, TestType, TrialObservation, UserId};
use coglab_core::ranking::{compute_ranks, percentile_rank};

use crate::config::ServiceConfig;
use crate::history::{HistoryError, SessionHistory};
use crate::store::{Repository, StatisticsRecord, StoreError};

/// A finalized test handed over by the test lifecycle service. Ownership
/// and status transitions were validated upstream; by the time this
/// reaches the scoring service the trials are the complete, ordered
/// record of one completed test.
#[derive(Debug, Clone)]
pub struct CompletedTest {
    pub test_id: TestId,
    pub test_type: TestType,
    pub user_id: UserId,
    pub username: String,
    pub completed_at: DateTime<Utc>,
    pub trials: Vec<TrialObservation>,
}

/// Outcome of scoring one completed test.
#[derive(Debug, Clone)]
pub struct ScoredTest {
    pub record: StatisticsRecord,
    /// Human-readable band for the final percentile rank.
    pub rank_description: String,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Malformed trial input, rejected before any persistence.
    #[error("invalid trial input: {0}")]
    InvalidInput(#[from] AggregateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// The population kept moving underneath the recomputation even after
    /// the configured retries.
    #[error("population for {test_type} kept moving during rank recomputation ({attempts} attempts)")]
    ConflictExhausted { test_type: TestType, attempts: u32 },
}

/// Orchestrates completion scoring against a repository.
pub struct ScoringService<R: Repository> {
    repo: Arc<R>,
    type_locks: [Mutex<()>; TestType::COUNT],
    max_conflict_retries: u32,
    history: Option<SessionHistory>,
}

impl<R: Repository> ScoringService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_config(repo, &ServiceConfig::default())
    }

    pub fn with_config(repo: Arc<R>, config: &ServiceConfig) -> Self {
        Self {
            repo,
            type_locks: std::array::from_fn(|_| Mutex::new(())),
            max_conflict_retries: config.max_conflict_retries,
            history: config.history_path.clone().map(SessionHistory::new),
        }
    }

    /// Append every scored record to a JSONL session history.
    pub fn with_history(mut self, history: SessionHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Rank an average against the current population of `test_type`
    /// (the percentage strictly slower; neutral 50.0 when the population
    /// is empty).
    pub fn rank_of(&self, test_type: TestType, avg_ms: f64) -> Result<f64, ScoringError> {
        let snapshot = self.repo.find_all_by_type(test_type)?;
        Ok(percentile_rank(&snapshot.ranked_averages(), avg_ms))
    }

    /// Score one completed test: aggregate its trials, then rank and
    /// persist the resulting record.
    pub fn complete_test(&self, completed: CompletedTest) -> Result<ScoredTest, ScoringError> {
        // Aggregation failures reject the request before anything is
        // persisted.
        let stats = aggregate(&completed.trials)?;
        let record = StatisticsRecord {
            test_id: completed.test_id,
            test_type: completed.test_type,
            user_id: completed.user_id,
            username: completed.username,
            completed_at: completed.completed_at,
            stats,
        };
        self.rank_and_persist(record)
    }

    /// Persist a freshly aggregated record and bring the whole type
    /// population's ranks up to date with it.
    ///
    /// The insertion-time rank is computed against the pre-insertion
    /// population (neutral 50.0 for a first entry, nothing for a record
    /// with no timed trials); the post-insertion recomputation then
    /// overwrites every ranked row, including this one.
    pub fn rank_and_persist(&self, record: StatisticsRecord) -> Result<ScoredTest, ScoringError> {
        let test_type = record.test_type;
        // A poisoned lock only means a previous completion panicked; the
        // store's version check still guards population consistency.
        let _serial = self.type_locks[test_type.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut record = record;
        if let Some(avg) = record.stats.ranking_key() {
            record.stats.percentile_rank = Some(self.rank_of(test_type, avg)?);
        }
        self.repo.save(record.clone())?;

        if record.stats.ranking_key().is_some() {
            if let Some(rank) = self.recompute_all(test_type, record.test_id)? {
                record.stats.percentile_rank = Some(rank);
            }
        }

        if let Some(history) = &self.history {
            history.append(&record)?;
        }

        Ok(ScoredTest {
            rank_description: rank_description(record.stats.percentile_rank),
            record,
        })
    }

    /// Re-rank every present-average row of `test_type` against the
    /// post-insertion population. Returns the inserted record's new rank,
    /// or `None` when the ranked population has fewer than two rows (a
    /// lone entry keeps its neutral 50.0).
    fn recompute_all(
        &self,
        test_type: TestType,
        inserted: TestId,
    ) -> Result<Option<f64>, ScoringError> {
        let attempts = self.max_conflict_retries + 1;
        for _ in 0..attempts {
            let snapshot = self.repo.find_all_by_type(test_type)?;
            let rows = snapshot.ranked_rows();
            if rows.len() <= 1 {
                return Ok(None);
            }

            let ranks: std::collections::HashMap<TestId, f64> =
                compute_ranks(&rows).into_iter().collect();

            let mut records = snapshot.records;
            let mut inserted_rank = None;
            for rec in &mut records {
                if let Some(&rank) = ranks.get(&rec.test_id) {
                    rec.stats.percentile_rank = Some(rank);
                    if rec.test_id == inserted {
                        inserted_rank = Some(rank);
                    }
                }
            }

            match self.repo.save_all(test_type, &records, snapshot.version) {
                Ok(()) => return Ok(inserted_rank),
                // Fresh snapshot on the next pass; this is the only
                // condition that warrants an automatic retry.
                Err(StoreError::Conflict { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ScoringError::ConflictExhausted {
            test_type,
            attempts,
        })
    }
}
