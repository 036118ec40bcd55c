//! In-memory repository — one `RwLock` over the full store state.
//!
//! A single lock means a reader always sees a committed population, never
//! one with half its ranks rewritten. Per-type version counters are
//! bumped on every write so `save_all` can detect a population that
//! moved between snapshot and batch update.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use coglab_core::domain::{TestId, TestType, UserId};

use crate::store::{LeaderboardRow, PopulationSnapshot, Repository, StatisticsRecord, StoreError};

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<TestId, StatisticsRecord>,
    versions: [u64; TestType::COUNT],
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }
}

impl State {
    fn user_test_counts(&self) -> BTreeMap<UserId, (String, u64)> {
        let mut counts: BTreeMap<UserId, (String, u64)> = BTreeMap::new();
        for record in self.records.values() {
            let entry = counts
                .entry(record.user_id)
                .or_insert_with(|| (record.username.clone(), 0));
            entry.1 += 1;
        }
        counts
    }
}

impl Repository for InMemoryRepository {
    fn save(&self, record: StatisticsRecord) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.records.contains_key(&record.test_id) {
            return Err(StoreError::DuplicateTest(record.test_id));
        }
        state.versions[record.test_type.index()] += 1;
        state.records.insert(record.test_id, record);
        Ok(())
    }

    fn find_by_test(&self, test_id: TestId) -> Result<StatisticsRecord, StoreError> {
        self.read()?
            .records
            .get(&test_id)
            .cloned()
            .ok_or(StoreError::NotFound(test_id))
    }

    fn find_all_by_type(&self, test_type: TestType) -> Result<PopulationSnapshot, StoreError> {
        let state = self.read()?;
        let records = state
            .records
            .values()
            .filter(|r| r.test_type == test_type)
            .cloned()
            .collect();
        Ok(PopulationSnapshot {
            test_type,
            version: state.versions[test_type.index()],
            records,
        })
    }

    fn save_all(
        &self,
        test_type: TestType,
        records: &[StatisticsRecord],
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let found = state.versions[test_type.index()];
        if found != expected_version {
            return Err(StoreError::Conflict {
                expected: expected_version,
                found,
            });
        }
        for record in records {
            state.records.insert(record.test_id, record.clone());
        }
        state.versions[test_type.index()] += 1;
        Ok(())
    }

    fn count_by_type(&self, test_type: TestType) -> Result<u64, StoreError> {
        let state = self.read()?;
        Ok(state
            .records
            .values()
            .filter(|r| r.test_type == test_type)
            .count() as u64)
    }

    fn count_all_completed(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.records.len() as u64)
    }

    fn count_completed_since(&self, since: DateTime<Utc>) -> Result<u64, StoreError> {
        let state = self.read()?;
        Ok(state
            .records
            .values()
            .filter(|r| r.completed_at >= since)
            .count() as u64)
    }

    fn count_completed_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        let state = self.read()?;
        Ok(state
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .count() as u64)
    }

    fn count_distinct_users(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.user_test_counts().len() as u64)
    }

    fn count_users_with_more_tests(&self, user_id: UserId) -> Result<u64, StoreError> {
        let state = self.read()?;
        let counts = state.user_test_counts();
        let own = counts.get(&user_id).map_or(0, |(_, n)| *n);
        Ok(counts
            .iter()
            .filter(|&(id, &(_, n))| *id != user_id && n > own)
            .count() as u64)
    }

    fn test_count_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardRow>, StoreError> {
        let state = self.read()?;
        let mut rows: Vec<LeaderboardRow> = state
            .user_test_counts()
            .into_iter()
            .map(|(user_id, (username, test_count))| LeaderboardRow {
                user_id,
                username,
                test_count,
            })
            .collect();
        // Stable order: count descending, then user id ascending.
        rows.sort_by(|a, b| b.test_count.cmp(&a.test_count).then(a.user_id.cmp(&b.user_id)));
        rows.truncate(limit);
        Ok(rows)
    }
}
