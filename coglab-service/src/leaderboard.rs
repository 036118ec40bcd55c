//! Completed-test-count leaderboard.
//!
//! Ranks are assigned by output position — ties stay distinct, in the
//! store's stable order — and the requesting user's own rank is computed
//! independently (`1 +` the number of users with strictly more completed
//! tests), so it is correct even when they fall outside the page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coglab_core::domain::UserId;

use crate::store::{Repository, StoreError};

/// A single displayed leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the page.
    pub rank: u32,
    pub username: String,
    pub test_count: u64,
}

/// The requesting user's own standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRankInfo {
    pub rank: u32,
    pub test_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardResult {
    pub rankings: Vec<LeaderboardEntry>,
    /// Distinct users with at least one completed test.
    pub total_users: u64,
    pub current_user: Option<UserRankInfo>,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard limit must be positive")]
    ZeroLimit,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build the top-`limit` leaderboard, with the current user's independent
/// standing when requested.
pub fn build_leaderboard<R: Repository>(
    repo: &R,
    limit: usize,
    current_user: Option<UserId>,
) -> Result<LeaderboardResult, LeaderboardError> {
    if limit == 0 {
        return Err(LeaderboardError::ZeroLimit);
    }

    let rankings = repo
        .test_count_leaderboard(limit)?
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i as u32 + 1,
            username: row.username,
            test_count: row.test_count,
        })
        .collect();

    let total_users = repo.count_distinct_users()?;

    let current_user = match current_user {
        Some(user_id) => {
            let test_count = repo.count_completed_by_user(user_id)?;
            let better = repo.count_users_with_more_tests(user_id)?;
            Some(UserRankInfo {
                rank: better as u32 + 1,
                test_count,
            })
        }
        None => None,
    };

    Ok(LeaderboardResult {
        rankings,
        total_users,
        current_user,
    })
}
