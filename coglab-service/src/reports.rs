//! Population reports — distributions, per-type summaries, global totals.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use coglab_core::distribution::{
    accuracy_distribution, reaction_time_distribution, DistributionBucket,
};
use coglab_core::domain::{TestStatistics, TestType};

use crate::store::{Repository, StoreError};

/// Which statistic a distribution buckets over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionMetric {
    ReactionTime,
    Accuracy,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown distribution metric '{0}' (expected 'reaction-time' or 'accuracy')")]
pub struct ParseMetricError(pub String);

impl FromStr for DistributionMetric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "reaction-time" | "rt" => Ok(DistributionMetric::ReactionTime),
            "accuracy" => Ok(DistributionMetric::Accuracy),
            _ => Err(ParseMetricError(s.to_string())),
        }
    }
}

/// Histogram of one test type's population for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub test_type: TestType,
    pub test_name: String,
    /// All statistics rows of the type, including those excluded from
    /// the buckets for lacking the metric.
    pub total_tests: u64,
    pub metric: DistributionMetric,
    pub buckets: Vec<DistributionBucket>,
}

/// Mean/min/max over the present values of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    fn over(values: impl Iterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, min, max })
    }
}

/// Per-type population summary with both distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTypeStats {
    pub test_type: TestType,
    pub test_name: String,
    pub total_tests: u64,
    /// Absent when no test of the type has timed trials.
    pub reaction_time: Option<MetricSummary>,
    /// Absent when the population is empty.
    pub accuracy: Option<MetricSummary>,
    pub reaction_time_distribution: Vec<DistributionBucket>,
    pub accuracy_distribution: Vec<DistributionBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestTypeCount {
    pub test_type: TestType,
    pub test_name: String,
    pub count: u64,
}

/// Site-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_users: u64,
    pub total_tests: u64,
    /// Completions since the start of the reference instant's UTC day.
    pub total_tests_today: u64,
    pub test_type_counts: Vec<TestTypeCount>,
}

/// Bucket one test type's population over the requested metric.
pub fn build_distribution<R: Repository>(
    repo: &R,
    test_type: TestType,
    metric: DistributionMetric,
) -> Result<DistributionReport, StoreError> {
    let snapshot = repo.find_all_by_type(test_type)?;
    let stats: Vec<TestStatistics> = snapshot.records.iter().map(|r| r.stats.clone()).collect();
    let buckets = match metric {
        DistributionMetric::ReactionTime => reaction_time_distribution(&stats),
        DistributionMetric::Accuracy => accuracy_distribution(&stats),
    };
    Ok(DistributionReport {
        test_type,
        test_name: test_type.display_name().to_string(),
        total_tests: snapshot.records.len() as u64,
        metric,
        buckets,
    })
}

/// Summarize one test type's population.
pub fn type_stats<R: Repository>(
    repo: &R,
    test_type: TestType,
) -> Result<TestTypeStats, StoreError> {
    let snapshot = repo.find_all_by_type(test_type)?;
    let stats: Vec<TestStatistics> = snapshot.records.iter().map(|r| r.stats.clone()).collect();

    Ok(TestTypeStats {
        test_type,
        test_name: test_type.display_name().to_string(),
        total_tests: stats.len() as u64,
        reaction_time: MetricSummary::over(stats.iter().filter_map(|s| s.avg_reaction_time_ms)),
        accuracy: MetricSummary::over(stats.iter().map(|s| s.accuracy_rate)),
        reaction_time_distribution: reaction_time_distribution(&stats),
        accuracy_distribution: accuracy_distribution(&stats),
    })
}

/// Site-wide totals as of `now`.
pub fn global_stats<R: Repository>(repo: &R, now: DateTime<Utc>) -> Result<GlobalStats, StoreError> {
    let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();

    let mut test_type_counts = Vec::with_capacity(TestType::COUNT);
    for test_type in TestType::ALL {
        test_type_counts.push(TestTypeCount {
            test_type,
            test_name: test_type.display_name().to_string(),
            count: repo.count_by_type(test_type)?,
        });
    }

    Ok(GlobalStats {
        total_users: repo.count_distinct_users()?,
        total_tests: repo.count_all_completed()?,
        total_tests_today: repo.count_completed_since(start_of_day)?,
        test_type_counts,
    })
}
