//! Histogram distributions over a population's statistics.
//!
//! Two fixed bucket tables — average reaction time and accuracy — share
//! one half-open-interval histogram. A value lands in the first interval
//! `[lower, upper)` that admits it, scanning bounds ascending, so edges
//! belong to the lower bucket. Records with an absent metric are excluded
//! from the total and from every bucket.

use serde::{Deserialize, Serialize};

use crate::domain::TestStatistics;

/// One histogram bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub label: String,
    pub count: u64,
    /// `round(100 * count / total, 1)` — 0.0 for every bucket of an empty
    /// population.
    pub percentage: f64,
}

const REACTION_TIME_BOUNDS: [f64; 8] =
    [0.0, 200.0, 250.0, 300.0, 350.0, 400.0, 500.0, f64::INFINITY];
const REACTION_TIME_LABELS: [&str; 7] = [
    "<200ms",
    "200-250ms",
    "250-300ms",
    "300-350ms",
    "350-400ms",
    "400-500ms",
    ">500ms",
];

// The 1.01 upper bound deliberately admits an exact 1.0 accuracy into the
// top bucket.
const ACCURACY_BOUNDS: [f64; 7] = [0.0, 0.5, 0.6, 0.7, 0.8, 0.9, 1.01];
const ACCURACY_LABELS: [&str; 6] = ["<50%", "50-60%", "60-70%", "70-80%", "80-90%", "90-100%"];

/// Bucket a population by average reaction time (ms). Tests with no timed
/// trials are excluded.
pub fn reaction_time_distribution(stats: &[TestStatistics]) -> Vec<DistributionBucket> {
    histogram(
        stats.iter().map(|s| s.avg_reaction_time_ms),
        &REACTION_TIME_BOUNDS,
        &REACTION_TIME_LABELS,
    )
}

/// Bucket a population by accuracy rate (fraction of correct trials).
pub fn accuracy_distribution(stats: &[TestStatistics]) -> Vec<DistributionBucket> {
    histogram(
        stats.iter().map(|s| Some(s.accuracy_rate)),
        &ACCURACY_BOUNDS,
        &ACCURACY_LABELS,
    )
}

fn histogram<I>(values: I, bounds: &[f64], labels: &[&str]) -> Vec<DistributionBucket>
where
    I: IntoIterator<Item = Option<f64>>,
{
    debug_assert_eq!(bounds.len(), labels.len() + 1);

    let mut counts = vec![0u64; labels.len()];
    let mut total = 0u64;
    for value in values {
        let Some(v) = value else { continue };
        if !v.is_finite() {
            continue;
        }
        total += 1;
        for i in 0..labels.len() {
            if v >= bounds[i] && v < bounds[i + 1] {
                counts[i] += 1;
                break;
            }
        }
    }

    labels
        .iter()
        .zip(counts)
        .map(|(label, count)| {
            let percentage = if total > 0 {
                round_one_decimal(count as f64 * 100.0 / total as f64)
            } else {
                0.0
            };
            DistributionBucket {
                label: (*label).to_string(),
                count,
                percentage,
            }
        })
        .collect()
}

fn round_one_decimal(p: f64) -> f64 {
    (p * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(avg: Option<f64>, accuracy: f64) -> TestStatistics {
        TestStatistics {
            total_trials: 10,
            correct_trials: (accuracy * 10.0) as u32,
            accuracy_rate: accuracy,
            avg_reaction_time_ms: avg,
            median_reaction_time_ms: avg,
            std_deviation_ms: avg.map(|_| 12.0),
            fastest_ms: avg.map(|a| a as u32),
            slowest_ms: avg.map(|a| a as u32),
            percentile_rank: None,
        }
    }

    /// Ten tests spread across the documented boundaries.
    #[test]
    fn reaction_time_buckets_cover_a_spread_population() {
        let avgs = [190.0, 210.0, 260.0, 310.0, 360.0, 410.0, 510.0, 195.0, 240.0, 290.0];
        let stats: Vec<TestStatistics> = avgs.iter().map(|&a| stats_with(Some(a), 0.9)).collect();

        let buckets = reaction_time_distribution(&stats);
        let counts: Vec<u64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 2, 1, 1, 1, 1]);
        assert_eq!(counts.iter().sum::<u64>(), 10);

        let pct_sum: f64 = buckets.iter().map(|b| b.percentage).sum();
        assert!((pct_sum - 100.0).abs() <= 0.7, "sum = {pct_sum}");
    }

    #[test]
    fn boundary_values_belong_to_the_lower_bucket() {
        // 200 is the lower edge of 200-250ms, 500 the lower edge of >500ms's
        // predecessor: [400,500) excludes it, so 500 lands in >500ms.
        let stats = vec![stats_with(Some(200.0), 0.9), stats_with(Some(500.0), 0.9)];
        let buckets = reaction_time_distribution(&stats);
        assert_eq!(buckets[1].count, 1); // 200-250ms
        assert_eq!(buckets[6].count, 1); // >500ms
        assert_eq!(buckets[0].count, 0);
    }

    #[test]
    fn absent_averages_are_excluded_from_total_and_buckets() {
        let stats = vec![
            stats_with(None, 0.8),
            stats_with(Some(220.0), 0.8),
            stats_with(None, 0.8),
        ];
        let buckets = reaction_time_distribution(&stats);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 1);
        assert_eq!(buckets[1].percentage, 100.0);
    }

    #[test]
    fn perfect_accuracy_lands_in_top_bucket() {
        let stats = vec![stats_with(Some(250.0), 1.0)];
        let buckets = accuracy_distribution(&stats);
        assert_eq!(buckets[5].count, 1);
        assert_eq!(buckets[5].percentage, 100.0);
    }

    #[test]
    fn accuracy_buckets_split_on_tenths() {
        let accuracies = [0.45, 0.5, 0.55, 0.65, 0.75, 0.85, 0.95];
        let stats: Vec<TestStatistics> =
            accuracies.iter().map(|&a| stats_with(Some(250.0), a)).collect();
        let buckets = accuracy_distribution(&stats);
        let counts: Vec<u64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn empty_population_yields_zeroed_buckets() {
        let buckets = reaction_time_distribution(&[]);
        assert_eq!(buckets.len(), 7);
        for b in &buckets {
            assert_eq!(b.count, 0);
            assert_eq!(b.percentage, 0.0);
        }
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        // 1 of 3 → 33.333… → 33.3
        let stats = vec![
            stats_with(Some(190.0), 0.9),
            stats_with(Some(210.0), 0.9),
            stats_with(Some(260.0), 0.9),
        ];
        let buckets = reaction_time_distribution(&stats);
        assert_eq!(buckets[0].percentage, 33.3);
    }
}
