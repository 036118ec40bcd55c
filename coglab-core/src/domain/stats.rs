use serde::{Deserialize, Serialize};

/// Derived statistics for one completed test, one-to-one with the test
/// that produced them.
///
/// The five reaction-time fields are `None` exactly when the test's timed
/// subset (trials with a present, strictly positive reaction time) is
/// empty. `percentile_rank` is the only field mutated after creation: the
/// ranking engine assigns it at insertion and rewrites it on every
/// recomputation of the type's population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStatistics {
    pub total_trials: u32,
    pub correct_trials: u32,
    /// `correct_trials / total_trials`, in [0, 1].
    pub accuracy_rate: f64,
    pub avg_reaction_time_ms: Option<f64>,
    pub median_reaction_time_ms: Option<f64>,
    /// Population standard deviation (no Bessel correction).
    pub std_deviation_ms: Option<f64>,
    pub fastest_ms: Option<u32>,
    pub slowest_ms: Option<u32>,
    /// Percentage of the type's ranked population strictly slower than
    /// this test, in [0, 100]. Absent while unranked and for tests with
    /// an empty timed subset — absence is not zero.
    pub percentile_rank: Option<f64>,
}

impl TestStatistics {
    /// Average used as the ranking key, if this record participates in
    /// ranking at all (present and finite).
    pub fn ranking_key(&self) -> Option<f64> {
        self.avg_reaction_time_ms.filter(|avg| avg.is_finite())
    }
}

/// Human-readable band for a percentile rank, shown alongside results.
pub fn rank_description(percentile: Option<f64>) -> String {
    let Some(p) = percentile else {
        return "No rank yet".to_string();
    };
    let band = if p >= 90.0 {
        "Excellent! Better"
    } else if p >= 70.0 {
        "Good! Better"
    } else if p >= 50.0 {
        "Average, better"
    } else if p >= 30.0 {
        "Room for improvement, better"
    } else {
        "Needs more practice, better"
    };
    format!("{band} than {p:.1}% of users")
}
