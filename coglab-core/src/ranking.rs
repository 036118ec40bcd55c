//! Percentile ranking — population-relative rank of a test's average
//! reaction time.
//!
//! A test's rank is the percentage of its type's ranked population with a
//! strictly greater (slower) average; ties count for neither side, so two
//! equal averages share a rank without boosting each other. Higher rank =
//! faster = better. A first-ever entry, ranked against an empty
//! population, gets the neutral 50.0.

use crate::domain::TestId;

/// Rank assigned when the reference population is empty.
pub const NEUTRAL_RANK: f64 = 50.0;

/// Brute-force definition: percentage of `population` strictly slower
/// than `avg_ms`.
///
/// This is the semantic reference. [`RankTable`] exists to answer the
/// same question faster and must agree with this function exactly.
pub fn percentile_rank(population: &[f64], avg_ms: f64) -> f64 {
    if population.is_empty() {
        return NEUTRAL_RANK;
    }
    let slower = population.iter().filter(|&&a| a > avg_ms).count();
    slower as f64 * 100.0 / population.len() as f64
}

/// Sorted order-statistics table over one population's averages.
///
/// Built once per recomputation pass, so re-ranking a whole population is
/// O(n log n) instead of the all-pairs O(n²). `rank_of` locates the first
/// strictly greater element with `partition_point`, which excludes ties
/// exactly as the strict comparison in [`percentile_rank`] does.
#[derive(Debug, Clone)]
pub struct RankTable {
    sorted: Vec<f64>,
}

impl RankTable {
    /// Build from the ranked population's averages.
    ///
    /// Callers filter to present, finite averages before ranking; a
    /// non-finite value here is a caller bug (debug-asserted, then
    /// dropped so the sort order stays total).
    pub fn new(mut avgs: Vec<f64>) -> Self {
        debug_assert!(avgs.iter().all(|a| a.is_finite()));
        avgs.retain(|a| a.is_finite());
        avgs.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self { sorted: avgs }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Rank of `avg_ms` against this population.
    pub fn rank_of(&self, avg_ms: f64) -> f64 {
        if self.sorted.is_empty() {
            return NEUTRAL_RANK;
        }
        let first_slower = self.sorted.partition_point(|&a| a <= avg_ms);
        let slower = self.sorted.len() - first_slower;
        slower as f64 * 100.0 / self.sorted.len() as f64
    }
}

/// Rank every row against the full set.
///
/// Each row's own average is part of the population (N includes it); the
/// strict comparison makes the self-pairing a no-op, so this matches the
/// post-insertion all-pairs definition.
pub fn compute_ranks(rows: &[(TestId, f64)]) -> Vec<(TestId, f64)> {
    let table = RankTable::new(rows.iter().map(|&(_, avg)| avg).collect());
    rows.iter()
        .map(|&(id, avg)| (id, table.rank_of(avg)))
        .collect()
}
