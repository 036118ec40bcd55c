//! Property tests for scoring-engine invariants.
//!
//! Uses proptest to verify:
//! 1. Accuracy identity — `accuracy_rate * total_trials == correct_trials`
//! 2. Ordering — fastest ≤ median ≤ slowest and fastest ≤ avg ≤ slowest
//! 3. RankTable ≡ brute-force percentile definition
//! 4. Rank monotonicity — a faster average never ranks below a slower one
//! 5. Distribution idempotence and conservation

use proptest::prelude::*;

use coglab_core::domain::{TestId, TestStatistics, TrialObservation};
use coglab_core::{
    aggregate, accuracy_distribution, compute_ranks, percentile_rank, reaction_time_distribution,
    RankTable,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_trials() -> impl Strategy<Value = Vec<TrialObservation>> {
    proptest::collection::vec((proptest::option::of(0u32..2_000), any::<bool>()), 1..40).prop_map(
        |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (rt, correct))| TrialObservation {
                    trial_index: i as u32 + 1,
                    stimulus: "◆".into(),
                    response: "key".into(),
                    reaction_time_ms: rt,
                    is_correct: correct,
                })
                .collect()
        },
    )
}

fn arb_avgs() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec((50u32..2_000).prop_map(f64::from), 0..60)
}

fn arb_population() -> impl Strategy<Value = Vec<TestStatistics>> {
    proptest::collection::vec(arb_trials(), 0..20).prop_map(|sets| {
        sets.iter()
            .map(|trials| aggregate(trials).expect("non-empty trial sets aggregate"))
            .collect()
    })
}

// ── 1. Accuracy identity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn accuracy_times_total_equals_correct(trials in arb_trials()) {
        let stats = aggregate(&trials).unwrap();
        let reconstructed = stats.accuracy_rate * f64::from(stats.total_trials);
        prop_assert!((reconstructed - f64::from(stats.correct_trials)).abs() < 1e-9);
    }

    // ── 2. Ordering invariants ───────────────────────────────────────

    #[test]
    fn reaction_time_fields_are_ordered(trials in arb_trials()) {
        let stats = aggregate(&trials).unwrap();
        if let (Some(fastest), Some(median), Some(avg), Some(slowest)) = (
            stats.fastest_ms,
            stats.median_reaction_time_ms,
            stats.avg_reaction_time_ms,
            stats.slowest_ms,
        ) {
            let fastest = f64::from(fastest);
            let slowest = f64::from(slowest);
            prop_assert!(fastest <= median && median <= slowest);
            prop_assert!(fastest <= avg && avg <= slowest);
        } else {
            // Absent fields are all-or-nothing.
            prop_assert!(stats.fastest_ms.is_none());
            prop_assert!(stats.median_reaction_time_ms.is_none());
            prop_assert!(stats.avg_reaction_time_ms.is_none());
            prop_assert!(stats.std_deviation_ms.is_none());
            prop_assert!(stats.slowest_ms.is_none());
        }
    }

    // ── 3. Fast path ≡ brute force ───────────────────────────────────

    #[test]
    fn rank_table_matches_brute_force(avgs in arb_avgs(), probe in 0u32..2_500) {
        let probe = f64::from(probe);
        let table = RankTable::new(avgs.clone());
        prop_assert_eq!(table.rank_of(probe), percentile_rank(&avgs, probe));
    }

    #[test]
    fn batch_recomputation_matches_brute_force(avgs in arb_avgs()) {
        let rows: Vec<(TestId, f64)> = avgs
            .iter()
            .enumerate()
            .map(|(i, &avg)| (TestId(i as u64), avg))
            .collect();
        for (id, rank) in compute_ranks(&rows) {
            let avg = rows.iter().find(|(rid, _)| *rid == id).unwrap().1;
            prop_assert_eq!(rank, percentile_rank(&avgs, avg));
        }
    }

    // ── 4. Rank monotonicity ─────────────────────────────────────────

    #[test]
    fn faster_average_ranks_at_least_as_high(avgs in arb_avgs()) {
        let rows: Vec<(TestId, f64)> = avgs
            .iter()
            .enumerate()
            .map(|(i, &avg)| (TestId(i as u64), avg))
            .collect();
        let ranked = compute_ranks(&rows);
        for i in 0..ranked.len() {
            for j in 0..ranked.len() {
                if rows[i].1 < rows[j].1 {
                    prop_assert!(ranked[i].1 >= ranked[j].1);
                }
            }
        }
    }

    // ── 5. Distributions ─────────────────────────────────────────────

    #[test]
    fn distribution_is_idempotent(population in arb_population()) {
        let first = reaction_time_distribution(&population);
        let second = reaction_time_distribution(&population);
        prop_assert_eq!(first, second);

        let first = accuracy_distribution(&population);
        let second = accuracy_distribution(&population);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn bucket_counts_conserve_the_timed_population(population in arb_population()) {
        let timed = population
            .iter()
            .filter(|s| s.avg_reaction_time_ms.is_some())
            .count() as u64;
        let buckets = reaction_time_distribution(&population);
        prop_assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), timed);

        if timed > 0 {
            let pct_sum: f64 = buckets.iter().map(|b| b.percentage).sum();
            // Each bucket rounds to one decimal, so drift stays within
            // 0.05 per bucket.
            prop_assert!((pct_sum - 100.0).abs() <= 0.05 * buckets.len() as f64 + 1e-9);
        }
    }
}
