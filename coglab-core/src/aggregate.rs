//! Trial aggregation — reduces one completed test's observations into a
//! statistics record.
//!
//! `aggregate` is a pure function of its input: no store access, no
//! interior state. The percentile rank is left unset; the ranking engine
//! assigns it against the live population after the record is persisted.

use thiserror::Error;

use crate::domain::{TestStatistics, TrialObservation};

/// Rejections raised before any statistic is computed. All of these mean
/// the caller handed over a malformed trial set and can retry with
/// corrected input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("cannot aggregate an empty trial set")]
    EmptyTrialSet,

    #[error("trial index 0 is invalid (indices start at 1)")]
    TrialIndexZero,

    #[error("duplicate trial index {0}")]
    DuplicateTrialIndex(u32),

    #[error("trial index {found} after {prev}: observations must arrive in ascending trial order")]
    OutOfOrderTrialIndex { prev: u32, found: u32 },
}

/// Reduce an ordered trial sequence to one `TestStatistics`.
///
/// The timed subset — trials with a present, strictly positive reaction
/// time — drives every reaction-time field. An empty timed subset leaves
/// all of them absent; it does not zero them.
pub fn aggregate(trials: &[TrialObservation]) -> Result<TestStatistics, AggregateError> {
    if trials.is_empty() {
        return Err(AggregateError::EmptyTrialSet);
    }
    validate_order(trials)?;

    let total_trials = trials.len() as u32;
    let correct_trials = trials.iter().filter(|t| t.is_correct).count() as u32;
    let accuracy_rate = f64::from(correct_trials) / f64::from(total_trials);

    let mut timed: Vec<u32> = trials
        .iter()
        .filter_map(|t| t.reaction_time_ms.filter(|&rt| rt > 0))
        .collect();
    timed.sort_unstable();

    if timed.is_empty() {
        return Ok(TestStatistics {
            total_trials,
            correct_trials,
            accuracy_rate,
            avg_reaction_time_ms: None,
            median_reaction_time_ms: None,
            std_deviation_ms: None,
            fastest_ms: None,
            slowest_ms: None,
            percentile_rank: None,
        });
    }

    let n = timed.len() as f64;
    let avg = timed.iter().map(|&rt| f64::from(rt)).sum::<f64>() / n;
    // Population variance: mean of squared deviations, no Bessel correction.
    let variance = timed
        .iter()
        .map(|&rt| (f64::from(rt) - avg).powi(2))
        .sum::<f64>()
        / n;

    Ok(TestStatistics {
        total_trials,
        correct_trials,
        accuracy_rate,
        avg_reaction_time_ms: Some(avg),
        median_reaction_time_ms: Some(median_of_sorted(&timed)),
        std_deviation_ms: Some(variance.sqrt()),
        fastest_ms: Some(timed[0]),
        slowest_ms: Some(*timed.last().unwrap()),
        percentile_rank: None,
    })
}

/// Trial indices must be ≥1 and strictly ascending. A duplicated index
/// means two observations claim the same trial; both cases fail loudly
/// rather than silently reordering.
fn validate_order(trials: &[TrialObservation]) -> Result<(), AggregateError> {
    let mut prev: Option<u32> = None;
    for t in trials {
        if t.trial_index == 0 {
            return Err(AggregateError::TrialIndexZero);
        }
        if let Some(p) = prev {
            if t.trial_index == p {
                return Err(AggregateError::DuplicateTrialIndex(p));
            }
            if t.trial_index < p {
                return Err(AggregateError::OutOfOrderTrialIndex {
                    prev: p,
                    found: t.trial_index,
                });
            }
        }
        prev = Some(t.trial_index);
    }
    Ok(())
}

fn median_of_sorted(sorted: &[u32]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0
    } else {
        f64::from(sorted[n / 2])
    }
}
