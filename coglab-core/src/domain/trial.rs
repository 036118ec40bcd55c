use serde::{Deserialize, Serialize};

/// A single stimulus/response observation within one completed test.
///
/// Observations are immutable once recorded and owned by the test that
/// produced them. The test lifecycle service delivers them in ascending
/// `trial_index` order; the aggregator rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialObservation {
    /// 1-based position of the trial within its test.
    pub trial_index: u32,
    pub stimulus: String,
    pub response: String,
    /// Milliseconds from stimulus onset to response. `None` when the trial
    /// timed out or recorded no usable latency; non-positive values are
    /// treated the same way by the aggregator.
    pub reaction_time_ms: Option<u32>,
    pub is_correct: bool,
}
