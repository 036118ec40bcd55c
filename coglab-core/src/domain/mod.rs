//! Domain types: test identities, trial observations, derived statistics.

mod ids;
mod stats;
mod test_type;
mod trial;

pub use ids::{TestId, UserId};
pub use stats::{rank_description, TestStatistics};
pub use test_type::{ParseTestTypeError, TestType};
pub use trial::TrialObservation;
