use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed category of cognitive trial.
///
/// Every test belongs to exactly one type; the type's population of
/// completed tests is the reference set for percentile ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    SimpleReaction,
    ChoiceReaction,
    WorkingMemory,
    GoNoGo,
    Stroop,
}

impl TestType {
    pub const ALL: [TestType; 5] = [
        TestType::SimpleReaction,
        TestType::ChoiceReaction,
        TestType::WorkingMemory,
        TestType::GoNoGo,
        TestType::Stroop,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn display_name(&self) -> &'static str {
        match self {
            TestType::SimpleReaction => "Simple Reaction",
            TestType::ChoiceReaction => "Choice Reaction",
            TestType::WorkingMemory => "Working Memory",
            TestType::GoNoGo => "Go / No-Go",
            TestType::Stroop => "Stroop",
        }
    }

    /// Stable index into per-type tables (locks, counters).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// snake_case identifier, also accepted by `FromStr`.
    pub fn slug(&self) -> &'static str {
        match self {
            TestType::SimpleReaction => "simple_reaction",
            TestType::ChoiceReaction => "choice_reaction",
            TestType::WorkingMemory => "working_memory",
            TestType::GoNoGo => "go_no_go",
            TestType::Stroop => "stroop",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown test type '{0}' (expected one of: simple_reaction, choice_reaction, working_memory, go_no_go, stroop)")]
pub struct ParseTestTypeError(pub String);

impl FromStr for TestType {
    type Err = ParseTestTypeError;

    /// Accepts snake_case, kebab-case, or SCREAMING_SNAKE_CASE spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "simple_reaction" => Ok(TestType::SimpleReaction),
            "choice_reaction" => Ok(TestType::ChoiceReaction),
            "working_memory" => Ok(TestType::WorkingMemory),
            "go_no_go" => Ok(TestType::GoNoGo),
            "stroop" => Ok(TestType::Stroop),
            _ => Err(ParseTestTypeError(s.to_string())),
        }
    }
}
