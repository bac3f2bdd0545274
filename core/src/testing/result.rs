use std::time::Duration;

use crate::storage::TestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Outcome {
    OK,
    WA,
    TLE,
    /// Never produced: memory is not measured.
    MLE,
    RE,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        use Outcome::*;
        match self {
            OK => "OK",
            WA => "Wrong Answer",
            TLE => "Time Limit Exceeded",
            MLE => "Memory Limit Exceeded",
            RE => "Runtime Error",
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub id: TestId,
    pub outcome: Outcome,
    pub elapsed: Duration,
    /// Why the test did not pass (checker message, exit code, ...)
    pub detail: Option<String>,
}
