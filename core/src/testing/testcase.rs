use std::path::{Path, PathBuf};

use crate::storage::TestId;

/// A test materialized in the test pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTest {
    pub id: TestId,
    pub input: PathBuf,
    /// `None` if the expected answer is unknown
    pub answer: Option<PathBuf>,
    /// Where the program's output ends up (`{id}.out`)
    pub output: PathBuf,
}

impl StagedTest {
    pub fn name(&self) -> String {
        format!("#{}", self.id)
    }

    pub fn answer(&self) -> Option<&Path> {
        self.answer.as_deref()
    }
}
