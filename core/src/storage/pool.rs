use std::path::{Path, PathBuf};

use super::{error::Result, TestId, TestStore};
use crate::testing::StagedTest;

/// Ephemeral `__pool__` dir in which the solution is built and run.
///
/// Test files are linked (or copied) in from the [`TestStore`] so that whatever the
/// candidate program does inside the pool never touches the session's own files.
/// The pool is wiped and rebuilt on every [`TestPool::prepare`].
#[derive(Debug, Clone)]
pub struct TestPool {
    dir: PathBuf,
}

impl TestPool {
    pub const DIR_NAME: &str = "__pool__";
    pub const BINARY_NAME: &str = "solution";

    pub fn new(session_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: session_dir.as_ref().join(Self::DIR_NAME),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn binary_file(&self) -> PathBuf {
        self.dir.join(Self::BINARY_NAME)
    }

    pub fn staged_test(&self, id: TestId) -> StagedTest {
        let (infile, ansfile) = TestStore::testcase_filename(id);
        let answer = self.dir.join(ansfile);
        StagedTest {
            id,
            input: self.dir.join(infile),
            answer: answer.is_file().then_some(answer),
            output: self.dir.join(format!("{}.out", id)),
        }
    }

    pub fn remove(&self) -> Result<()> {
        fsutil::remove_dir_all_if_exists(&self.dir)?;
        Ok(())
    }

    /// Removes everything left by a previous run and leaves an empty pool dir.
    pub fn clean(&self) -> Result<()> {
        self.remove()?;
        fsutil::mkdir_all(&self.dir)?;
        Ok(())
    }

    /// Stages every stored test into the pool. Any filesystem error aborts staging.
    pub fn prepare(&self, store: &TestStore) -> Result<Vec<StagedTest>> {
        log::info!("Cleaning test pool {:?}", self.dir);
        self.clean()?;

        log::info!("Staging tests");
        let mut staged = Vec::new();
        for t in store.list() {
            let (infile, ansfile) = TestStore::testcase_filename(t.id);
            fsutil::link_or_copy(&t.input, self.dir.join(infile))?;
            if let Some(answer) = &t.answer {
                fsutil::link_or_copy(answer, self.dir.join(ansfile))?;
            }
            staged.push(self.staged_test(t.id));
        }
        Ok(staged)
    }
}
