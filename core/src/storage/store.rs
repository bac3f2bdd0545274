use std::path::{Path, PathBuf};

use lazy_regex::regex_captures;

use super::error::*;

pub type TestId = u32;

/// A test case as persisted in the session dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTest {
    pub id: TestId,
    pub input: PathBuf,
    /// `None` if the expected answer is unknown
    pub answer: Option<PathBuf>,
}

/// The numbered `{id}.in` / `{id}.ans` files of a session.
///
/// Ids are dense and start from 1: if `{id}.in` exists then so does every `{1..id-1}.in`.
/// [`TestStore::remove`] restores this invariant by shifting the following tests down.
/// Nothing is transactional; a crash in the middle of a removal may leave a gap,
/// which [`TestStore::stray_ids`] reports.
#[derive(Debug, Clone)]
pub struct TestStore {
    dir: PathBuf,
}

impl TestStore {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: session_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns tuple (input_filename, answer_filename).
    ///
    /// ```
    /// use taskpool_core::storage::TestStore;
    ///
    /// let (infile, ansfile) = TestStore::testcase_filename(3);
    /// assert_eq!(infile, "3.in");
    /// assert_eq!(ansfile, "3.ans");
    /// ```
    pub fn testcase_filename(id: TestId) -> (String, String) {
        (format!("{}.in", id), format!("{}.ans", id))
    }

    pub fn input_file(&self, id: TestId) -> PathBuf {
        self.dir.join(Self::testcase_filename(id).0)
    }

    pub fn answer_file(&self, id: TestId) -> PathBuf {
        self.dir.join(Self::testcase_filename(id).1)
    }

    pub fn exists(&self, id: TestId) -> bool {
        id > 0 && self.input_file(id).is_file()
    }

    fn first_available_id(&self) -> TestId {
        let mut id = 1;
        while self.exists(id) {
            id += 1;
        }
        id
    }

    /// Saves a new test and returns its id. An empty `answer` means "unknown" and
    /// no answer file is written.
    pub fn add(&self, input: impl AsRef<[u8]>, answer: impl AsRef<[u8]>) -> Result<TestId> {
        fsutil::mkdir_all(&self.dir)?;
        let id = self.first_available_id();
        fsutil::write(self.input_file(id), input)?;
        let answer = answer.as_ref();
        if !answer.is_empty() {
            fsutil::write(self.answer_file(id), answer)?;
        }
        log::debug!("Added test #{}", id);
        Ok(id)
    }

    /// Deletes test `id` and shifts every following test down by one.
    pub fn remove(&self, id: TestId) -> Result<()> {
        if !self.exists(id) {
            return Err(Error::NoSuchTest(id));
        }
        fsutil::remove_file(self.input_file(id))?;
        fsutil::remove_file_if_exists(self.answer_file(id))?;

        let mut id = id;
        while self.exists(id + 1) {
            fsutil::rename(self.input_file(id + 1), self.input_file(id))?;
            let next_answer = self.answer_file(id + 1);
            if next_answer.is_file() {
                fsutil::rename(next_answer, self.answer_file(id))?;
            }
            id += 1;
        }
        Ok(())
    }

    /// Tests `1..` up to the first missing id.
    pub fn list(&self) -> Vec<StoredTest> {
        (1..)
            .take_while(|&id| self.exists(id))
            .map(|id| {
                let answer = self.answer_file(id);
                StoredTest {
                    id,
                    input: self.input_file(id),
                    answer: answer.is_file().then_some(answer),
                }
            })
            .collect()
    }

    /// Ids of `{id}.in` files that [`TestStore::list`] cannot reach because of a gap.
    pub fn stray_ids(&self) -> Result<Vec<TestId>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let reachable = self.list().len() as TestId;
        let mut ids: Vec<TestId> = fsutil::list_files(&self.dir)?
            .iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let (_, id) = regex_captures!(r"^([1-9][0-9]*)\.in$", name)?;
                id.parse().ok()
            })
            .filter(|&id| id > reachable)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ids(store: &TestStore) -> Vec<TestId> {
        store.list().iter().map(|t| t.id).collect()
    }

    fn input_of(store: &TestStore, id: TestId) -> String {
        fsutil::read_to_string(store.input_file(id)).unwrap()
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());

        assert_eq!(store.add("1\n", "2\n").unwrap(), 1);
        assert_eq!(store.add("2\n", "").unwrap(), 2);
        assert_eq!(store.add("3\n", "6\n").unwrap(), 3);

        let tests = store.list();
        assert_eq!(tests.len(), 3);
        assert_eq!(tests[0].answer, Some(dir.path().join("1.ans")));
        assert_eq!(tests[1].answer, None, "empty answer must not be written");
        assert!(!dir.path().join("2.ans").exists());
    }

    #[test]
    fn remove_compacts_following_tests() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("a", "A").unwrap();
        store.add("b", "").unwrap();
        store.add("c", "C").unwrap();
        store.add("d", "D").unwrap();

        store.remove(2).unwrap();
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(input_of(&store, 2), "c");
        assert_eq!(fsutil::read_to_string(store.answer_file(2)).unwrap(), "C");
        assert_eq!(input_of(&store, 3), "d");
        assert!(!store.input_file(4).exists());
        assert!(!store.answer_file(4).exists());

        store.remove(1).unwrap();
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(input_of(&store, 1), "c");

        store.remove(2).unwrap();
        store.remove(1).unwrap();
        assert!(store.list().is_empty());
        assert!(store.stray_ids().unwrap().is_empty());
    }

    #[test]
    fn answerless_test_does_not_inherit_answer() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("a", "A").unwrap();
        store.add("b", "").unwrap();

        store.remove(1).unwrap();
        let tests = store.list();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].answer, None);
    }

    #[test]
    fn ids_stay_contiguous_through_mixed_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        let ops: &[(bool, TestId)] = &[
            (true, 0),
            (true, 0),
            (true, 0),
            (false, 2),
            (true, 0),
            (false, 1),
            (false, 3),
            (true, 0),
            (false, 9),
            (false, 1),
        ];
        for &(is_add, id) in ops {
            if is_add {
                store.add("x", "y").unwrap();
            } else {
                let _ = store.remove(id);
            }
            let n = store.list().len() as TestId;
            assert_eq!(ids(&store), (1..=n).collect::<Vec<_>>());
            assert!(store.stray_ids().unwrap().is_empty());
        }
    }

    #[test]
    fn remove_missing_reports_no_such_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("a", "A").unwrap();

        for id in [0, 2, 100] {
            let err = store.remove(id).unwrap_err();
            assert!(matches!(err, Error::NoSuchTest(x) if x == id));
        }
        assert_eq!(ids(&store), vec![1]);
        assert_eq!(input_of(&store, 1), "a");
    }

    #[test]
    fn stray_ids_after_gap() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("a", "").unwrap();
        fsutil::write(dir.path().join("3.in"), "c").unwrap();
        fsutil::write(dir.path().join("5.in"), "e").unwrap();
        fsutil::write(dir.path().join("05.in"), "not a test").unwrap();

        assert_eq!(ids(&store), vec![1]);
        assert_eq!(store.stray_ids().unwrap(), vec![3, 5]);
        // Adding fills the first gap
        assert_eq!(store.add("b", "").unwrap(), 2);
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(store.stray_ids().unwrap(), vec![5]);
    }
}
