use std::path::{Path, PathBuf};

use super::{error::*, TestPool};
use crate::session::Session;

/// `<archive_dir>/<contest>/<task>/` holds a flat copy of a session dir, plus the
/// work file saved as [`ArchiveHome::SOLUTION_FILENAME`].
#[derive(Debug, Clone, Copy)]
pub struct ArchiveHome<'a> {
    home: &'a Path,
}

impl<'a> ArchiveHome<'a> {
    pub const SOLUTION_FILENAME: &'static str = "__solution__";

    #[inline]
    pub fn new(archive_home_dir: &'a Path) -> Self {
        Self {
            home: archive_home_dir,
        }
    }

    pub fn resolve(&self, contest: &str, task: &str) -> PathBuf {
        self.home.join(contest).join(task)
    }

    pub fn is_archived(&self, session: &Session) -> bool {
        self.resolve(&session.contest, &session.task).is_dir()
    }

    /// Copies the session dir (without the test pool) and the work file into the archive.
    pub fn archive(
        &self,
        session: &Session,
        session_dir: impl AsRef<Path>,
        work_file: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let (session_dir, work_file) = (session_dir.as_ref(), work_file.as_ref());
        TestPool::new(session_dir).remove()?;

        let dest = self.resolve(&session.contest, &session.task);
        if dest.exists() {
            if !overwrite {
                return Err(Error::ArchiveExists(dest));
            }
            fsutil::remove_dir_all_if_exists(&dest)?;
        }
        fsutil::mkdir_all(&dest)?;

        for file in fsutil::list_files(session_dir)? {
            if let Some(name) = file.file_name() {
                fsutil::copy_file(&file, dest.join(name))?;
            }
        }

        if work_file.is_file() {
            fsutil::copy_file(work_file, dest.join(Self::SOLUTION_FILENAME))?;
        } else {
            log::warn!("Work file {:?} not found; archiving without it", work_file);
        }
        Ok(dest)
    }

    /// Replaces the session dir and the work file with the archived ones.
    pub fn restore(
        &self,
        contest: &str,
        task: &str,
        session_dir: impl AsRef<Path>,
        work_file: impl AsRef<Path>,
    ) -> Result<()> {
        let (session_dir, work_file) = (session_dir.as_ref(), work_file.as_ref());
        let src = self.resolve(contest, task);
        if !src.is_dir() {
            return Err(Error::NoArchive(contest.to_owned(), task.to_owned()));
        }

        fsutil::remove_dir_all_if_exists(session_dir)?;
        fsutil::mkdir_all(session_dir)?;

        for file in fsutil::list_files(&src)? {
            let Some(name) = file.file_name() else {
                continue
            };
            if name == Self::SOLUTION_FILENAME {
                fsutil::copy_file(&file, work_file)?;
            } else {
                fsutil::copy_file(&file, session_dir.join(name))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::TestStore;

    struct Fixture {
        _root: tempfile::TempDir,
        session_dir: PathBuf,
        archive_dir: PathBuf,
        work_file: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let session_dir = root.path().join("session");
        let archive_dir = root.path().join("archive");
        let work_file = root.path().join("main.go");
        fsutil::write(&work_file, "package main // v1").unwrap();
        Fixture {
            session_dir,
            archive_dir,
            work_file,
            _root: root,
        }
    }

    #[test]
    fn archive_then_restore() {
        let f = fixture();
        let session = Session {
            contest: "1234".into(),
            task: "A".into(),
            ..Default::default()
        };
        session.save(&f.session_dir).unwrap();
        let store = TestStore::new(&f.session_dir);
        store.add("1 2\n", "3\n").unwrap();
        store.add("4\n", "").unwrap();
        TestPool::new(&f.session_dir)
            .prepare(&store)
            .unwrap();

        let home = ArchiveHome::new(&f.archive_dir);
        assert!(!home.is_archived(&session));
        let dest = home
            .archive(&session, &f.session_dir, &f.work_file, false)
            .unwrap();
        assert_eq!(dest, f.archive_dir.join("1234").join("A"));
        assert!(home.is_archived(&session));
        assert!(dest.join("1.in").is_file());
        assert!(dest.join(Session::FILENAME).is_file());
        assert!(dest.join(ArchiveHome::SOLUTION_FILENAME).is_file());
        assert!(!dest.join(TestPool::DIR_NAME).exists());
        assert!(!f.session_dir.join(TestPool::DIR_NAME).exists());

        // Mess up the current session, then bring the archived one back
        store.remove(1).unwrap();
        fsutil::write(&f.work_file, "package main // v2").unwrap();
        home.restore("1234", "A", &f.session_dir, &f.work_file)
            .unwrap();

        assert_eq!(Session::load(&f.session_dir).unwrap(), session);
        assert_eq!(store.list().len(), 2);
        assert_eq!(fsutil::read_to_string(store.input_file(1)).unwrap(), "1 2\n");
        assert_eq!(
            fsutil::read_to_string(&f.work_file).unwrap(),
            "package main // v1"
        );
        assert!(!f.session_dir.join(ArchiveHome::SOLUTION_FILENAME).exists());
    }

    #[test]
    fn archive_refuses_overwrite_unless_forced() {
        let f = fixture();
        let session = Session::default();
        session.save(&f.session_dir).unwrap();
        let home = ArchiveHome::new(&f.archive_dir);

        home.archive(&session, &f.session_dir, &f.work_file, false)
            .unwrap();
        let err = home
            .archive(&session, &f.session_dir, &f.work_file, false)
            .unwrap_err();
        assert!(matches!(err, Error::ArchiveExists(_)));
        home.archive(&session, &f.session_dir, &f.work_file, true)
            .unwrap();
    }

    #[test]
    fn restore_missing_archive() {
        let f = fixture();
        fsutil::mkdir_all(&f.session_dir).unwrap();
        let home = ArchiveHome::new(&f.archive_dir);
        let err = home
            .restore("nope", "X", &f.session_dir, &f.work_file)
            .unwrap_err();
        assert!(matches!(err, Error::NoArchive(..)));
        // Current session untouched
        assert!(f.session_dir.is_dir());
    }
}
