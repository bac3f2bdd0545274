pub mod error {
    use std::path::PathBuf;

    use super::TestId;

    pub type Result<T> = std::result::Result<T, Error>;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error(transparent)]
        Fs(#[from] fsutil::Error),

        #[error("No test with id #{0}")]
        NoSuchTest(TestId),

        #[error("Archive already exists: {0:?}")]
        ArchiveExists(PathBuf),

        #[error("No archived session for contest '{0}' and task '{1}'")]
        NoArchive(String, String),
    }
}
pub use error::{Error, Result};

pub mod archive;
pub mod pool;
pub mod store;

pub use archive::*;
pub use pool::*;
pub use store::*;
