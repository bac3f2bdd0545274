use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context as _};
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};

use crate::storage::TestPool;

/// Where the candidate program reads its input from / writes its output to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IoTarget {
    /// Standard input / standard output (`"*"` on disk)
    Std,
    /// A file the program opens by itself, relative to its working directory
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckerKind {
    /// Token-wise line comparator (`"*"` on disk)
    Builtin,
    /// Executable invoked as `checker <input> <output> <answer>`
    External(PathBuf),
}

/// Metadata of the task currently being solved.
///
/// Persisted as `session.json` in the session dir. Field names on disk are kept
/// PascalCase (`TimeLimit`, `MemLimit`, ...) so that existing session files stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    pub contest: String,
    pub task: String,
    pub input: IoTarget,
    pub output: IoTarget,
    /// milliseconds
    pub time_limit: u64,
    /// bytes (advisory, never enforced)
    pub mem_limit: u64,
    pub checker: CheckerKind,
}

const STD_MARK: &str = "*";

impl IoTarget {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Std => None,
            Self::File(name) => Some(name),
        }
    }
}

impl From<String> for IoTarget {
    fn from(s: String) -> Self {
        if s == STD_MARK {
            Self::Std
        } else {
            Self::File(s)
        }
    }
}

impl From<&str> for IoTarget {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl From<IoTarget> for String {
    fn from(t: IoTarget) -> Self {
        match t {
            IoTarget::Std => STD_MARK.to_owned(),
            IoTarget::File(name) => name,
        }
    }
}

impl fmt::Display for IoTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Std => write!(f, "{}", STD_MARK),
            Self::File(name) => write!(f, "{}", name),
        }
    }
}

impl From<String> for CheckerKind {
    fn from(s: String) -> Self {
        if s == STD_MARK {
            Self::Builtin
        } else {
            Self::External(s.into())
        }
    }
}

impl From<&str> for CheckerKind {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl From<CheckerKind> for String {
    fn from(c: CheckerKind) -> Self {
        match c {
            CheckerKind::Builtin => STD_MARK.to_owned(),
            CheckerKind::External(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "{}", STD_MARK),
            Self::External(path) => write!(f, "{}", path.to_string_lossy()),
        }
    }
}

/// Named I/O files live next to the staged tests and the binary in the pool, so they must
/// not clash with them or escape the pool dir.
fn is_plain_pool_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && name != TestPool::BINARY_NAME
        && !regex_is_match!(r"^[0-9]+\.(in|ans|out)$", name)
}

impl Default for Session {
    fn default() -> Self {
        Self {
            contest: Self::DEFAULT_CONTEST.to_owned(),
            task: Self::DEFAULT_TASK.to_owned(),
            input: IoTarget::Std,
            output: IoTarget::Std,
            time_limit: Self::DEFAULT_TIME_LIMIT_MS,
            mem_limit: Self::DEFAULT_MEM_LIMIT_BYTES,
            checker: CheckerKind::Builtin,
        }
    }
}

impl Session {
    pub const FILENAME: &str = "session.json";

    pub const DEFAULT_CONTEST: &str = "practice";
    pub const DEFAULT_TASK: &str = "task";
    pub const DEFAULT_TIME_LIMIT_MS: u64 = 1000;
    pub const DEFAULT_MEM_LIMIT_BYTES: u64 = 64 << 20;

    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit)
    }

    pub fn filepath(session_dir: impl AsRef<Path>) -> PathBuf {
        session_dir.as_ref().join(Self::FILENAME)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.time_limit > 0,
            "Invalid session: time limit must be positive (got {})",
            self.time_limit
        );
        // Both names become path components of the archive dir
        for (what, name) in [("contest", &self.contest), ("task", &self.task)] {
            ensure!(
                !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\']),
                "Invalid session: bad {} name '{}'",
                what,
                name
            );
        }
        for (what, target) in [("input", &self.input), ("output", &self.output)] {
            if let Some(name) = target.file_name() {
                ensure!(
                    is_plain_pool_name(name),
                    "Invalid session: {} file '{}' must be a plain file name that is not used by the test pool",
                    what,
                    name
                );
            }
        }
        Ok(())
    }

    pub fn load(session_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let filepath = Self::filepath(session_dir);
        let session: Self = fsutil::read_json_with_deserialize(&filepath)?;
        session
            .validate()
            .with_context(|| format!("Broken session file {:?}", filepath))?;
        Ok(session)
    }

    /// Loads `session.json`, creating it with the default session when absent.
    pub fn load_or_init(session_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let session_dir = session_dir.as_ref();
        if Self::filepath(session_dir).is_file() {
            return Self::load(session_dir);
        }
        log::info!("No session found in {:?}; creating default one", session_dir);
        let session = Self::default();
        session.save(session_dir)?;
        Ok(session)
    }

    pub fn save(&self, session_dir: impl AsRef<Path>) -> anyhow::Result<()> {
        self.validate()?;
        fsutil::write_json_with_mkdir(Self::filepath(session_dir), self)?;
        Ok(())
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Session description:")?;
        writeln!(f, "  Contest:    {}", self.contest)?;
        writeln!(f, "  Task:       {}", self.task)?;
        writeln!(f, "  Input:      {}", self.input)?;
        writeln!(f, "  Output:     {}", self.output)?;
        writeln!(f, "  Time limit: {} [ms]", self.time_limit)?;
        writeln!(f, "  Mem limit:  {} [MiB]", self.mem_limit >> 20)?;
        writeln!(f, "  Checker:    {}", self.checker)
    }
}
