use std::{
    fmt,
    path::{Path, PathBuf},
    process::Stdio,
};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::process::Command;

use super::{error::Error, testcase::StagedTest};
use crate::session::CheckerKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    WrongAnswer(String),
}

/// Judges the output of a finished run against the expected answer.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, test: &StagedTest, answer: &Path) -> anyhow::Result<Verdict>;
}

/// Returns the checker the session asks for.
/// An external checker must exist now; it is resolved to an absolute path because it is
/// run from inside the test pool.
pub fn checker_for(kind: &CheckerKind, work_dir: &Path) -> anyhow::Result<Box<dyn Checker>> {
    match kind {
        CheckerKind::Builtin => Ok(Box::new(TokenChecker)),
        CheckerKind::External(path) => {
            if !path.is_file() {
                return Err(Error::MissingChecker(path.to_owned()).into());
            }
            let path = fsutil::canonicalize_path(path)?;
            Ok(Box::new(ExternalChecker::new(path, work_dir)))
        }
    }
}

/// Line-by-line, space-separated token comparison.
///
/// The answer decides how many lines are compared: output lines past the end of the
/// answer are ignored, and a missing output line counts as an empty one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenChecker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// 1-based
    pub line: usize,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {} differ - expected: {:?}, found: {:?}",
            self.line, self.expected, self.found
        )
    }
}

fn lines(s: &[u8]) -> impl Iterator<Item = &[u8]> {
    let s = s.strip_suffix(b"\n").unwrap_or(s);
    // An empty input has no lines at all
    (!s.is_empty())
        .then(|| s.split(|&b| b == b'\n'))
        .into_iter()
        .flatten()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

fn tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(|&b| b == b' ').filter(|t| !t.is_empty())
}

fn tokens_lossy(line: &[u8]) -> Vec<String> {
    tokens(line)
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .collect()
}

/// Compares raw bytes; text conversion only happens for the mismatch message.
pub fn compare_tokens(output: &[u8], answer: &[u8]) -> Result<(), Mismatch> {
    let mut output_lines = lines(output);
    for (i, expected) in lines(answer).enumerate() {
        let found = output_lines.next().unwrap_or(b"");
        if !tokens(expected).eq(tokens(found)) {
            return Err(Mismatch {
                line: i + 1,
                expected: tokens_lossy(expected),
                found: tokens_lossy(found),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl Checker for TokenChecker {
    async fn check(&self, test: &StagedTest, answer: &Path) -> anyhow::Result<Verdict> {
        let answer = tokio::fs::read(answer)
            .await
            .with_context(|| format!("Failed to read answer {:?}", answer))?;
        // No output file reads as empty output
        let output = tokio::fs::read(&test.output).await.unwrap_or_default();

        Ok(match compare_tokens(&output, &answer) {
            Ok(()) => Verdict::Accepted,
            Err(mismatch) => Verdict::WrongAnswer(mismatch.to_string()),
        })
    }
}

/// Runs `<checker> <input> <output> <answer>` in the test pool; exit code 0 means accepted.
#[derive(Debug, Clone)]
pub struct ExternalChecker {
    path: PathBuf,
    work_dir: PathBuf,
}

impl ExternalChecker {
    pub fn new(path: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            work_dir: work_dir.into(),
        }
    }
}

#[async_trait]
impl Checker for ExternalChecker {
    async fn check(&self, test: &StagedTest, answer: &Path) -> anyhow::Result<Verdict> {
        let res = Command::new(&self.path)
            .args([test.input.as_os_str(), test.output.as_os_str(), answer.as_os_str()])
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match res {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Failed to run checker {:?}: {}", self.path, e);
                return Ok(Verdict::WrongAnswer(format!("Checker failed to run: {}", e)));
            }
        };
        if output.status.success() {
            return Ok(Verdict::Accepted);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let msg = match output.status.code() {
            Some(code) => format!("Checker exited with {}", code),
            None => "Checker terminated by signal".to_owned(),
        };
        Ok(Verdict::WrongAnswer(match stderr.lines().next() {
            Some(first_line) => format!("{}: {}", msg, first_line),
            None => msg,
        }))
    }
}
