use std::path::PathBuf;

/// Errors that abort a whole test run. Per-test failures are [`super::Outcome`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Compilation error ({})\n{stderr}", describe_code(.code))]
    Compilation { code: Option<i32>, stderr: String },

    #[error("Checker not found: {0:?}")]
    MissingChecker(PathBuf),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exitcode={}", code),
        None => "terminated by signal".to_owned(),
    }
}
