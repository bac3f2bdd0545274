use std::path::{Path, PathBuf};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::error::*;
use crate::interactive::SpinnerExt;
use crate::report;
use crate::session::Session;
use crate::storage::{ArchiveHome, StoredTest, TestId, TestPool, TestStore};
use crate::style;
use crate::template;
use crate::testing::{
    checker_for, Builder, Checker, ExecutionResult, Outcome, RunStatus, StagedTest, TestRunner,
    Verdict,
};

pub fn init_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
    Config::init_with_example(dir).context("Failed to init taskpool config")
}

pub fn add_test(cfg: &Config, input: &[u8], answer: &[u8]) -> Result<TestId> {
    let id = TestStore::new(&cfg.session_dir)
        .add(input, answer)
        .context("Failed to add test")?;
    Ok(id)
}

pub fn remove_test(cfg: &Config, id: TestId) -> Result<()> {
    TestStore::new(&cfg.session_dir).remove(id)?;
    Ok(())
}

/// Returns the current session and its tests. Test files left behind a gap are not
/// listed; they are reported with a warning.
pub fn list_session(cfg: &Config) -> Result<(Session, Vec<StoredTest>)> {
    let session = Session::load_or_init(&cfg.session_dir)?;
    let store = TestStore::new(&cfg.session_dir);
    let tests = store.list();

    let stray = store.stray_ids()?;
    if !stray.is_empty() {
        log::warn!(
            "Ignoring test files after test #{}: {:?} (ids are not contiguous)",
            tests.len() + 1,
            stray
        );
    }
    Ok((session, tests))
}

/// Starts a fresh session: wipes the session dir, saves `session` and writes the starter
/// template to the work file (only if `write_work_file`).
pub fn create_session(cfg: &Config, session: &Session, write_work_file: bool) -> Result<()> {
    session.validate()?;
    fsutil::remove_dir_all_if_exists(&cfg.session_dir)?;
    fsutil::mkdir_all(&cfg.session_dir)?;
    session.save(&cfg.session_dir)?;

    if write_work_file {
        let src = template::render(session, cfg.template.as_deref())?;
        fsutil::write_with_mkdir(&cfg.work_file, src)
            .context("Failed to write the work file")?;
    }
    Ok(())
}

pub fn is_archived(cfg: &Config) -> Result<bool> {
    let session = Session::load_or_init(&cfg.session_dir)?;
    Ok(ArchiveHome::new(&cfg.archive_dir).is_archived(&session))
}

pub fn archive_session(cfg: &Config, overwrite: bool) -> Result<PathBuf> {
    let session = Session::load(&cfg.session_dir).context("No session to archive")?;
    let dest = ArchiveHome::new(&cfg.archive_dir)
        .archive(&session, &cfg.session_dir, &cfg.work_file, overwrite)
        .with_context(|| format!("Failed to archive {}/{}", session.contest, session.task))?;
    Ok(dest)
}

pub fn restore_session(cfg: &Config, contest: &str, task: &str) -> Result<Session> {
    ArchiveHome::new(&cfg.archive_dir)
        .restore(contest, task, &cfg.session_dir, &cfg.work_file)
        .with_context(|| format!("Failed to restore {}/{}", contest, task))?;
    Session::load(&cfg.session_dir)
}

async fn judge(
    runner: &TestRunner,
    checker: &dyn Checker,
    t: &StagedTest,
) -> Result<ExecutionResult> {
    let exec = runner.run(t).await?;

    let (outcome, detail) = match exec.status {
        RunStatus::TimeLimitExceeded => (Outcome::TLE, None),
        RunStatus::RuntimeError(msg) => (Outcome::RE, Some(msg)),
        RunStatus::Finished => match t.answer() {
            None => (Outcome::OK, None),
            Some(answer) => match checker.check(t, answer).await? {
                Verdict::Accepted => (Outcome::OK, None),
                Verdict::WrongAnswer(msg) => (Outcome::WA, Some(msg)),
            },
        },
    };
    Ok(ExecutionResult {
        id: t.id,
        outcome,
        elapsed: exec.elapsed,
        detail,
    })
}

/// Builds the work file once and judges every stored test in ascending id order.
///
/// Fails before running anything if the checker is missing or the build fails; the build
/// still happens when there are no tests. Per-test failures are [`Outcome`]s, not errors.
pub async fn run_tests(cfg: &Config, session: &Session) -> Result<Vec<ExecutionResult>> {
    session.validate()?;
    let pool = TestPool::new(&cfg.session_dir);
    let store = TestStore::new(&cfg.session_dir);
    let checker = checker_for(&session.checker, pool.dir())?;

    let work_file = fsutil::canonicalize_path(&cfg.work_file)
        .with_context(|| format!("Work file {:?} not found", cfg.work_file))?;

    let staged = pool.prepare(&store).context("Failed to stage tests")?;
    if staged.is_empty() {
        log::warn!("No tests in {:?}", cfg.session_dir);
    }

    Builder::new(&cfg.build)
        .build(&work_file, &pool.binary_file())
        .await?;

    let runner = TestRunner::for_session(&pool, session);
    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .context("Bad spinner template")?;

    log::info!("Running {} test(s)", staged.len());
    let mut results = Vec::with_capacity(staged.len());
    for t in &staged {
        let spinner = ProgressBar::new_spinner()
            .with_style(spinner_style.clone())
            .with_message(format!("Test {} ...", t.name()))
            .with_ticking();

        let res = judge(&runner, checker.as_ref(), t).await;

        let spinner = spinner.lock().await;
        match &res {
            Ok(r) => spinner.finish_with_message(
                format!(
                    "Test {} ... {} [{}ms]",
                    t.name(),
                    style::outcome_icon(r.outcome),
                    r.elapsed.as_millis(),
                )
                .cyan()
                .to_string(),
            ),
            Err(_) => spinner.abandon(),
        }
        results.push(res?);
    }
    Ok(results)
}

/// `test` subcommand: judges the current session and prints the report.
pub async fn test_all(cfg: &Config) -> Result<Vec<ExecutionResult>> {
    let session = Session::load_or_init(&cfg.session_dir)?;
    let results = run_tests(cfg, &session).await?;
    report::print_report(&TestPool::new(&cfg.session_dir), &results)?;
    Ok(results)
}
