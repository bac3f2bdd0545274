use std::{
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::process::Command;

use super::testcase::StagedTest;
use crate::session::{IoTarget, Session};
use crate::storage::TestPool;

/// How one execution of the candidate program ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Exited with code 0 within the time limit
    Finished,
    /// Non-zero exit, death by signal, or failure to launch
    RuntimeError(String),
    /// Killed after the time limit expired
    TimeLimitExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub status: RunStatus,
    /// From just before launch until the process was reaped
    pub elapsed: Duration,
}

/// Runs the built solution against staged tests, one at a time.
#[derive(Debug, Clone)]
pub struct TestRunner {
    binary: PathBuf,
    work_dir: PathBuf,
    input: IoTarget,
    output: IoTarget,
    execution_time_limit: Duration,
}

impl TestRunner {
    const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_millis(1000);

    pub fn new(binary: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            work_dir: work_dir.into(),
            input: IoTarget::Std,
            output: IoTarget::Std,
            execution_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
        }
    }

    pub fn for_session(pool: &TestPool, session: &Session) -> Self {
        Self::new(pool.binary_file(), pool.dir())
            .input(session.input.clone())
            .output(session.output.clone())
            .execution_time_limit(session.time_limit())
    }

    pub fn input(mut self, input: IoTarget) -> Self {
        self.input = input;
        self
    }

    pub fn output(mut self, output: IoTarget) -> Self {
        self.output = output;
        self
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    /// Runs the solution on one test.
    ///
    /// Input comes from `{id}.in`, either on stdin or through a hard link named after the
    /// session's input file that exists only while the process runs. Output lands in
    /// `{id}.out`, either from stdout or by renaming the session's output file afterwards.
    /// Errors are returned only for pool I/O failures; anything the program does wrong is
    /// reported in [`Execution::status`].
    pub async fn run(&self, t: &StagedTest) -> anyhow::Result<Execution> {
        let input_link = self.input.file_name().map(|name| self.work_dir.join(name));

        let stdin = match &input_link {
            None => Stdio::from(fsutil::open_file(&t.input)?),
            Some(link) => {
                fsutil::remove_file_if_exists(link)?;
                fsutil::hard_link(&t.input, link)?;
                Stdio::null()
            }
        };
        let stdout = match &self.output {
            IoTarget::Std => Stdio::from(fsutil::create_file(&t.output)?),
            IoTarget::File(_) => {
                fsutil::remove_file_if_exists(&t.output)?;
                Stdio::null()
            }
        };

        let execution = self.launch_and_wait(stdin, stdout).await;
        log::debug!("Test {}: {:?}", t.name(), execution);

        if let Some(link) = &input_link {
            fsutil::remove_file_if_exists(link)?;
        }
        if let Some(name) = self.output.file_name() {
            let produced = self.work_dir.join(name);
            // A missing file is left for the checker to reject
            if produced.is_file() {
                fsutil::rename(&produced, &t.output)?;
            }
        }
        Ok(execution)
    }

    async fn launch_and_wait(&self, stdin: Stdio, stdout: Stdio) -> Execution {
        let start_at = tokio::time::Instant::now();

        let spawned = Command::new(&self.binary)
            .current_dir(&self.work_dir)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut proc = match spawned {
            Ok(proc) => proc,
            Err(e) => {
                return Execution {
                    status: RunStatus::RuntimeError(format!(
                        "Failed to launch {:?}: {}",
                        self.binary, e
                    )),
                    elapsed: start_at.elapsed(),
                }
            }
        };

        let res = tokio::time::timeout(self.execution_time_limit, proc.wait()).await;

        let status = match res {
            Err(_) => {
                // kill() also reaps the process
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                RunStatus::TimeLimitExceeded
            }
            Ok(Err(e)) => RunStatus::RuntimeError(format!("Failed to wait for process: {}", e)),
            Ok(Ok(exit_status)) if exit_status.success() => RunStatus::Finished,
            Ok(Ok(exit_status)) => RunStatus::RuntimeError(describe_exit(exit_status)),
        };

        Execution {
            status,
            elapsed: start_at.elapsed(),
        }
    }
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exitcode={}", code),
        None => "process terminated by signal".to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::TestStore;
    use crate::testing::test_util;

    struct X {
        input: &'static str,
        script: &'static str,
        io: (&'static str, &'static str),
        time_limit_ms: u64,
    }

    struct Ran {
        _dir: tempfile::TempDir,
        pool: TestPool,
        test: StagedTest,
        res: Execution,
    }

    async fn run_test(x: X) -> Ran {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add(x.input, "").unwrap();
        let pool = TestPool::new(dir.path());
        let staged = pool.prepare(&store).unwrap();
        test_util::build_script(x.script, &pool.binary_file()).await;

        let runner = TestRunner::new(pool.binary_file(), pool.dir())
            .input(x.io.0.into())
            .output(x.io.1.into())
            .execution_time_limit(Duration::from_millis(x.time_limit_ms));
        let res = dbg!(runner.run(&staged[0]).await).unwrap();
        Ran {
            _dir: dir,
            pool,
            test: staged[0].clone(),
            res,
        }
    }

    fn output_of(r: &Ran) -> String {
        fsutil::read_to_string(&r.test.output).unwrap()
    }

    #[tokio::test]
    async fn should_finish_with_stdio() {
        let r = run_test(X {
            input: "3 4\n",
            script: "read a b; echo $((a + b))",
            io: ("*", "*"),
            time_limit_ms: 2000,
        })
        .await;
        assert_eq!(r.res.status, RunStatus::Finished);
        assert_eq!(output_of(&r), "7\n");
        assert!(r.res.elapsed < Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn should_finish_with_named_files() {
        let r = run_test(X {
            input: "3 4\n",
            script: "read a b < input.txt; echo $((a * b)) > output.txt",
            io: ("input.txt", "output.txt"),
            time_limit_ms: 2000,
        })
        .await;
        assert_eq!(r.res.status, RunStatus::Finished);
        assert_eq!(output_of(&r), "12\n");
        assert!(
            !r.pool.dir().join("input.txt").exists(),
            "input link must be removed after the run"
        );
        assert!(!r.pool.dir().join("output.txt").exists());
        assert_eq!(fsutil::read_to_string(&r.test.input).unwrap(), "3 4\n");
    }

    #[tokio::test]
    async fn missing_named_output_is_not_detected_here() {
        let r = run_test(X {
            input: "1\n",
            script: "exit 0",
            io: ("*", "output.txt"),
            time_limit_ms: 2000,
        })
        .await;
        assert_eq!(r.res.status, RunStatus::Finished);
        assert!(!r.test.output.exists());
    }

    #[tokio::test]
    async fn should_be_re_even_if_stdout_is_correct() {
        let r = run_test(X {
            input: "1\n",
            script: "echo 1; exit 42",
            io: ("*", "*"),
            time_limit_ms: 2000,
        })
        .await;
        assert_eq!(r.res.status, RunStatus::RuntimeError("exitcode=42".into()));
        assert_eq!(output_of(&r), "1\n");
    }

    #[tokio::test]
    async fn input_link_is_removed_after_failure() {
        let r = run_test(X {
            input: "1\n",
            script: "exit 1",
            io: ("input.txt", "*"),
            time_limit_ms: 2000,
        })
        .await;
        assert!(matches!(r.res.status, RunStatus::RuntimeError(_)));
        assert!(!r.pool.dir().join("input.txt").exists());
    }

    #[tokio::test]
    async fn should_be_tle_and_process_killed() {
        let r = run_test(X {
            input: "1\n",
            script: "echo $$ > pid.txt; while :; do :; done",
            io: ("*", "*"),
            time_limit_ms: 300,
        })
        .await;
        assert_eq!(r.res.status, RunStatus::TimeLimitExceeded);
        assert!(r.res.elapsed >= Duration::from_millis(300));
        assert!(r.res.elapsed < Duration::from_millis(2000));

        let pid = fsutil::read_to_string(r.pool.dir().join("pid.txt")).unwrap();
        let alive = std::process::Command::new("kill")
            .args(["-0", pid.trim()])
            .stderr(Stdio::null())
            .status()
            .unwrap()
            .success();
        assert!(!alive, "process {} must not be running", pid.trim());
    }

    #[tokio::test]
    async fn missing_binary_is_re() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("1\n", "").unwrap();
        let pool = TestPool::new(dir.path());
        let staged = pool.prepare(&store).unwrap();

        let res = TestRunner::new(pool.binary_file(), pool.dir())
            .run(&staged[0])
            .await
            .unwrap();
        assert!(matches!(res.status, RunStatus::RuntimeError(_)));
    }
}
