use std::{
    collections::HashMap,
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Stdio,
};

use anyhow::{ensure, Context as _};
use tokio::process::Command;

use super::error::Error;
use crate::config::BuildConfig;
use crate::str_interp::{interp, InterpError};

/// Runs the configured build command (`<shell> -c <command>`) to turn the work file
/// into a single executable.
#[derive(Debug, Clone)]
pub struct Builder {
    shell: PathBuf,
    command: String,
}

impl Builder {
    pub fn new(cfg: &BuildConfig) -> Self {
        Self {
            shell: cfg.shell.to_owned(),
            command: cfg.command.to_owned(),
        }
    }

    /// The build command with `#{workFile}`, `#{binPath}` and `#{poolDir}` filled in.
    pub fn command_for(
        &self,
        work_file: &Path,
        binary: &Path,
    ) -> std::result::Result<String, InterpError> {
        let pool_dir = binary.parent().unwrap_or(Path::new("."));
        let mut vars: HashMap<&'static str, &OsStr> = HashMap::new();
        vars.insert("workFile", work_file.as_os_str());
        vars.insert("binPath", binary.as_os_str());
        vars.insert("poolDir", pool_dir.as_os_str());
        interp(&self.command, &vars)
    }

    /// Builds `binary` from `work_file`, working in the binary's directory.
    /// A stale binary is removed first so a failed build never leaves an old one behind.
    pub async fn build(&self, work_file: &Path, binary: &Path) -> anyhow::Result<()> {
        fsutil::remove_file_if_exists(binary)?;

        let cmd = self
            .command_for(work_file, binary)
            .context("Invalid build command")?;
        let work_dir = binary.parent().unwrap_or(Path::new("."));
        log::info!("Compiling {:?}", work_file);
        log::info!("{}", cmd);

        let output = Command::new(&self.shell)
            .args(["-c", &cmd])
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to spawn '{} -c {}'",
                    self.shell.to_string_lossy(),
                    cmd
                )
            })?;

        if !output.status.success() {
            return Err(Error::Compilation {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }
        ensure!(
            binary.is_file(),
            "Build command succeeded but did not produce {:?}",
            binary
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::test_util;

    #[test]
    fn command_is_interpolated() {
        let b = Builder::new(&BuildConfig {
            shell: "/bin/sh".into(),
            command: "go build -o #{binPath} #{workFile} # in #{poolDir}".into(),
        });
        let cmd = b
            .command_for(Path::new("/w/a.go"), Path::new("/s/__pool__/solution"))
            .unwrap();
        assert_eq!(cmd, "go build -o /s/__pool__/solution /w/a.go # in /s/__pool__");
    }

    #[tokio::test]
    async fn build_produces_binary() {
        let dir = tempfile::tempdir().unwrap();
        let work_file = dir.path().join("main.sh");
        fsutil::write(&work_file, "#!/bin/sh\necho hi\n").unwrap();
        let binary = dir.path().join("solution");
        fsutil::write(&binary, "stale").unwrap();

        Builder::new(&test_util::script_build_config())
            .build(&work_file, &binary)
            .await
            .unwrap();
        assert_eq!(
            fsutil::read_to_string(&binary).unwrap(),
            "#!/bin/sh\necho hi\n"
        );
    }

    #[tokio::test]
    async fn compile_error_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("solution");
        fsutil::write(&binary, "stale").unwrap();

        let b = Builder::new(&BuildConfig {
            shell: "/bin/sh".into(),
            command: "echo 'main.go:3: undefined: x' >&2; exit 2".into(),
        });
        let err = b
            .build(&dir.path().join("main.go"), &binary)
            .await
            .unwrap_err();
        let err = dbg!(err).downcast::<Error>().unwrap();
        match err {
            Error::Compilation { code, stderr } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "main.go:3: undefined: x\n");
            }
            e => panic!("unexpected error: {:?}", e),
        }
        assert!(!binary.exists(), "stale binary must be removed");
    }

    #[tokio::test]
    async fn missing_output_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let b = Builder::new(&BuildConfig {
            shell: "/bin/sh".into(),
            command: "true".into(),
        });
        assert!(b
            .build(&dir.path().join("main.go"), &dir.path().join("solution"))
            .await
            .is_err());
    }
}
