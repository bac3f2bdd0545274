//! Helpers for tests that need a runnable "solution". Solutions are shell scripts;
//! "building" one copies it into place and marks it executable.

use std::path::Path;

use crate::config::BuildConfig;
use crate::testing::Builder;

pub(crate) fn script_build_config() -> BuildConfig {
    BuildConfig {
        shell: "/bin/sh".into(),
        command: "cp #{workFile} #{binPath} && chmod +x #{binPath}".into(),
    }
}

/// Writes `script` as `<binary>.sh` and builds it into `binary`.
pub(crate) async fn build_script(script: &str, binary: &Path) {
    let work_file = binary.with_extension("sh");
    fsutil::write(&work_file, format!("#!/bin/sh\n{}", script)).unwrap();
    Builder::new(&script_build_config())
        .build(&work_file, binary)
        .await
        .unwrap();
}
