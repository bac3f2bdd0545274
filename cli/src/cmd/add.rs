use std::path::PathBuf;

use anyhow::Context as _;
use taskpool_core::{action, interactive, print_success};

use crate::config;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Read the input from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Read the expected answer from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub answer: Option<PathBuf>,
}

/// Test files are kept as raw bytes; they need not be UTF-8.
fn read_or_ask(file: &Option<PathBuf>, prompt: &str) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => fsutil::read(path)
            .with_context(|| format!("Failed to read {}", path.to_string_lossy())),
        None => Ok(interactive::read_stdin_to_end(prompt)?),
    }
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;

    let input = read_or_ask(&args.input, "Input:")?;
    let answer = read_or_ask(&args.answer, "Answer (empty if unknown):")?;

    let id = action::add_test(&cfg, &input, &answer)?;
    print_success!("Added test #{}", id);
    Ok(())
}
