use taskpool_core::{action, print_success, storage::TestId};

use crate::config;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Test to remove. Tests after it are renumbered.
    pub id: TestId,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;
    action::remove_test(&cfg, args.id)?;
    print_success!("Removed test #{}", args.id);
    Ok(())
}
