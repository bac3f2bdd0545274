use taskpool_core::{action, print_success};

use crate::config;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    pub contest: String,
    pub task: String,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;
    super::offer_archive(&cfg)?;

    let session = action::restore_session(&cfg, &args.contest, &args.task)?;
    print_success!("Restored session {}/{}", session.contest, session.task);
    print!("{}", session);
    Ok(())
}
