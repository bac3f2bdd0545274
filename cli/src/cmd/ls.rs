use std::io;

use taskpool_core::{action, report};

use crate::config;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {}

pub fn exec(_args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;
    let (session, tests) = action::list_session(&cfg)?;
    report::write_listing(&mut io::stdout().lock(), &session, &tests)?;
    Ok(())
}
