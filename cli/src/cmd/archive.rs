use taskpool_core::{action, interactive::util::ask_confirm, print_success};

use crate::config;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Overwrite an existing archive without asking
    #[arg(short, long)]
    pub force: bool,
}

pub fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;

    let overwrite = args.force
        || (action::is_archived(&cfg)?
            && ask_confirm("Archive already exists. Overwrite it?", false)?);

    let dest = action::archive_session(&cfg, overwrite)?;
    print_success!("Archived to {}", dest.to_string_lossy());
    Ok(())
}
