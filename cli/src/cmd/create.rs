use taskpool_core::{
    action,
    interactive::{self, util::ask_confirm},
    print_success, Session,
};

use crate::config;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {}

pub fn exec(_args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;
    super::offer_archive(&cfg)?;

    // Keep the contest name: the next task is usually from the same contest
    let mut defaults = Session::default();
    if let Ok(current) = Session::load(&cfg.session_dir) {
        defaults.contest = current.contest;
    }
    let session = interactive::ask_session(&defaults)?;
    session.validate()?;

    let write_work_file = !cfg.work_file.exists()
        || ask_confirm(
            &format!(
                "Overwrite {} with the template?",
                cfg.work_file.to_string_lossy()
            ),
            false,
        )?;

    action::create_session(&cfg, &session, write_work_file)?;
    print_success!(
        "Created session {}/{} in {}",
        session.contest,
        session.task,
        cfg.session_dir.to_string_lossy()
    );
    Ok(())
}
