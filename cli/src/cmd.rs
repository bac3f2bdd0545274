pub mod add;
pub mod archive;
pub mod create;
pub mod init;
pub mod ls;
pub mod restore;
pub mod rm;

use std::path::PathBuf;

use taskpool_core::{action, interactive::util::ask_confirm, print_success, Config, Session};

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Path to taskpool.toml (default: nearest one in current dir or its ancestors)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Init(init::Args),
    Create(create::Args),
    Add(add::Args),
    Rm(rm::Args),

    #[command(alias("t"))]
    Test(test::Args),

    Ls(ls::Args),
    Archive(archive::Args),
    Restore(restore::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Init(args) => init::exec(args, self),
            Create(args) => create::exec(args, self),
            Add(args) => add::exec(args, self),
            Rm(args) => rm::exec(args, self),
            Test(args) => test::exec(args, self).await,
            Ls(args) => ls::exec(args, self),
            Archive(args) => archive::exec(args, self),
            Restore(args) => restore::exec(args, self),
        }
    }
}

/// Asks whether to archive the current session before it gets replaced.
/// Does nothing if there is no session or it is already archived.
fn offer_archive(cfg: &Config) -> SubcmdResult {
    if !Session::filepath(&cfg.session_dir).is_file() || action::is_archived(cfg)? {
        return Ok(());
    }
    let session = Session::load(&cfg.session_dir)?;
    let prompt = format!(
        "Session {}/{} is not archived. Archive it now?",
        session.contest, session.task
    );
    if ask_confirm(&prompt, true)? {
        let dest = action::archive_session(cfg, false)?;
        print_success!("Archived to {}", dest.to_string_lossy());
    }
    Ok(())
}
