use taskpool_core::Config;

use crate::{cmd::GlobalArgs, util};

/// `--config` if given, otherwise the nearest `taskpool.toml` or the per-user one.
pub fn load(args: &GlobalArgs) -> anyhow::Result<Config> {
    let cfg = Config::locate(args.config.as_deref(), util::current_dir())?;
    if let Some(path) = &cfg.source_config_file {
        log::debug!("Loaded config {:?}", util::replace_homedir_to_tilde(path));
    }
    Ok(cfg)
}
