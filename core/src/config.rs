use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use anyhow::{bail, Context as _};
use rust_embed::RustEmbed;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    /// The solution source file the user is editing
    pub work_file: PathBuf,
    /// Holds `session.json` and the numbered test files
    pub session_dir: PathBuf,
    pub archive_dir: PathBuf,
    /// Starter template for the work file; the embedded one is used if unset
    #[serde(default)]
    pub template: Option<PathBuf>,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "BuildConfig::default_shell")]
    pub shell: PathBuf,
    /// Interpolated with `#{workFile}`, `#{binPath}` and `#{poolDir}`
    pub command: String,
}

#[derive(RustEmbed)]
#[folder = "assets/"]
pub(crate) struct Asset;

impl Asset {
    pub(crate) fn get_str(name: &str) -> anyhow::Result<String> {
        let file = Self::get(name).with_context(|| format!("Missing embedded asset '{}'", name))?;
        let s = std::str::from_utf8(file.data.as_ref())
            .with_context(|| format!("Embedded asset '{}' is not UTF-8", name))?;
        Ok(s.to_owned())
    }
}

impl BuildConfig {
    fn default_shell() -> PathBuf {
        PathBuf::from("/bin/sh")
    }
}

impl Config {
    pub const FILENAME: &str = "taskpool.toml";
    pub const APP_NAME: &str = "taskpool";

    pub fn example_toml() -> anyhow::Result<String> {
        Asset::get_str(Self::FILENAME)
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Parses the file and resolves its relative paths against the file's directory.
    pub fn from_toml_file(filepath: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let filepath = filepath.into();
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        let base_dir = filepath
            .parent()
            .map(Path::to_owned)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(cfg.with_base_dir(&base_dir, Some(filepath)))
    }

    fn with_base_dir(mut self, base_dir: &Path, source: Option<PathBuf>) -> Self {
        let resolve = |path: PathBuf| {
            let path = expand_tilde(path);
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path.strip_prefix(".").unwrap_or(&path))
            }
        };
        self.work_file = resolve(self.work_file);
        self.session_dir = resolve(self.session_dir);
        self.archive_dir = resolve(self.archive_dir);
        self.template = self.template.map(resolve);
        self.source_config_file = source;
        self
    }

    /// Find config file in ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// `<user config dir>/taskpool/taskpool.toml`
    pub fn user_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_NAME).join(Self::FILENAME))
    }

    /// Explicit path first, then the nearest ancestor config, then the per-user one.
    pub fn locate(explicit: Option<&Path>, cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_toml_file(path);
        }
        if let Some(path) = Self::find_file_in_ancestors(&cur_dir) {
            log::debug!("Using config {:?}", path);
            return Self::from_toml_file(path);
        }
        match Self::user_config_file() {
            Some(path) if path.is_file() => Self::from_toml_file(path),
            _ => bail!(
                "Cannot find '{}' in current dir, its ancestors or the user config dir (hint: run `{} init`)",
                Self::FILENAME,
                Self::APP_NAME,
            ),
        }
    }

    /// Writes the example config into `dir`. Never overwrites an existing config.
    pub fn init_with_example(dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        let config_filepath = dir.as_ref().join(Self::FILENAME);
        if config_filepath.exists() {
            bail!(
                "Config already exists.\nIf it's intentional, remove {:?} and then try again.",
                config_filepath
            );
        }
        fsutil::write_with_mkdir(&config_filepath, Self::example_toml()?)?;
        Ok(config_filepath)
    }
}

fn expand_tilde(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}
