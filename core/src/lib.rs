pub mod action;
pub mod config;
pub mod interactive;
pub mod report;
pub mod session;
pub mod storage;
pub mod str_interp;
pub mod style;
pub mod template;
pub mod testing;

pub use crate::config::Config;
pub use crate::session::Session;

pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
