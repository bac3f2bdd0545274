pub mod builder;
pub mod checker;
pub mod error;
pub mod result;
pub mod runner;
pub mod testcase;

#[cfg(test)]
pub(crate) mod test_util;

pub use builder::*;
pub use checker::*;
pub use error::*;
pub use result::*;
pub use runner::*;
pub use testcase::*;
