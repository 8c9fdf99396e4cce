//! Command line harness for the glasma MV benchmark.
//!
//! - **cli**: clap argument surface and precedence merging
//! - **config**: TOML run configuration file

pub mod cli;
pub mod config;

pub use cli::{Args, Mode, RunOptions};
pub use config::RunConfig;
