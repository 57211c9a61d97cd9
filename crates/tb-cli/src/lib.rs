//! Timeblocks CLI library.
//!
//! This crate provides the `tb` command-line interface over `tb-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
