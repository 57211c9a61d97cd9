//! CLI subcommand implementations.

pub mod dashboard;
pub mod export;
pub mod report;
pub mod session;
pub mod util;
