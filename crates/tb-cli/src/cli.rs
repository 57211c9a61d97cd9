//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::dashboard::DashboardArgs;
use crate::commands::export::ExportArgs;
use crate::commands::report::ReportArgs;

/// Time-block tracker.
///
/// Logs time blocks by category (growth, maintenance, shrink) and reports
/// how tracked time splits across days, weeks and months.
#[derive(Debug, Parser)]
#[command(name = "tb", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a JSON Lines session: one request per stdin line, one reply per stdout line.
    Session {
        /// Entries file (JSON Lines) to load into the session before reading requests.
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Show category totals for a day, week or month.
    Report(ReportArgs),

    /// Show the analytics dashboard for a trailing or custom range.
    Dashboard(DashboardArgs),

    /// Export entries and analytics for a range as JSON.
    Export(ExportArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_view() {
        let cli = Cli::try_parse_from(["tb", "report", "--view", "month", "--back", "2"]).unwrap();
        let Some(Commands::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.view, tb_core::ViewKind::Month);
        assert_eq!(args.back, 2);
    }

    #[test]
    fn test_parse_rejects_unknown_view() {
        assert!(Cli::try_parse_from(["tb", "report", "--view", "year"]).is_err());
    }
}
