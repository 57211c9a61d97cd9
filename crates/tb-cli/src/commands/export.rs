//! Implementation of the `tb export` command.
//!
//! Writes the `{entries, analytics, dateRange}` bundle for one window as
//! pretty JSON, stamped with when and where it was generated.

use std::io::{BufWriter, Write, stdout};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tb_core::ExportBundle;

use super::dashboard::WindowArgs;
use crate::Config;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub window: WindowArgs,
}

/// Export document: the bundle plus generation metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    #[serde(flatten)]
    pub bundle: ExportBundle,
}

impl ExportDocument {
    pub fn new(bundle: ExportBundle, generated_at: DateTime<Utc>) -> Self {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        Self {
            generated_at,
            timezone,
            bundle,
        }
    }
}

/// Runs the export command.
pub fn run(args: &ExportArgs, config: &Config) -> Result<()> {
    let (store, window) = args.window.load(config)?;
    let bundle = ExportBundle::build(store.entries(), window);
    let document = ExportDocument::new(bundle, Utc::now());

    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, &document).context("failed to serialize export")?;
    writeln!(writer).context("failed to write export")?;
    writer.flush().context("failed to flush export")?;
    Ok(())
}
