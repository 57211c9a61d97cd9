//! Report command for calendar-view statistics.
//!
//! This module implements `tb report` for day, week and month views
//! with human-readable and JSON output.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use tb_core::{Analytics, Category, DateWindow, EntryStore, ViewKind, aggregate, format_minutes};

use super::util::{load_store, parse_date};
use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Entries file (JSON Lines). Defaults to the configured path.
    #[arg(long)]
    pub entries: Option<std::path::PathBuf>,

    /// View granularity: day, week or month.
    #[arg(long, default_value = "week")]
    pub view: ViewKind,

    /// Anchor date (YYYY-MM-DD, today, yesterday, "N days ago"). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Step the view back this many periods from the anchor.
    #[arg(long, default_value_t = 0)]
    pub back: u32,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Computed report data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub window: DateWindow,
    pub analytics: Analytics,
}

// ========== Report Generation ==========

/// Resolves the window for a view, `back` periods before `anchor`.
pub fn resolve_window(view: ViewKind, anchor: NaiveDate, back: u32) -> Result<DateWindow> {
    let periods = i32::try_from(back).context("--back is too large")?;
    let anchor = view.step(anchor, -periods)?;
    Ok(DateWindow::for_view(view, anchor)?)
}

/// Generates report data from a store.
pub fn generate_report_data(store: &EntryStore, window: DateWindow) -> ReportData {
    let entries = store.query_window(&window);
    ReportData {
        window,
        analytics: aggregate(&entries, &window),
    }
}

// ========== Formatting ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Describes a window for a report header.
pub fn describe_window(window: &DateWindow) -> String {
    match window.kind {
        ViewKind::Day => window.start.format("%A, %b %-d, %Y").to_string(),
        ViewKind::Week => format!("Week of {}", window.start.format("%b %-d, %Y")),
        ViewKind::Month => window.start.format("%B %Y").to_string(),
        ViewKind::Custom => format!(
            "{} - {}",
            window.start.format("%b %-d, %Y"),
            window.end.format("%b %-d, %Y")
        ),
    }
}

/// Writes the per-category breakdown shared by `report` and `dashboard`.
pub fn write_categories(output: &mut String, analytics: &Analytics) {
    writeln!(output, "BY CATEGORY").unwrap();
    writeln!(output, "───────────").unwrap();
    for category in Category::ALL {
        let stats = analytics.category(category);
        let bar = progress_bar(stats.minutes, analytics.total_minutes);
        let noun = if stats.count == 1 { "entry" } else { "entries" };
        writeln!(
            output,
            "{:<12} {:>7}  {bar}  {} {noun}",
            category.label(),
            format_minutes(stats.minutes),
            stats.count
        )
        .unwrap();
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();
    let analytics = &data.analytics;

    writeln!(output, "TIME REPORT: {}", describe_window(&data.window)).unwrap();

    if analytics.entry_count() == 0 {
        writeln!(output).unwrap();
        writeln!(output, "No entries recorded this {}.", data.window.kind).unwrap();
        writeln!(
            output,
            "Undocumented:  {}h of {}h",
            analytics.undocumented_hours, analytics.total_possible_hours
        )
        .unwrap();
        return output;
    }

    writeln!(output).unwrap();
    write_categories(&mut output, analytics);

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(
        output,
        "Tracked:       {}h of {}h",
        analytics.total_hours, analytics.total_possible_hours
    )
    .unwrap();
    writeln!(output, "Undocumented:  {}h", analytics.undocumented_hours).unwrap();
    writeln!(output, "Productivity:  {}%", analytics.productivity_score).unwrap();

    output
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(args: &ReportArgs, config: &Config) -> Result<()> {
    let path = args.entries.as_deref().unwrap_or(&config.entries_path);
    let store = load_store(path)?;

    let anchor = args.date.unwrap_or_else(|| Local::now().date_naive());
    let window = resolve_window(args.view, anchor, args.back)?;
    let data = generate_report_data(&store, window);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print!("{}", format_report(&data));
    }

    Ok(())
}
