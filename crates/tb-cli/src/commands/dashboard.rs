//! Dashboard command for trailing-range analytics.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use tb_core::{
    ActivitySummary, Analytics, DailyTotals, DashboardRange, DateWindow, EntryStore, Insight,
    Tone, aggregate, daily_trend, format_minutes, insights, top_activities,
};

use super::report::{describe_window, progress_bar, write_categories};
use super::util::{load_store, parse_date, trailing_or_custom};
use crate::Config;

/// Window selection shared by `dashboard` and `export`.
#[derive(Debug, Args)]
pub struct WindowArgs {
    /// Entries file (JSON Lines). Defaults to the configured path.
    #[arg(long)]
    pub entries: Option<PathBuf>,

    /// Trailing range: 7d, 14d or 30d. Defaults to the configured range.
    #[arg(long)]
    pub range: Option<DashboardRange>,

    /// First date of a custom range.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date of a custom range.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Date treated as today. Defaults to the local date.
    #[arg(long, value_parser = parse_date)]
    pub today: Option<NaiveDate>,
}

impl WindowArgs {
    /// Resolves the window and loads the entries file.
    pub fn load(&self, config: &Config) -> Result<(EntryStore, DateWindow)> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let window = trailing_or_custom(
            self.range,
            self.start,
            self.end,
            today,
            config.dashboard_range,
        )?;
        let path = self.entries.as_deref().unwrap_or(&config.entries_path);
        Ok((load_store(path)?, window))
    }
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Everything the dashboard shows for one window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub window: DateWindow,
    pub analytics: Analytics,
    pub trend: Vec<DailyTotals>,
    pub top_activities: Vec<ActivitySummary>,
    pub insights: Vec<Insight>,
}

impl Dashboard {
    pub fn build(store: &EntryStore, window: DateWindow, top_limit: usize) -> Self {
        let entries = store.query_window(&window);
        let analytics = aggregate(&entries, &window);
        Self {
            window,
            trend: daily_trend(&entries, &window),
            top_activities: top_activities(&entries, top_limit),
            insights: insights(&analytics),
            analytics,
        }
    }
}

// ========== Formatting ==========

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tenths(hours: f64) -> u64 {
    (hours * 10.0).round().max(0.0) as u64
}

const fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "[+]",
        Tone::Neutral => "[-]",
        Tone::Warning => "[!]",
    }
}

/// Formats the human-readable dashboard.
pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let analytics = &dashboard.analytics;

    writeln!(output, "DASHBOARD: {}", describe_window(&dashboard.window)).unwrap();
    writeln!(output).unwrap();

    if analytics.entry_count() == 0 {
        writeln!(output, "No entries recorded in this range.").unwrap();
        return output;
    }

    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(
        output,
        "Tracked:       {}h of {}h",
        analytics.total_hours, analytics.total_possible_hours
    )
    .unwrap();
    writeln!(output, "Undocumented:  {}h", analytics.undocumented_hours).unwrap();
    writeln!(output, "Daily average: {}h", analytics.avg_daily_hours).unwrap();
    writeln!(output, "Productivity:  {}%", analytics.productivity_score).unwrap();
    writeln!(output).unwrap();

    write_categories(&mut output, analytics);
    writeln!(output).unwrap();

    writeln!(output, "DAILY TREND").unwrap();
    writeln!(output, "───────────").unwrap();
    let busiest = dashboard
        .trend
        .iter()
        .map(|day| tenths(day.total))
        .max()
        .unwrap_or(0);
    for day in &dashboard.trend {
        let label = day.date.format("%a %b %-d").to_string();
        let hours = format!("{}h", day.total);
        let bar = progress_bar(tenths(day.total), busiest);
        writeln!(output, "{label:<12} {hours:>6}  {bar}").unwrap();
    }

    if !dashboard.top_activities.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "TOP ACTIVITIES").unwrap();
        writeln!(output, "──────────────").unwrap();
        for (rank, activity) in dashboard.top_activities.iter().enumerate() {
            writeln!(
                output,
                "{}. {:<20} {:>7}  {}",
                rank + 1,
                activity.activity,
                format_minutes(activity.total_minutes),
                activity.category.label()
            )
            .unwrap();
        }
    }

    if !dashboard.insights.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "INSIGHTS").unwrap();
        writeln!(output, "────────").unwrap();
        for insight in &dashboard.insights {
            writeln!(output, "{} {}", tone_marker(insight.tone), insight.message).unwrap();
        }
    }

    output
}

// ========== Public Interface ==========

/// Runs the dashboard command.
pub fn run(args: &DashboardArgs, config: &Config) -> Result<()> {
    let (store, window) = args.window.load(config)?;
    let dashboard = Dashboard::build(&store, window, config.top_activities);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print!("{}", format_dashboard(&dashboard));
    }

    Ok(())
}
