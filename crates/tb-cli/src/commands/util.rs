//! Shared utilities for CLI commands.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Days, Local, NaiveDate};
use regex::Regex;
use tb_core::{DashboardRange, DateWindow, EntryStore, NewEntry, RangeError};

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative date parsing (~1000 years in days).
const MAX_RELATIVE_DAYS: u64 = 1000 * 365;

/// Parse a date argument relative to the local calendar date.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    parse_date_from(s, Local::now().date_naive())
}

/// Parse a date string as either `YYYY-MM-DD` or a date relative to `today`.
///
/// Supports:
/// - ISO 8601 dates: "2026-01-15"
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_date_from(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    match s {
        "today" => return Ok(today),
        "yesterday" => return today.pred_opt().context("date out of range"),
        _ => {}
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2026-01-15), 'today', 'yesterday', or relative (e.g., '3 days ago')"
        );
    };

    let n: u64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date too far back: {n} {}", &caps[2]);
    }

    today
        .checked_sub_days(Days::new(n * days_per_unit))
        .context("date out of range")
}

/// Resolve a trailing preset or explicit boundaries into a window.
///
/// Both boundaries give a custom window. A start alone runs through `today`.
/// An end alone anchors the preset on that date instead of `today`.
pub fn trailing_or_custom(
    range: Option<DashboardRange>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    fallback: DashboardRange,
) -> Result<DateWindow, RangeError> {
    match (start, end) {
        (Some(start), Some(end)) => DateWindow::custom(start, end),
        (Some(start), None) => DateWindow::custom(start, today),
        (None, Some(end)) => range.unwrap_or(fallback).window(end),
        (None, None) => range.unwrap_or(fallback).window(today),
    }
}

/// Parse JSON Lines of entry input, skipping blank lines.
pub fn parse_entries<R: BufRead>(reader: R) -> anyhow::Result<Vec<NewEntry>> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let entry: NewEntry = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid entry on line {}", idx + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Load an entries file into a fresh store.
pub fn load_store(path: &Path) -> anyhow::Result<EntryStore> {
    let file =
        File::open(path).with_context(|| format!("failed to open entries file {}", path.display()))?;
    let entries = parse_entries(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(count = entries.len(), path = %path.display(), "loaded entries");
    Ok(EntryStore::with_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        let today = date(2024, 3, 10);
        assert_eq!(parse_date_from("2024-01-03", today).unwrap(), date(2024, 1, 3));
    }

    #[test]
    fn test_parse_keywords() {
        let today = date(2024, 3, 1);
        assert_eq!(parse_date_from("today", today).unwrap(), today);
        assert_eq!(parse_date_from("yesterday", today).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_parse_relative() {
        let today = date(2024, 3, 10);
        assert_eq!(parse_date_from("3 days ago", today).unwrap(), date(2024, 3, 7));
        assert_eq!(parse_date_from("1 day ago", today).unwrap(), date(2024, 3, 9));
        assert_eq!(parse_date_from("2 weeks ago", today).unwrap(), date(2024, 2, 25));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let today = date(2024, 3, 10);
        assert!(parse_date_from("next tuesday", today).is_err());
        assert!(parse_date_from("2024-13-01", today).is_err());
        assert!(parse_date_from("999999999 weeks ago", today).is_err());
    }

    #[test]
    fn test_trailing_or_custom() {
        let today = date(2024, 3, 10);
        let fallback = DashboardRange::Last7Days;

        let window = trailing_or_custom(None, None, None, today, fallback).unwrap();
        assert_eq!((window.start, window.end), (date(2024, 3, 4), today));

        let window =
            trailing_or_custom(Some(DashboardRange::Last14Days), None, None, today, fallback)
                .unwrap();
        assert_eq!(window.num_days(), 14);

        let window =
            trailing_or_custom(None, Some(date(2024, 3, 1)), None, today, fallback).unwrap();
        assert_eq!((window.start, window.end), (date(2024, 3, 1), today));

        let window =
            trailing_or_custom(None, None, Some(date(2024, 2, 7)), today, fallback).unwrap();
        assert_eq!((window.start, window.end), (date(2024, 2, 1), date(2024, 2, 7)));
    }

    #[test]
    fn test_trailing_or_custom_rejects_inverted() {
        let today = date(2024, 3, 10);
        let err = trailing_or_custom(
            None,
            Some(date(2024, 3, 5)),
            Some(date(2024, 3, 1)),
            today,
            DashboardRange::Last7Days,
        )
        .unwrap_err();
        assert!(matches!(err, RangeError::Inverted { .. }));
    }

    #[test]
    fn test_parse_entries_skips_blank_lines() {
        let input = r#"{"date":"2024-01-01","startTime":"08:00","endTime":"09:00","activity":"Plan","category":"growth"}

{"date":"2024-01-02","startTime":"10:00","endTime":"10:30","activity":"Email"}
"#;
        let entries = parse_entries(input.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].category, tb_core::Category::Maintenance);
    }

    #[test]
    fn test_parse_entries_reports_line_number() {
        let input = "{\"date\":\"2024-01-01\"}\nnot json\n";
        let err = parse_entries(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
