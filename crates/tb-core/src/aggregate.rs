//! Aggregation of entries into category totals and derived scores.
//!
//! Every function here is a pure function of `(entries, window)`. Minutes are
//! summed per category before any rounding, so rounding error never compounds
//! across entries. Scores and remainders are then derived from the rounded
//! hour totals.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::TimeEntry;
use crate::range::{DateWindow, ViewKind};
use crate::types::Category;

const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: u32 = 24;

/// Rounds to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::cast_precision_loss)]
fn raw_hours(minutes: u64) -> f64 {
    minutes as f64 / MINUTES_PER_HOUR
}

/// Totals for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub minutes: u64,
    pub hours: f64,
    pub count: usize,
}

/// Derived statistics for a set of entries over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_minutes: u64,
    pub total_hours: f64,
    pub growth: CategoryStats,
    pub maintenance: CategoryStats,
    pub shrink: CategoryStats,
    /// Capacity of the window: 24 hours per covered day.
    pub total_possible_hours: u32,
    /// Capacity minus tracked time, never negative.
    pub undocumented_hours: f64,
    pub avg_daily_hours: f64,
    /// Weighted share of tracked time, as an integer percentage.
    pub productivity_score: u32,
}

impl Analytics {
    /// Stats for one category.
    pub const fn category(&self, category: Category) -> &CategoryStats {
        match category {
            Category::Growth => &self.growth,
            Category::Maintenance => &self.maintenance,
            Category::Shrink => &self.shrink,
        }
    }

    /// Number of entries aggregated.
    pub const fn entry_count(&self) -> usize {
        self.growth.count + self.maintenance.count + self.shrink.count
    }
}

/// Hours available in a window.
pub fn capacity_hours(window: &DateWindow) -> u32 {
    match window.kind {
        ViewKind::Day => HOURS_PER_DAY,
        ViewKind::Week => HOURS_PER_DAY * 7,
        ViewKind::Month | ViewKind::Custom => HOURS_PER_DAY.saturating_mul(window.num_days()),
    }
}

/// Reduces `entries` into [`Analytics`] for `window`.
///
/// Entries are not re-filtered; pass the output of a range query.
pub fn aggregate(entries: &[TimeEntry], window: &DateWindow) -> Analytics {
    let mut minutes: HashMap<Category, (u64, usize)> = HashMap::new();
    for entry in entries {
        let slot = minutes.entry(entry.category).or_default();
        slot.0 += u64::from(entry.duration);
        slot.1 += 1;
    }

    let stats = |category: Category| {
        let (mins, count) = minutes.get(&category).copied().unwrap_or_default();
        CategoryStats {
            minutes: mins,
            hours: round1(raw_hours(mins)),
            count,
        }
    };

    let total_minutes: u64 = minutes.values().map(|(mins, _)| mins).sum();
    let total_hours = round1(raw_hours(total_minutes));
    let growth = stats(Category::Growth);
    let maintenance = stats(Category::Maintenance);
    let shrink = stats(Category::Shrink);

    // Score, remainder and average are taken over the rounded hour totals
    let weighted = growth.hours * Category::Growth.weight()
        + maintenance.hours * Category::Maintenance.weight()
        + shrink.hours * Category::Shrink.weight();

    let capacity = capacity_hours(window);
    #[allow(clippy::cast_precision_loss)]
    let elapsed_days = window.span_days().max(1) as f64;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let productivity_score = (weighted / total_hours.max(1.0) * 100.0).round().max(0.0) as u32;

    Analytics {
        total_minutes,
        total_hours,
        growth,
        maintenance,
        shrink,
        total_possible_hours: capacity,
        undocumented_hours: round1((f64::from(capacity) - total_hours).max(0.0)),
        avg_daily_hours: round1(total_hours / elapsed_days),
        productivity_score,
    }
}

/// Per-category hours for a single date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub growth: f64,
    pub maintenance: f64,
    pub shrink: f64,
    pub total: f64,
    pub count: usize,
}

/// One row per date in `window`, including dates with nothing logged.
pub fn daily_trend(entries: &[TimeEntry], window: &DateWindow) -> Vec<DailyTotals> {
    let mut by_date: HashMap<NaiveDate, Vec<&TimeEntry>> = HashMap::new();
    for entry in entries.iter().filter(|e| window.contains(e.date)) {
        by_date.entry(entry.date).or_default().push(entry);
    }

    window
        .days()
        .map(|date| {
            let day = by_date.get(&date).map(Vec::as_slice).unwrap_or_default();
            let sum = |category: Category| -> u64 {
                day.iter()
                    .filter(|e| e.category == category)
                    .map(|e| u64::from(e.duration))
                    .sum()
            };
            let growth = sum(Category::Growth);
            let maintenance = sum(Category::Maintenance);
            let shrink = sum(Category::Shrink);

            DailyTotals {
                date,
                growth: round1(raw_hours(growth)),
                maintenance: round1(raw_hours(maintenance)),
                shrink: round1(raw_hours(shrink)),
                total: round1(raw_hours(growth + maintenance + shrink)),
                count: day.len(),
            }
        })
        .collect()
}

/// Time spent on one recurring activity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Label as first seen.
    pub activity: String,
    /// Category of the first occurrence.
    pub category: Category,
    pub total_minutes: u64,
    pub hours: f64,
    pub count: usize,
    pub avg_minutes: u64,
}

/// The `limit` activities with the most tracked time.
///
/// Labels are grouped case-insensitively after trimming. Ties keep
/// first-seen order.
pub fn top_activities(entries: &[TimeEntry], limit: usize) -> Vec<ActivitySummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Category, u64, usize)> = Vec::new();

    for entry in entries {
        let key = entry.activity.trim().to_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((entry.activity.clone(), entry.category, 0, 0));
            groups.len() - 1
        });
        groups[slot].2 += u64::from(entry.duration);
        groups[slot].3 += 1;
    }

    groups.sort_by(|a, b| b.2.cmp(&a.2));
    groups
        .into_iter()
        .take(limit)
        .map(|(activity, category, total_minutes, count)| {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let avg_minutes = (total_minutes as f64 / count as f64).round() as u64;
            ActivitySummary {
                activity,
                category,
                total_minutes,
                hours: round1(raw_hours(total_minutes)),
                count,
                avg_minutes,
            }
        })
        .collect()
}

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "rounded outputs are compared against exact decimal literals"
)]
mod tests {
    use super::*;
    use crate::entry::NewEntry;
    use crate::store::EntryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_of(entries: &[(NaiveDate, &str, &str, &str, Category)]) -> EntryStore {
        EntryStore::with_entries(entries.iter().map(|(d, start, end, activity, category)| {
            NewEntry::new(*d, *start, *end, *activity).with_category(*category)
        }))
    }

    #[test]
    fn test_round1_half_away_from_zero() {
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(1.24), 1.2);
        assert_eq!(round1(-1.25), -1.3);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_single_growth_entry_scenario() {
        let store = store_of(&[(
            date(2024, 1, 1),
            "08:00",
            "09:30",
            "Write report",
            Category::Growth,
        )]);
        let window = DateWindow::day(date(2024, 1, 1));
        let stats = aggregate(&store.query_window(&window), &window);

        assert_eq!(stats.total_minutes, 90);
        assert_eq!(stats.total_hours, 1.5);
        assert_eq!(stats.growth.hours, 1.5);
        assert_eq!(stats.growth.count, 1);
        assert_eq!(stats.maintenance.count, 0);
        assert_eq!(stats.total_possible_hours, 24);
        assert_eq!(stats.undocumented_hours, 22.5);
        assert_eq!(stats.productivity_score, 100);
    }

    #[test]
    fn test_empty_entries() {
        let window = DateWindow::week(date(2024, 1, 3)).unwrap();
        let stats = aggregate(&[], &window);
        assert_eq!(stats.total_hours, 0.0);
        assert_eq!(stats.productivity_score, 0);
        assert_eq!(stats.total_possible_hours, 168);
        assert_eq!(stats.undocumented_hours, 168.0);
        assert_eq!(stats.avg_daily_hours, 0.0);
    }

    #[test]
    fn test_capacity_by_view() {
        let anchor = date(2024, 2, 10);
        assert_eq!(capacity_hours(&DateWindow::day(anchor)), 24);
        assert_eq!(capacity_hours(&DateWindow::week(anchor).unwrap()), 168);
        assert_eq!(capacity_hours(&DateWindow::month(anchor).unwrap()), 24 * 29);
        let custom = DateWindow::custom(date(2024, 2, 1), date(2024, 2, 3)).unwrap();
        assert_eq!(capacity_hours(&custom), 72);
    }

    #[test]
    fn test_undocumented_never_negative() {
        // Overlapping blocks tracking 3 x 23h59m in a single day
        let d = date(2024, 1, 1);
        let store = store_of(&[
            (d, "00:00", "23:59", "A", Category::Growth),
            (d, "00:00", "23:59", "B", Category::Growth),
            (d, "00:00", "23:59", "C", Category::Shrink),
        ]);
        let window = DateWindow::day(d);
        let stats = aggregate(store.entries(), &window);
        assert!(stats.total_hours > 24.0);
        assert_eq!(stats.undocumented_hours, 0.0);
    }

    #[test]
    fn test_productivity_weights() {
        let d = date(2024, 1, 1);
        let store = store_of(&[
            (d, "08:00", "10:00", "Deep work", Category::Growth),
            (d, "10:00", "12:00", "Email", Category::Maintenance),
            (d, "12:00", "14:00", "Scrolling", Category::Shrink),
        ]);
        let stats = aggregate(store.entries(), &DateWindow::day(d));
        // (2 + 0.5 * 2) / 6 = 50%
        assert_eq!(stats.productivity_score, 50);
        assert_eq!(stats.entry_count(), 3);
        assert_eq!(stats.category(Category::Shrink).hours, 2.0);
    }

    #[test]
    fn test_productivity_all_shrink_is_zero() {
        let d = date(2024, 1, 1);
        let store = store_of(&[(d, "08:00", "12:00", "Scrolling", Category::Shrink)]);
        let stats = aggregate(store.entries(), &DateWindow::day(d));
        assert_eq!(stats.productivity_score, 0);
    }

    #[test]
    fn test_productivity_small_totals_use_unit_denominator() {
        // 30 minutes of growth: denominator is max(1, 0.5) = 1
        let d = date(2024, 1, 1);
        let store = store_of(&[(d, "08:00", "08:30", "Reading", Category::Growth)]);
        let stats = aggregate(store.entries(), &DateWindow::day(d));
        assert_eq!(stats.productivity_score, 50);
    }

    #[test]
    fn test_rounding_applied_after_sum() {
        // Three 20-minute blocks: per-entry rounding would give 0.3 * 3 = 0.9
        let d = date(2024, 1, 1);
        let store = store_of(&[
            (d, "08:00", "08:20", "A", Category::Growth),
            (d, "09:00", "09:20", "B", Category::Growth),
            (d, "10:00", "10:20", "C", Category::Growth),
        ]);
        let stats = aggregate(store.entries(), &DateWindow::day(d));
        assert_eq!(stats.growth.hours, 1.0);
        assert_eq!(stats.total_hours, 1.0);
    }

    #[test]
    fn test_undocumented_uses_rounded_total() {
        // 27 minutes rounds to 0.5h, leaving 23.5h of a 24h day
        let d = date(2024, 1, 1);
        let store = store_of(&[(d, "08:00", "08:27", "Inbox", Category::Growth)]);
        let stats = aggregate(store.entries(), &DateWindow::day(d));
        assert_eq!(stats.total_hours, 0.5);
        assert_eq!(stats.undocumented_hours, 23.5);
        assert_eq!(
            stats.total_hours + stats.undocumented_hours,
            f64::from(stats.total_possible_hours)
        );
        assert_eq!(stats.avg_daily_hours, 0.5);
        assert_eq!(stats.productivity_score, 50);
    }

    #[test]
    fn test_score_uses_rounded_category_hours() {
        // 10m growth rounds to 0.2h and 50m shrink to 0.8h: 0.2 / 1.0 = 20%
        let d = date(2024, 1, 1);
        let store = store_of(&[
            (d, "08:00", "08:10", "Sketch", Category::Growth),
            (d, "09:00", "09:50", "Scrolling", Category::Shrink),
        ]);
        let stats = aggregate(store.entries(), &DateWindow::day(d));
        assert_eq!(stats.growth.hours, 0.2);
        assert_eq!(stats.shrink.hours, 0.8);
        assert_eq!(stats.total_hours, 1.0);
        assert_eq!(stats.productivity_score, 20);
    }

    #[test]
    fn test_derived_values_follow_rounded_totals_over_week() {
        let window = DateWindow::week(date(2024, 1, 3)).unwrap();
        let store = store_of(&[
            (date(2024, 1, 1), "08:00", "08:17", "Notes", Category::Growth),
            (date(2024, 1, 2), "08:00", "08:43", "Laundry", Category::Maintenance),
            (date(2024, 1, 4), "22:00", "22:07", "Feeds", Category::Shrink),
        ]);
        let stats = aggregate(&store.query_window(&window), &window);

        assert_eq!(stats.total_minutes, 67);
        assert_eq!(stats.total_hours, 1.1);
        assert_eq!(
            (stats.growth.hours, stats.maintenance.hours, stats.shrink.hours),
            (0.3, 0.7, 0.1)
        );
        assert_eq!(
            stats.undocumented_hours,
            round1(f64::from(stats.total_possible_hours) - stats.total_hours)
        );
        assert_eq!(stats.undocumented_hours, 166.9);
        // (0.3 + 0.5 * 0.7) / 1.1 = 59.09%
        assert_eq!(stats.productivity_score, 59);
        // 1.1h over 6 elapsed days
        assert_eq!(stats.avg_daily_hours, 0.2);
    }

    #[test]
    fn test_avg_daily_hours_uses_elapsed_days() {
        let window = DateWindow::trailing(7, date(2024, 1, 7)).unwrap();
        let store = store_of(&[
            (date(2024, 1, 2), "08:00", "14:00", "A", Category::Growth),
            (date(2024, 1, 5), "08:00", "14:00", "B", Category::Growth),
        ]);
        let stats = aggregate(&store.query_window(&window), &window);
        // 12h over a span of 6 elapsed days
        assert_eq!(stats.avg_daily_hours, 2.0);

        let day = DateWindow::day(date(2024, 1, 2));
        let stats = aggregate(&store.query_window(&day), &day);
        assert_eq!(stats.avg_daily_hours, 6.0);
    }

    #[test]
    fn test_daily_trend_covers_every_day() {
        let window = DateWindow::week(date(2024, 1, 3)).unwrap();
        let store = store_of(&[
            (date(2024, 1, 1), "08:00", "09:00", "A", Category::Growth),
            (date(2024, 1, 1), "09:00", "09:30", "B", Category::Shrink),
            (date(2024, 1, 3), "08:00", "08:45", "C", Category::Maintenance),
            (date(2024, 1, 9), "08:00", "09:00", "Next week", Category::Growth),
        ]);

        let trend = daily_trend(store.entries(), &window);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, date(2023, 12, 31));
        assert_eq!(trend[0].total, 0.0);

        let monday = &trend[1];
        assert_eq!(monday.growth, 1.0);
        assert_eq!(monday.shrink, 0.5);
        assert_eq!(monday.total, 1.5);
        assert_eq!(monday.count, 2);

        assert_eq!(trend[3].maintenance, 0.8);
        assert_eq!(trend.iter().map(|d| d.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_top_activities_groups_and_sorts() {
        let d = date(2024, 1, 1);
        let store = store_of(&[
            (d, "08:00", "09:00", "Coding", Category::Growth),
            (d, "09:00", "09:15", "Coffee break", Category::Maintenance),
            (d, "10:00", "11:30", " coding ", Category::Shrink),
            (d, "12:00", "12:10", "Coffee Break", Category::Maintenance),
            (d, "13:00", "13:45", "Email", Category::Maintenance),
        ]);

        let top = top_activities(store.entries(), 2);
        assert_eq!(top.len(), 2);

        assert_eq!(top[0].activity, "Coding");
        assert_eq!(top[0].category, Category::Growth);
        assert_eq!(top[0].total_minutes, 150);
        assert_eq!(top[0].hours, 2.5);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].avg_minutes, 75);

        assert_eq!(top[1].activity, "Email");
    }

    #[test]
    fn test_analytics_serializes_export_contract() {
        let window = DateWindow::day(date(2024, 1, 1));
        let json = serde_json::to_value(aggregate(&[], &window)).unwrap();
        for key in [
            "totalHours",
            "avgDailyHours",
            "productivityScore",
            "undocumentedHours",
            "totalPossibleHours",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["growth"]["count"], 0);
    }
}
