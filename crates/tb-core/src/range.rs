//! Date windows for day / week / month / custom views.
//!
//! Windows are inclusive on both ends and compare calendar dates only.
//! Weeks run Sunday through Saturday.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::TimeEntry;

/// Errors building a date window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// A custom window whose start falls after its end.
    #[error("window start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    /// Date arithmetic left the representable calendar.
    #[error("date out of range")]
    OutOfRange,

    /// Unrecognized view or range name.
    #[error("unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
}

/// Granularity of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    Week,
    Month,
    Custom,
}

impl ViewKind {
    /// String representation used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Custom => "custom",
        }
    }

    /// Moves an anchor date by `periods` views (negative moves back).
    ///
    /// Month steps keep the day of month, clamped to the last day of a
    /// shorter month. Custom windows have no natural step and return the
    /// anchor unchanged.
    pub fn step(self, anchor: NaiveDate, periods: i32) -> Result<NaiveDate, RangeError> {
        let magnitude = periods.unsigned_abs();
        let forward = periods >= 0;
        let moved = match self {
            Self::Day => shift_days(anchor, u64::from(magnitude), forward),
            Self::Week => shift_days(anchor, u64::from(magnitude) * 7, forward),
            Self::Month => {
                let months = Months::new(magnitude);
                if forward {
                    anchor.checked_add_months(months)
                } else {
                    anchor.checked_sub_months(months)
                }
            }
            Self::Custom => Some(anchor),
        };
        moved.ok_or(RangeError::OutOfRange)
    }

    /// Whether stepping one view forward from `anchor` stays on or before `today`.
    ///
    /// Only the view is kept out of the future; future-dated entries already
    /// in a store are still returned by queries.
    pub fn can_step_forward(self, anchor: NaiveDate, today: NaiveDate) -> bool {
        self.step(anchor, 1).is_ok_and(|next| next <= today)
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "custom" => Ok(Self::Custom),
            _ => Err(RangeError::Unknown {
                kind: "view",
                value: s.to_string(),
            }),
        }
    }
}

fn shift_days(date: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub kind: ViewKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The anchor date alone.
    pub const fn day(anchor: NaiveDate) -> Self {
        Self {
            kind: ViewKind::Day,
            start: anchor,
            end: anchor,
        }
    }

    /// The Sunday-to-Saturday week containing the anchor.
    pub fn week(anchor: NaiveDate) -> Result<Self, RangeError> {
        let offset = u64::from(anchor.weekday().num_days_from_sunday());
        let start = anchor
            .checked_sub_days(Days::new(offset))
            .ok_or(RangeError::OutOfRange)?;
        let end = start
            .checked_add_days(Days::new(6))
            .ok_or(RangeError::OutOfRange)?;
        Ok(Self {
            kind: ViewKind::Week,
            start,
            end,
        })
    }

    /// First through last day of the anchor's month.
    pub fn month(anchor: NaiveDate) -> Result<Self, RangeError> {
        let start = anchor.with_day(1).ok_or(RangeError::OutOfRange)?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(RangeError::OutOfRange)?;
        Ok(Self {
            kind: ViewKind::Month,
            start,
            end,
        })
    }

    /// Two explicit boundaries.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self {
            kind: ViewKind::Custom,
            start,
            end,
        })
    }

    /// The window of the given view containing `anchor`.
    ///
    /// A custom view collapses to the anchor date.
    pub fn for_view(kind: ViewKind, anchor: NaiveDate) -> Result<Self, RangeError> {
        match kind {
            ViewKind::Day => Ok(Self::day(anchor)),
            ViewKind::Week => Self::week(anchor),
            ViewKind::Month => Self::month(anchor),
            ViewKind::Custom => Self::custom(anchor, anchor),
        }
    }

    /// The last `days` days ending on `today`, as a custom window.
    pub fn trailing(days: u32, today: NaiveDate) -> Result<Self, RangeError> {
        let back = u64::from(days.max(1) - 1);
        let start = today
            .checked_sub_days(Days::new(back))
            .ok_or(RangeError::OutOfRange)?;
        Self::custom(start, today)
    }

    /// Whether `date` lies inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of dates covered, counting both ends.
    pub fn num_days(&self) -> u32 {
        u32::try_from(self.span_days() + 1).unwrap_or(u32::MAX)
    }

    /// Days elapsed from start to end, not counting the start date.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Every date in the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

/// Trailing dashboard presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardRange {
    #[default]
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "14d")]
    Last14Days,
    #[serde(rename = "30d")]
    Last30Days,
}

impl DashboardRange {
    /// Length of the preset in days.
    pub const fn days(self) -> u32 {
        match self {
            Self::Last7Days => 7,
            Self::Last14Days => 14,
            Self::Last30Days => 30,
        }
    }

    /// The window this preset covers, ending on `today`.
    pub fn window(self, today: NaiveDate) -> Result<DateWindow, RangeError> {
        DateWindow::trailing(self.days(), today)
    }
}

impl fmt::Display for DashboardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

impl FromStr for DashboardRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Last7Days),
            "14d" => Ok(Self::Last14Days),
            "30d" => Ok(Self::Last30Days),
            _ => Err(RangeError::Unknown {
                kind: "dashboard range",
                value: s.to_string(),
            }),
        }
    }
}

/// Selects the entries whose date falls inside `window`, preserving order.
pub fn filter_entries(entries: &[TimeEntry], window: &DateWindow) -> Vec<TimeEntry> {
    entries
        .iter()
        .filter(|entry| window.contains(entry.date))
        .cloned()
        .collect()
}
