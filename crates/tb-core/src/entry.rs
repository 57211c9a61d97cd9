//! Time entries and the shapes used to create and patch them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration::compute_duration;
use crate::types::{Category, EntryId};

/// One logged block of activity.
///
/// `duration` is derived from `start_time`/`end_time` and is only ever written
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    /// Unique identifier, assigned at creation.
    pub id: EntryId,
    /// Calendar date the block belongs to.
    pub date: NaiveDate,
    /// Wall-clock start, `HH:MM`.
    pub start_time: String,
    /// Wall-clock end, `HH:MM`.
    pub end_time: String,
    /// Free-text label.
    pub activity: String,
    pub category: Category,
    /// Elapsed minutes.
    pub duration: u32,
}

impl TimeEntry {
    /// Builds an entry from caller input, deriving its duration.
    pub(crate) fn from_new(id: EntryId, new: NewEntry) -> Self {
        let duration = compute_duration(&new.start_time, &new.end_time);
        Self {
            id,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            activity: new.activity,
            category: new.category,
            duration,
        }
    }

    /// Merges a patch into this entry.
    ///
    /// Duration is recomputed when the patch touches either time field.
    pub(crate) fn apply(&mut self, patch: EntryPatch) {
        let retime = patch.touches_times();

        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(activity) = patch.activity {
            self.activity = activity;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }

        if retime {
            self.duration = compute_duration(&self.start_time, &self.end_time);
        }
    }
}

/// Caller input for creating an entry: everything except `id` and `duration`.
///
/// Unknown fields are ignored, so a serialized [`TimeEntry`] can be fed back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub activity: String,
    /// Defaults to maintenance when omitted.
    #[serde(default)]
    pub category: Category,
}

impl NewEntry {
    /// Creates input for a block with the default category.
    pub fn new(
        date: NaiveDate,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        activity: impl Into<String>,
    ) -> Self {
        Self {
            date,
            start_time: start_time.into(),
            end_time: end_time.into(),
            activity: activity.into(),
            category: Category::default(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}

/// Partial update for an existing entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl EntryPatch {
    /// Whether applying this patch changes either time field.
    pub const fn touches_times(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    /// Whether the patch carries no fields at all.
    pub const fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.activity.is_none()
            && self.category.is_none()
    }
}
