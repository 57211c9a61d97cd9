//! The `{entries, analytics, dateRange}` triple handed to document exporters.

use serde::{Deserialize, Serialize};

use crate::aggregate::{Analytics, aggregate};
use crate::entry::TimeEntry;
use crate::range::{DateWindow, filter_entries};

/// Everything an exporter needs to render a report for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    /// Entries in the window, newest date first, then by start time.
    pub entries: Vec<TimeEntry>,
    pub analytics: Analytics,
    pub date_range: DateWindow,
}

impl ExportBundle {
    /// Builds the bundle for `window` from any superset of its entries.
    ///
    /// Output is deterministic for a given set of entries and window.
    pub fn build(entries: &[TimeEntry], window: DateWindow) -> Self {
        let mut selected = filter_entries(entries, &window);
        selected.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        let analytics = aggregate(&selected, &window);
        tracing::debug!(entries = selected.len(), %window, "export bundle built");

        Self {
            entries: selected,
            analytics,
            date_range: window,
        }
    }
}
