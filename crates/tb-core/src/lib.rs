//! Core domain logic for the timeblocks tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: time blocks with a derived duration
//! - Store: the in-memory collection entries live in for a session
//! - Range filtering: day / week / month / custom windows
//! - Aggregation: category totals, capacity, productivity score and trends

pub mod aggregate;
pub mod duration;
pub mod entry;
pub mod export;
pub mod insights;
pub mod range;
pub mod store;
pub mod types;

pub use aggregate::{
    ActivitySummary, Analytics, CategoryStats, DailyTotals, aggregate, daily_trend, round1,
    top_activities,
};
pub use duration::{compute_duration, format_minutes, parse_clock_time};
pub use entry::{EntryPatch, NewEntry, TimeEntry};
pub use export::ExportBundle;
pub use insights::{Insight, Tone, insights};
pub use range::{DashboardRange, DateWindow, RangeError, ViewKind, filter_entries};
pub use store::{EntryStore, SharedStore, StoreError};
pub use types::{Category, EntryId, ValidationError};
