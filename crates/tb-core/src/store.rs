//! In-memory entry store.
//!
//! [`EntryStore`] is the single owner of a session's entries. Callers get
//! value copies back; nothing outside the store holds a reference into it.
//!
//! # Thread Safety
//!
//! `EntryStore` itself has no interior locking. For access from several
//! threads use [`SharedStore`], which serializes mutations behind a write lock
//! while letting queries read a consistent snapshot concurrently.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use thiserror::Error;

use crate::entry::{EntryPatch, NewEntry, TimeEntry};
use crate::range::{DateWindow, filter_entries};
use crate::types::EntryId;

/// Store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No entry with this ID exists.
    #[error("no entry with id {id}")]
    NotFound { id: EntryId },
}

/// The canonical collection of time entries for one session.
#[derive(Debug, Default, Clone)]
pub struct EntryStore {
    entries: Vec<TimeEntry>,
}

impl EntryStore {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a store pre-populated through [`EntryStore::add`].
    pub fn with_entries(entries: impl IntoIterator<Item = NewEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.add(entry);
        }
        store
    }

    /// Adds an entry, assigning a fresh ID and computing its duration.
    pub fn add(&mut self, new: NewEntry) -> TimeEntry {
        let entry = TimeEntry::from_new(EntryId::generate(), new);
        tracing::debug!(id = %entry.id, date = %entry.date, duration = entry.duration, "entry added");
        self.entries.push(entry.clone());
        entry
    }

    /// Merges `patch` into the entry with `id` and returns the updated entry.
    pub fn update(&mut self, id: &EntryId, patch: EntryPatch) -> Result<TimeEntry, StoreError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;

        let retimed = patch.touches_times();
        entry.apply(patch);
        tracing::debug!(%id, retimed, duration = entry.duration, "entry updated");
        Ok(entry.clone())
    }

    /// Removes the entry with `id` and returns it.
    pub fn delete(&mut self, id: &EntryId) -> Result<TimeEntry, StoreError> {
        let index = self
            .entries
            .iter()
            .position(|entry| &entry.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;

        let removed = self.entries.remove(index);
        tracing::debug!(%id, "entry deleted");
        Ok(removed)
    }

    /// Looks up a single entry.
    pub fn get(&self, id: &EntryId) -> Option<&TimeEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dated exactly `date`.
    pub fn query_by_date(&self, date: NaiveDate) -> Vec<TimeEntry> {
        self.query_window(&DateWindow::day(date))
    }

    /// Entries dated within `[start, end]`. An inverted range matches nothing.
    pub fn query_by_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<TimeEntry> {
        self.entries
            .iter()
            .filter(|entry| start <= entry.date && entry.date <= end)
            .cloned()
            .collect()
    }

    /// Entries inside `window`.
    pub fn query_window(&self, window: &DateWindow) -> Vec<TimeEntry> {
        filter_entries(&self.entries, window)
    }

    /// Drops every entry and returns how many were removed.
    pub fn reset(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        tracing::debug!(cleared, "store reset");
        cleared
    }
}

/// A cloneable handle to an [`EntryStore`] shared across threads.
///
/// Mutations take the write lock; queries take the read lock and therefore
/// never observe a half-applied change. Every mutation leaves the collection
/// consistent before it could panic, so a poisoned lock is recovered.
#[derive(Debug, Default, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<EntryStore>>,
}

impl SharedStore {
    pub fn new(store: EntryStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, EntryStore> {
        self.inner.read().unwrap_or_else(|poisoned| {
            tracing::warn!("entry store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntryStore> {
        self.inner.write().unwrap_or_else(|poisoned| {
            tracing::warn!("entry store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn add(&self, new: NewEntry) -> TimeEntry {
        self.write().add(new)
    }

    pub fn update(&self, id: &EntryId, patch: EntryPatch) -> Result<TimeEntry, StoreError> {
        self.write().update(id, patch)
    }

    pub fn delete(&self, id: &EntryId) -> Result<TimeEntry, StoreError> {
        self.write().delete(id)
    }

    pub fn reset(&self) -> usize {
        self.write().reset()
    }

    pub fn get(&self, id: &EntryId) -> Option<TimeEntry> {
        self.read().get(id).cloned()
    }

    /// A copy of every entry at one point in time.
    pub fn snapshot(&self) -> Vec<TimeEntry> {
        self.read().entries().to_vec()
    }

    pub fn query_by_date(&self, date: NaiveDate) -> Vec<TimeEntry> {
        self.read().query_by_date(date)
    }

    pub fn query_by_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<TimeEntry> {
        self.read().query_by_range(start, end)
    }

    pub fn query_window(&self, window: &DateWindow) -> Vec<TimeEntry> {
        self.read().query_window(window)
    }
}
