//! Undo/redo history stack.
//!
//! [`HistoryStack`] is an ordered log of opaque snapshots with a cursor (the
//! "step") marking the entry that is currently applied. Entries after the
//! cursor form the redo branch; they survive `undo` and are discarded by the
//! next `add`.
//!
//! The cursor ranges over `-1..=len-1` and is exposed as `Option<usize>`,
//! where `None` means no entry is applied.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Traversal order for [`HistoryStack::each`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EachOrder {
    /// Applied entries, oldest first: `0..=step`.
    #[default]
    First,
    /// Entries before the current one, newest first: `step-1` down to `0`.
    Last,
}

/// Ignorable boundary conditions of the history.
///
/// None of these are fatal. They let a UI disable its undo/redo buttons or
/// drop the action silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("no previous state to undo to")]
    NoPreviousState,
    #[error("no next state to redo to")]
    NoNextState,
    #[error("history index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An ordered, position-addressable log of snapshots with a movable cursor.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    /// Number of applied entries. The cursor is `applied - 1`.
    applied: usize,
    /// Oldest entries are dropped once the log grows past this.
    max_entries: Option<usize>,
    /// Entries dropped by the capacity limit since creation or the last `clean`.
    evicted: usize,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> HistoryStack<T> {
    /// Create a history from an initial sequence, with the cursor on its last entry.
    pub fn new(initial: Vec<T>) -> Self {
        Self {
            applied: initial.len(),
            entries: initial,
            max_entries: None,
            evicted: 0,
        }
    }

    /// Create a history that keeps at most `max_entries` snapshots (at least one).
    pub fn with_capacity_limit(initial: Vec<T>, max_entries: usize) -> Self {
        let mut history = Self::new(initial);
        history.max_entries = Some(max_entries.max(1));
        history.enforce_limit();
        history
    }

    /// Maximum number of retained entries, if bounded.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Number of entries dropped by the capacity limit.
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    /// Index of the currently applied entry, `None` when nothing is applied.
    pub fn step(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The currently applied entry.
    pub fn current(&self) -> Option<&T> {
        self.step().and_then(|step| self.entries.get(step))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// All entries, including the redo branch.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Entries up to and including the cursor.
    pub fn applied(&self) -> &[T] {
        &self.entries[..self.applied]
    }

    /// Whether `undo` would move the cursor.
    ///
    /// This is true at step 0 even though `undo` then returns `None`: the
    /// cursor still moves back to "nothing applied".
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Whether `redo` would move the cursor.
    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Append an entry and move the cursor onto it.
    ///
    /// A pending redo branch is discarded first.
    pub fn add(&mut self, entry: T) {
        if self.applied < self.entries.len() {
            self.entries.truncate(self.applied);
        }
        self.entries.push(entry);
        self.applied = self.entries.len();
        self.enforce_limit();
    }

    /// Move the cursor one entry back and return the entry it lands on.
    ///
    /// Returns `None` without moving when nothing is applied, and also when
    /// the cursor moves from the first entry to "nothing applied".
    pub fn undo(&mut self) -> Option<&T> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.current()
    }

    /// Move the cursor one entry forward and return it, `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if self.applied >= self.entries.len() {
            return None;
        }
        self.applied += 1;
        self.current()
    }

    /// Remove every entry whose key equals `value`, across the whole log.
    ///
    /// The cursor stays on the same logical entry when that entry survives.
    /// If it was removed, the cursor falls back to the nearest surviving
    /// earlier entry. Returns the number of removed entries.
    pub fn delete<K, F>(&mut self, key: F, value: &K) -> usize
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        let before = self.entries.len();
        let applied = self.applied;
        let mut index = 0;
        let mut removed_applied = 0;
        self.entries.retain(|entry| {
            let keep = key(entry) != *value;
            if !keep && index < applied {
                removed_applied += 1;
            }
            index += 1;
            keep
        });
        self.applied -= removed_applied;
        before - self.entries.len()
    }

    /// Remove the entry at `index`, shifting later entries down.
    ///
    /// The cursor is adjusted the same way as for [`delete`](Self::delete).
    pub fn delete_at(&mut self, index: usize) -> Result<T, HistoryError> {
        if index >= self.entries.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let entry = self.entries.remove(index);
        if index < self.applied {
            self.applied -= 1;
        }
        Ok(entry)
    }

    /// Reorder the entries in place. The cursor position is left untouched.
    ///
    /// After sorting, the cursor no longer identifies "the entry applied
    /// last", so this only makes sense when the log is used as a plain
    /// collection.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.entries.sort_by(compare);
    }

    /// Visit entries with their index, in the given order.
    pub fn each<F>(&self, order: EachOrder, mut visit: F)
    where
        F: FnMut(&T, usize),
    {
        match order {
            EachOrder::First => {
                for (index, entry) in self.applied().iter().enumerate() {
                    visit(entry, index);
                }
            }
            EachOrder::Last => {
                let end = self.applied.saturating_sub(1);
                for index in (0..end).rev() {
                    visit(&self.entries[index], index);
                }
            }
        }
    }

    /// Drop all entries and reset the cursor.
    pub fn clean(&mut self) {
        self.entries.clear();
        self.applied = 0;
        self.evicted = 0;
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_entries else { return };
        if self.entries.len() > max {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
            self.applied = self.applied.saturating_sub(excess);
            self.evicted += excess;
            log::trace!("History limit {} reached, dropped {} oldest entries", max, excess);
        }
    }
}
