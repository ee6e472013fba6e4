//! Selection Manager
//!
//! Ordered selection set used by both editors. Handles are unique and the
//! order is significant: operations that treat one shape as the target
//! (subtract, cut) use the first selected shape, and selecting an already
//! selected handle moves it to the end.

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free selection of handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection<T> {
    items: Vec<T>,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Copy + PartialEq> Selection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item`, moving it to the end if already selected.
    pub fn select(&mut self, item: T) {
        self.items.retain(|i| *i != item);
        self.items.push(item);
    }

    /// Clears the selection and selects only `item`.
    pub fn select_only(&mut self, item: T) {
        self.items.clear();
        self.items.push(item);
    }

    /// Removes `item` if selected, otherwise appends it.
    ///
    /// Returns `true` when the item ends up selected.
    pub fn toggle(&mut self, item: T) -> bool {
        if self.contains(item) {
            self.deselect(item);
            false
        } else {
            self.items.push(item);
            true
        }
    }

    pub fn deselect(&mut self, item: T) {
        self.items.retain(|i| *i != item);
    }

    /// Replaces the whole selection, dropping duplicates.
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        for item in items {
            self.select(item);
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.select(item);
        }
    }

    /// Keeps only the items for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, item: T) -> bool {
        self.items.contains(&item)
    }

    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<T> {
        self.items.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
