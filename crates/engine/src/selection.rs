//! Multi-selection of records for bulk actions.
//!
//! [`Selection`] is a value: every change produces a new set and leaves the
//! old one untouched, so a view computed from a previous selection stays
//! consistent while the next one is being built.

use std::collections::BTreeSet;

use crate::RecordId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<RecordId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`. Applying it twice gives back an equal set.
    #[must_use]
    pub fn toggled(&self, id: RecordId) -> Selection {
        let mut ids = self.ids.clone();
        if !ids.remove(&id) {
            ids.insert(id);
        }
        Selection { ids }
    }

    /// Drops every id in `removed`, ignoring ids that were not selected.
    #[must_use]
    pub fn without<'a, I>(&self, removed: I) -> Selection
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let mut ids = self.ids.clone();
        for id in removed {
            ids.remove(id);
        }
        Selection { ids }
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.ids.iter()
    }
}

impl FromIterator<RecordId> for Selection {
    fn from_iter<T: IntoIterator<Item = RecordId>>(iter: T) -> Self {
        Selection {
            ids: iter.into_iter().collect(),
        }
    }
}
