//! Canonical in-memory cache of transaction records.
//!
//! The store is the only writer of record state. It keeps records unique by
//! id and sorted in canonical order after every operation, and owns the
//! selection so that removals and reloads can prune it in the same step.

use std::collections::BTreeMap;

use crate::{
    EngineError, RecordId, RecordPatch, ResultEngine, Selection, TransactionRecord,
    record::canonical_cmp,
};

#[derive(Debug, Default)]
pub struct LedgerStore {
    records: Vec<TransactionRecord>,
    selection: Selection,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every record with a freshly fetched set and clears the
    /// selection. Duplicate ids keep the last occurrence.
    pub fn replace_all(&mut self, records: Vec<TransactionRecord>) {
        let fetched = records.len();
        let by_id: BTreeMap<RecordId, TransactionRecord> =
            records.into_iter().map(|record| (record.id, record)).collect();
        if by_id.len() != fetched {
            tracing::warn!(
                "dropped {} duplicate record id(s) from fetched set",
                fetched - by_id.len()
            );
        }

        let mut records: Vec<TransactionRecord> = by_id.into_values().collect();
        records.sort_by(canonical_cmp);
        self.records = records;
        self.selection = Selection::new();
    }

    /// Merges `patch` into the record with `id`.
    ///
    /// Returns `true` when the date changed. The store re-sorts locally so the
    /// canonical order holds, but the caller should reload to pick up the
    /// backend's view of the moved record.
    pub fn apply_update(&mut self, id: RecordId, patch: &RecordPatch) -> ResultEngine<bool> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        let moved = patch.apply_to(record);
        if moved {
            self.records.sort_by(canonical_cmp);
        }
        Ok(moved)
    }

    /// Removes the record with `id` and drops it from the selection.
    /// Returns whether a record was removed.
    pub fn apply_delete(&mut self, id: RecordId) -> bool {
        self.apply_delete_many(&[id]) == 1
    }

    /// Removes every record whose id is in `ids` and drops those ids from the
    /// selection. Returns how many records were removed.
    pub fn apply_delete_many(&mut self, ids: &[RecordId]) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !ids.contains(&record.id));
        self.selection = self.selection.without(ids);
        before - self.records.len()
    }

    /// Records in canonical order.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }
}
