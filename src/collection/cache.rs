//! Offset-keyed storage for a collection's entries.
//!
//! Two sparse maps share the same key space, the absolute offset of an
//! entry in the remote collection:
//!
//! - raw entries, as they arrived in page payloads
//! - materialized entries, built from a raw entry on first access
//!
//! Neither map evicts. An offset is materialized only after its raw entry is
//! present, so materialized keys are always a subset of raw keys, and all
//! keys lie below the collection's total size.

use serde_json::Value;
use std::collections::BTreeMap;

pub struct OffsetCache<E> {
    raw: BTreeMap<usize, Value>,
    materialized: BTreeMap<usize, E>,
    total_size: usize,
}

impl<E> OffsetCache<E> {
    pub fn new(total_size: usize) -> Self {
        Self {
            raw: BTreeMap::new(),
            materialized: BTreeMap::new(),
            total_size,
        }
    }

    /// Key the entries of one page at `start`, `start + 1`, ...
    ///
    /// Entries falling at or beyond the total size are dropped, as are
    /// entries whose offset does not fit in a `usize`. Returns the number of
    /// entries stored.
    pub fn key_page(&mut self, start: usize, entries: Vec<Value>) -> usize {
        let mut stored = 0;
        for (i, entry) in entries.into_iter().enumerate() {
            let Some(offset) = start.checked_add(i) else {
                log::warn!(
                    "Dropping entry {} of page starting at {}: offset overflows",
                    i,
                    start
                );
                continue;
            };
            if offset >= self.total_size {
                log::warn!(
                    "Dropping entry at offset {} beyond total size {}",
                    offset,
                    self.total_size
                );
                continue;
            }
            self.raw.insert(offset, entry);
            stored += 1;
        }
        stored
    }

    pub fn contains_raw(&self, offset: usize) -> bool {
        self.raw.contains_key(&offset)
    }

    pub fn raw(&self, offset: usize) -> Option<&Value> {
        self.raw.get(&offset)
    }

    pub fn materialized(&self, offset: usize) -> Option<&E> {
        self.materialized.get(&offset)
    }

    /// Store the materialized form of an already keyed raw entry. An offset
    /// that is already materialized keeps its first value.
    pub fn materialize(&mut self, offset: usize, entry: E) -> &E {
        debug_assert!(self.raw.contains_key(&offset));
        self.materialized.entry(offset).or_insert(entry)
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn materialized_len(&self) -> usize {
        self.materialized.len()
    }

    /// Raw offsets currently held, ascending
    pub fn raw_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.raw.keys().copied()
    }
}
