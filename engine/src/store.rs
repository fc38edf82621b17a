//! The per-session object store, keyed by Tacview id.
//!

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tacview_formats::ObjectRec;

/// Maps tac_id to its record.  Owned by the session; records are never
/// evicted while the session lives, the matcher needs the full timeline.
///
#[derive(Debug, Default)]
pub struct ObjStore {
    inner: HashMap<u64, ObjectRec>,
}

impl ObjStore {
    pub fn new() -> Self {
        ObjStore {
            inner: HashMap::with_capacity(512),
        }
    }

    pub fn get(&self, tac_id: u64) -> Option<&ObjectRec> {
        self.inner.get(&tac_id)
    }

    pub fn get_mut(&mut self, tac_id: u64) -> Option<&mut ObjectRec> {
        self.inner.get_mut(&tac_id)
    }

    /// Fetch the record for `tac_id`, creating it on first sight.  The
    /// boolean says whether it was created.
    ///
    pub fn get_or_create(
        &mut self,
        tac_id: u64,
        session_id: i64,
        seen: f64,
    ) -> (&mut ObjectRec, bool) {
        match self.inner.entry(tac_id) {
            Entry::Occupied(e) => (e.into_mut(), false),
            Entry::Vacant(e) => (e.insert(ObjectRec::new(tac_id, session_id, seen)), true),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &ObjectRec> {
        self.inner.values()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
