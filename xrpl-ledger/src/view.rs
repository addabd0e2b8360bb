//! Transactional overlay on top of a state map (§4.5 "Ledger View"):
//! reads check the overlay before falling back to the base tree; writes
//! only ever touch the overlay. `commit` applies the overlay to the base
//! map in ascending key order; `abort` discards it untouched.

use std::collections::BTreeMap;

use tracing::{debug, trace};
use xrpl_hash::Hash;
use xrpl_tree::{NodeStore, StateMap, TreeKey};

/// One key's pending change, buffered until the view commits (§4.5).
#[derive(Debug, Clone)]
enum Overlay {
    Inserted(Vec<u8>),
    Modified(Vec<u8>),
    Erased,
}

/// A single-owner transactional overlay over a base [`StateMap`] (§4.5,
/// §5 "Concurrency contract"). A view exists only for the duration of one
/// transaction's application; it is discarded on failure rather than
/// reused.
pub struct LedgerView<'a, S> {
    base: &'a StateMap<S>,
    overlay: BTreeMap<TreeKey, Overlay>,
    /// Keys in the order they were first touched (§5 "within a
    /// transaction's metadata, affected nodes are listed in the order they
    /// were touched by the handler") — kept alongside `overlay`'s
    /// ascending-key order, which `commit` needs instead.
    touch_order: Vec<TreeKey>,
}

impl<'a, S: NodeStore> LedgerView<'a, S> {
    pub fn new(base: &'a StateMap<S>) -> Self {
        Self {
            base,
            overlay: BTreeMap::new(),
            touch_order: Vec::new(),
        }
    }

    /// Read a key: overlay first, falling back to the base map.
    pub fn read(&self, key: &TreeKey) -> Result<Option<Vec<u8>>, xrpl_tree::Error<S::Error>> {
        match self.overlay.get(key) {
            Some(Overlay::Inserted(bytes) | Overlay::Modified(bytes)) => Ok(Some(bytes.clone())),
            Some(Overlay::Erased) => Ok(None),
            None => self.base.get(key),
        }
    }

    pub fn exists(&self, key: &TreeKey) -> Result<bool, xrpl_tree::Error<S::Error>> {
        Ok(self.read(key)?.is_some())
    }

    /// Write `data` at `key`. Buffered in the overlay as `Inserted` if the
    /// key did not previously resolve (overlay or base), `Modified`
    /// otherwise — the distinction only matters for callers that care
    /// whether a commit will be an insert or a replace in the underlying
    /// map; `StateMap::put` treats both identically.
    pub fn write(&mut self, key: TreeKey, data: Vec<u8>) -> Result<(), xrpl_tree::Error<S::Error>> {
        let existed = self.exists(&key)?;
        let entry = if existed {
            Overlay::Modified(data)
        } else {
            Overlay::Inserted(data)
        };
        self.touch(key);
        self.overlay.insert(key, entry);
        Ok(())
    }

    /// Buffer the removal of `key`.
    pub fn erase(&mut self, key: TreeKey) {
        self.touch(key);
        self.overlay.insert(key, Overlay::Erased);
    }

    fn touch(&mut self, key: TreeKey) {
        if !self.touch_order.contains(&key) {
            self.touch_order.push(key);
        }
    }

    /// Keys touched by `write`/`erase`, in first-touched order (§5).
    pub fn touched(&self) -> &[TreeKey] {
        &self.touch_order
    }

    /// The pre-change value of `key`, read from the base map regardless of
    /// any overlay entry — used to build metadata's "pre" field set.
    pub fn read_base(&self, key: &TreeKey) -> Result<Option<Vec<u8>>, xrpl_tree::Error<S::Error>> {
        self.base.get(key)
    }

    /// Apply every buffered overlay entry to `base` in ascending key order
    /// (§4.5, §5 "Ordering guarantees"), then discard the overlay.
    pub fn commit(self, base: &mut StateMap<S>) -> Result<(), xrpl_tree::Error<S::Error>> {
        let touched = self.overlay.len();
        for (key, entry) in self.overlay {
            match entry {
                Overlay::Inserted(bytes) | Overlay::Modified(bytes) => base.put(key, bytes)?,
                Overlay::Erased => {
                    base.erase(&key)?;
                }
            }
        }
        debug!(touched, "view committed");
        Ok(())
    }

    /// Discard every buffered change; the base map is untouched.
    pub fn abort(self) {
        if !self.overlay.is_empty() {
            trace!(touched = self.overlay.len(), "view aborted");
        }
    }

    /// Whether anything has been buffered yet.
    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }
}

/// `LedgerView` operates on raw bytes; most callers instead want to read and
/// write codec-level [`xrpl_codec::FieldObject`]s at a [`xrpl_codec`]
/// keylet. These thin wrappers do the encode/decode so handlers (G) never
/// touch bytes directly.
impl<S: NodeStore> LedgerView<'_, S> {
    pub fn read_sle(
        &self,
        key: &Hash<32>,
    ) -> Result<Option<xrpl_codec::FieldObject>, crate::error::LedgerError> {
        let Some(bytes) = self
            .read(key)
            .map_err(|e| crate::error::LedgerError::Tree(e.to_string()))?
        else {
            return Ok(None);
        };
        Ok(Some(xrpl_codec::decode(&bytes)?))
    }

    pub fn write_sle(
        &mut self,
        key: Hash<32>,
        object: &xrpl_codec::FieldObject,
    ) -> Result<(), crate::error::LedgerError> {
        let bytes = xrpl_codec::encode(object)?;
        self.write(key, bytes)
            .map_err(|e| crate::error::LedgerError::Tree(e.to_string()))
    }

    pub fn erase_sle(&mut self, key: Hash<32>) {
        self.erase(key);
    }

    /// The pre-transaction SLE at `key`, decoded from the base map. Used to
    /// build a touched node's "pre" field set even after the overlay has
    /// moved on to "post" (§4.7 "Report every affected SLE in metadata").
    pub fn read_base_sle(
        &self,
        key: &Hash<32>,
    ) -> Result<Option<xrpl_codec::FieldObject>, crate::error::LedgerError> {
        let Some(bytes) = self
            .read_base(key)
            .map_err(|e| crate::error::LedgerError::Tree(e.to_string()))?
        else {
            return Ok(None);
        };
        Ok(Some(xrpl_codec::decode(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpl_tree::MemNodeStore;

    fn key(byte: u8) -> TreeKey {
        Hash::new([byte; 32])
    }

    #[test]
    fn reads_fall_back_to_base_when_not_overlaid() {
        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(key(1), vec![9]).unwrap();

        let view = LedgerView::new(&base);
        assert_eq!(view.read(&key(1)).unwrap(), Some(vec![9]));
        assert_eq!(view.read(&key(2)).unwrap(), None);
    }

    #[test]
    fn writes_are_invisible_to_base_until_commit() {
        let mut base = StateMap::new_state(MemNodeStore::new());
        let mut view = LedgerView::new(&base);
        view.write(key(1), vec![1, 2, 3]).unwrap();
        assert_eq!(view.read(&key(1)).unwrap(), Some(vec![1, 2, 3]));
        assert!(base.get(&key(1)).unwrap().is_none());

        view.commit(&mut base).unwrap();
        assert_eq!(base.get(&key(1)).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn abort_discards_every_buffered_change() {
        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(key(1), vec![9]).unwrap();

        let mut view = LedgerView::new(&base);
        view.write(key(1), vec![1]).unwrap();
        view.erase(key(1));
        view.abort();

        assert_eq!(base.get(&key(1)).unwrap(), Some(vec![9]));
    }

    #[test]
    fn erase_then_commit_removes_from_base() {
        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(key(1), vec![9]).unwrap();

        let mut view = LedgerView::new(&base);
        view.erase(key(1));
        view.commit(&mut base).unwrap();

        assert!(base.get(&key(1)).unwrap().is_none());
    }
}
