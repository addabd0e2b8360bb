//! `LedgerHashes` skip-list entries (§3 I5, §4.8 "Update skip list"): a
//! rolling window of the most recent 256 closed-ledger hashes, plus sparse
//! per-256-sequence buckets for long-range light-client lookups.

use xrpl_codec::{keylet, Field, FieldObject, LedgerEntryType, Value};
use xrpl_hash::Hash;
use xrpl_tree::NodeStore;

use crate::{error::LedgerError, view::LedgerView};

/// Entries retained in the rolling window (§3 I5).
pub const ROLLING_WINDOW_LEN: usize = 256;

fn new_entry() -> FieldObject {
    FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(LedgerEntryType::LedgerHashes.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(Field::Hashes, Value::Vector256(Vec::new()))
}

fn hashes(object: &FieldObject) -> Vec<Hash<32>> {
    object
        .get(Field::Hashes)
        .and_then(Value::as_vector256)
        .map(<[Hash<32>]>::to_vec)
        .unwrap_or_default()
}

pub fn recent_keylet() -> Hash<32> {
    keylet::ledger_hashes_recent()
}

pub fn sparse_keylet(ledger_seq: u32) -> Hash<32> {
    keylet::ledger_hashes_sparse(ledger_seq)
}

/// Append `parent_hash` to the rolling window, evicting the oldest entry
/// once the window holds [`ROLLING_WINDOW_LEN`] hashes.
pub fn append_rolling<S: NodeStore>(
    view: &mut LedgerView<'_, S>,
    parent_hash: Hash<32>,
) -> Result<(), LedgerError> {
    let key = recent_keylet();
    let mut entry = view.read_sle(&key)?.unwrap_or_else(new_entry);

    let mut list = hashes(&entry);
    list.push(parent_hash);
    if list.len() > ROLLING_WINDOW_LEN {
        list.remove(0);
    }
    entry.set(Field::Hashes, Value::Vector256(list));
    view.write_sle(key, &entry)
}

/// Append `parent_hash` to the sparse bucket covering `ledger_seq` (§4.8:
/// only written when `(ledger_seq - 1) & 0xFF == 0`).
pub fn append_sparse<S: NodeStore>(
    view: &mut LedgerView<'_, S>,
    ledger_seq: u32,
    parent_hash: Hash<32>,
) -> Result<(), LedgerError> {
    let key = sparse_keylet(ledger_seq);
    let mut entry = view.read_sle(&key)?.unwrap_or_else(new_entry);

    let mut list = hashes(&entry);
    list.push(parent_hash);
    entry.set(Field::Hashes, Value::Vector256(list));
    view.write_sle(key, &entry)
}

pub fn read_hashes<S: NodeStore>(
    view: &LedgerView<'_, S>,
    key: &Hash<32>,
) -> Result<Vec<Hash<32>>, LedgerError> {
    Ok(view.read_sle(key)?.map(|obj| hashes(&obj)).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpl_tree::{MemNodeStore, StateMap};

    #[test]
    fn rolling_window_evicts_the_oldest_past_256_entries() {
        let base = StateMap::new_state(MemNodeStore::new());
        let mut view = LedgerView::new(&base);

        for i in 0..257u32 {
            append_rolling(&mut view, Hash::new([i as u8; 32])).unwrap();
        }

        let list = read_hashes(&view, &recent_keylet()).unwrap();
        assert_eq!(list.len(), ROLLING_WINDOW_LEN);
        assert_eq!(list[0], Hash::new([1u8; 32]));
        assert_eq!(*list.last().unwrap(), Hash::new([0u8; 32])); // 256 % 256 == 0
    }

    #[test]
    fn sparse_buckets_are_keyed_independently_of_the_rolling_window() {
        let base = StateMap::new_state(MemNodeStore::new());
        let mut view = LedgerView::new(&base);

        append_sparse(&mut view, 1, Hash::new([7u8; 32])).unwrap();
        let list = read_hashes(&view, &sparse_keylet(1)).unwrap();
        assert_eq!(list, vec![Hash::new([7u8; 32])]);
    }
}
