//! Typed constructors and accessors for the canonical entry types (§3
//! "State Ledger Entry"): `AccountRoot`, `RippleState`, `DirectoryNode`,
//! `LedgerHashes`, `Oracle`, `FeeSettings`, `Amendments`, `Ticket`.
//!
//! Each submodule is a thin typed view over a [`FieldObject`] plus
//! convenience accessors (§9 "Dynamic field values") — handlers never read
//! or write fields by number, only through these.

pub mod account_root;
pub mod directory;
pub mod fee_settings;
pub mod ledger_hashes;
pub mod oracle;
pub mod ripple_state;
pub mod ticket;

use xrpl_codec::{Field, FieldObject, LedgerEntryType, Value};
use xrpl_hash::Hash;

/// Stamp the common bookkeeping fields every mutated SLE carries (§4.7
/// "All handlers must ... stamp `PreviousTxnID` and `PreviousTxnLgrSeq`").
pub fn stamp_previous_txn(object: &mut FieldObject, tx_id: Hash<32>, ledger_seq: u32) {
    object.set(Field::PreviousTxnId, Value::Hash256(tx_id));
    object.set(Field::PreviousTxnLgrSeq, Value::UInt32(ledger_seq));
}

pub fn ledger_entry_type(object: &FieldObject) -> Option<LedgerEntryType> {
    object
        .get(Field::LedgerEntryType)
        .and_then(Value::as_u16)
        .and_then(LedgerEntryType::from_code)
}
