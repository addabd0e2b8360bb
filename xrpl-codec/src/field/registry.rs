//! The static field registry (§4.2): a table of every field this core's
//! codec knows about, each tagged with its `(type-code, field-code)` pair
//! and the three booleans from §3 ("FieldObject").
//!
//! The table is the single authoritative source; every lookup (by name, by
//! wire tag, by [`super::Field`] variant) derives from it and is computed
//! once at process start via [`once_cell::sync::Lazy`], matching this
//! workspace's "explicit builder populated once" re-architecture of the
//! teacher's implicit package-init registration (see `DESIGN.md`).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{types::TypeCode, Field};

/// One row of the field registry.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub field: Field,
    pub type_code: TypeCode,
    pub field_code: u8,
    pub name: &'static str,
    /// Included in an object's full binary encoding.
    pub serialized: bool,
    /// Included in the restricted signing-hash encoding.
    pub signing: bool,
    /// Length-prefixed per §3's variable-length framing rules.
    pub vl_encoded: bool,
}

impl FieldInfo {
    pub const fn key(&self) -> (u8, u8) {
        (self.type_code.code(), self.field_code)
    }
}

macro_rules! field_table {
    ($(($variant:ident, $type_code:expr, $field_code:expr, $name:expr, $signing:expr, $vl:expr)),* $(,)?) => {
        /// Every field known to the codec, in declaration order (not
        /// canonical encoding order — that ordering is computed from
        /// `type_code`/`field_code` at lookup time).
        pub const FIELD_TABLE: &[FieldInfo] = &[
            $(
                FieldInfo {
                    field: Field::$variant,
                    type_code: $type_code,
                    field_code: $field_code,
                    name: $name,
                    serialized: true,
                    signing: $signing,
                    vl_encoded: $vl,
                },
            )*
        ];
    };
}

field_table! {
    // --- UInt16 ---
    (LedgerEntryType, TypeCode::UInt16, 1, "LedgerEntryType", true, false),
    (TransactionType, TypeCode::UInt16, 2, "TransactionType", true, false),

    // --- UInt32 ---
    (Flags, TypeCode::UInt32, 2, "Flags", true, false),
    (SourceTag, TypeCode::UInt32, 3, "SourceTag", true, false),
    (Sequence, TypeCode::UInt32, 4, "Sequence", true, false),
    (PreviousTxnLgrSeq, TypeCode::UInt32, 5, "PreviousTxnLgrSeq", true, false),
    (TransferRate, TypeCode::UInt32, 11, "TransferRate", true, false),
    (OwnerCount, TypeCode::UInt32, 13, "OwnerCount", true, false),
    (DestinationTag, TypeCode::UInt32, 14, "DestinationTag", true, false),
    (FirstLedgerSequence, TypeCode::UInt32, 26, "FirstLedgerSequence", true, false),
    (LastLedgerSequence, TypeCode::UInt32, 27, "LastLedgerSequence", true, false),
    (ReferenceFeeUnits, TypeCode::UInt32, 30, "ReferenceFeeUnits", true, false),
    (ReserveBase, TypeCode::UInt32, 31, "ReserveBase", true, false),
    (ReserveIncrement, TypeCode::UInt32, 32, "ReserveIncrement", true, false),
    (TicketSequence, TypeCode::UInt32, 41, "TicketSequence", true, false),
    (OracleDocumentId, TypeCode::UInt32, 51, "OracleDocumentID", true, false),
    (LastUpdateTime, TypeCode::UInt32, 53, "LastUpdateTime", true, false),

    // --- UInt64 ---
    (IndexNext, TypeCode::UInt64, 1, "IndexNext", true, false),
    (IndexPrevious, TypeCode::UInt64, 2, "IndexPrevious", true, false),
    (OwnerNode, TypeCode::UInt64, 4, "OwnerNode", true, false),
    (BaseFee, TypeCode::UInt64, 5, "BaseFee", true, false),
    (LowNode, TypeCode::UInt64, 7, "LowNode", true, false),
    (HighNode, TypeCode::UInt64, 8, "HighNode", true, false),
    (AssetPrice, TypeCode::UInt64, 9, "AssetPrice", true, false),

    // --- Hash128 ---
    (EmailHash, TypeCode::Hash128, 1, "EmailHash", true, false),

    // --- Hash256 --- (LedgerHash/ParentHash/TransactionHash/AccountHash
    // are ledger-header-only fields; they never appear on a signable
    // transaction object, so they're excluded from the signing set too)
    (LedgerHash, TypeCode::Hash256, 1, "LedgerHash", false, false),
    (ParentHash, TypeCode::Hash256, 2, "ParentHash", false, false),
    (TransactionHash, TypeCode::Hash256, 3, "TransactionHash", false, false),
    (AccountHash, TypeCode::Hash256, 4, "AccountHash", false, false),
    (PreviousTxnId, TypeCode::Hash256, 5, "PreviousTxnID", true, false),
    (RootIndex, TypeCode::Hash256, 8, "RootIndex", true, false),
    (AccountTxnId, TypeCode::Hash256, 9, "AccountTxnID", true, false),

    // --- Amount ---
    (Amount, TypeCode::Amount, 1, "Amount", true, false),
    (Balance, TypeCode::Amount, 2, "Balance", true, false),
    (LimitAmount, TypeCode::Amount, 3, "LimitAmount", true, false),
    (LowLimit, TypeCode::Amount, 6, "LowLimit", true, false),
    (HighLimit, TypeCode::Amount, 7, "HighLimit", true, false),
    (Fee, TypeCode::Amount, 8, "Fee", true, false),
    (SendMax, TypeCode::Amount, 9, "SendMax", true, false),

    // --- Blob (VL) --- (TxnSignature is the signature itself: it is
    // serialized on the full transaction but excluded from the signing
    // hash it is computed over, per §3/§4.3 "signing order")
    (SigningPubKey, TypeCode::Blob, 3, "SigningPubKey", true, true),
    (TxnSignature, TypeCode::Blob, 4, "TxnSignature", false, true),
    (Uri, TypeCode::Blob, 5, "URI", true, true),
    (Domain, TypeCode::Blob, 7, "Domain", true, true),
    (MemoType, TypeCode::Blob, 12, "MemoType", true, true),
    (MemoData, TypeCode::Blob, 13, "MemoData", true, true),
    (MemoFormat, TypeCode::Blob, 14, "MemoFormat", true, true),
    (Provider, TypeCode::Blob, 24, "Provider", true, true),
    (AssetClass, TypeCode::Blob, 25, "AssetClass", true, true),

    // --- AccountID ---
    (Account, TypeCode::AccountId, 1, "Account", true, true),
    (Owner, TypeCode::AccountId, 2, "Owner", true, true),
    (Destination, TypeCode::AccountId, 3, "Destination", true, true),
    (RegularKey, TypeCode::AccountId, 8, "RegularKey", true, true),

    // --- Object ---
    (Memo, TypeCode::Object, 10, "Memo", true, false),
    (PriceData, TypeCode::Object, 11, "PriceData", true, false),

    // --- Array ---
    (Memos, TypeCode::Array, 9, "Memos", true, false),
    (PriceDataSeries, TypeCode::Array, 10, "PriceDataSeries", true, false),

    // --- UInt8 ---
    (Scale, TypeCode::UInt8, 1, "Scale", true, false),

    // --- Hash160 ---
    (BaseAsset, TypeCode::Hash160, 1, "BaseAsset", true, false),
    (QuoteAsset, TypeCode::Hash160, 2, "QuoteAsset", true, false),

    // --- Vector256 ---
    (Indexes, TypeCode::Vector256, 1, "Indexes", true, false),
    (Hashes, TypeCode::Vector256, 2, "Hashes", true, false),
    (Amendments, TypeCode::Vector256, 3, "Amendments", true, false),

    // --- Transaction metadata (§4.8 "tx+meta leaf"; field codes are this
    // workspace's own convention — spec.md leaves the exact metadata wire
    // schema to "the reference", see DESIGN.md). Metadata is assembled
    // after a transaction is applied, so none of it is ever part of a
    // signing hash.
    (TransactionIndex, TypeCode::UInt32, 61, "TransactionIndex", false, false),
    (TransactionResult, TypeCode::UInt8, 2, "TransactionResult", false, false),
    (LedgerIndex, TypeCode::Hash256, 20, "LedgerIndex", false, false),
    (FinalFields, TypeCode::Object, 20, "FinalFields", false, false),
    (PreviousFields, TypeCode::Object, 21, "PreviousFields", false, false),
    (NewFields, TypeCode::Object, 22, "NewFields", false, false),
    (CreatedNode, TypeCode::Object, 23, "CreatedNode", false, false),
    (ModifiedNode, TypeCode::Object, 24, "ModifiedNode", false, false),
    (DeletedNode, TypeCode::Object, 25, "DeletedNode", false, false),
    (Meta, TypeCode::Object, 26, "Meta", false, false),
    (AffectedNodes, TypeCode::Array, 30, "AffectedNodes", false, false),
}

static BY_FIELD: Lazy<HashMap<Field, FieldInfo>> =
    Lazy::new(|| FIELD_TABLE.iter().map(|info| (info.field, *info)).collect());

static BY_KEY: Lazy<HashMap<(u8, u8), FieldInfo>> =
    Lazy::new(|| FIELD_TABLE.iter().map(|info| (info.key(), *info)).collect());

static BY_NAME: Lazy<HashMap<&'static str, FieldInfo>> =
    Lazy::new(|| FIELD_TABLE.iter().map(|info| (info.name, *info)).collect());

pub fn info(field: Field) -> FieldInfo {
    *BY_FIELD
        .get(&field)
        .expect("every Field variant has a FIELD_TABLE row")
}

pub fn by_key(type_code: u8, field_code: u8) -> Option<FieldInfo> {
    BY_KEY.get(&(type_code, field_code)).copied()
}

pub fn by_name(name: &str) -> Option<FieldInfo> {
    BY_NAME.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicate_keys() {
        let mut seen = std::collections::HashSet::new();
        for info in FIELD_TABLE {
            assert!(seen.insert(info.key()), "duplicate key for {:?}", info.field);
        }
    }

    #[test]
    fn table_has_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for info in FIELD_TABLE {
            assert!(seen.insert(info.name), "duplicate name {}", info.name);
        }
    }

    #[test]
    fn every_field_variant_resolves() {
        for info in FIELD_TABLE {
            assert_eq!(super::info(info.field).field, info.field);
        }
    }

    #[test]
    fn txn_signature_is_excluded_from_the_signing_set() {
        assert!(!info(Field::TxnSignature).signing);
        assert!(info(Field::TxnSignature).serialized);
    }

    #[test]
    fn signing_pub_key_is_included_in_the_signing_set() {
        assert!(info(Field::SigningPubKey).signing);
    }
}
