//! Field registry (§4.2) and the static tables `TransactionType`/
//! `LedgerEntryType` derive from it.

mod registry;
mod types;

pub use registry::{by_key, by_name, info, FieldInfo, FIELD_TABLE};
pub use types::{LedgerEntryType, TransactionType, TypeCode};

/// Every named field the codec knows how to serialize (§4.2). A `Field` is
/// a thin handle into the [`registry`]; its wire shape (`type_code`,
/// `field_code`, signing/VL booleans) always comes from there, never from
/// the variant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LedgerEntryType,
    TransactionType,
    Flags,
    SourceTag,
    Sequence,
    PreviousTxnLgrSeq,
    TransferRate,
    OwnerCount,
    DestinationTag,
    FirstLedgerSequence,
    LastLedgerSequence,
    ReferenceFeeUnits,
    ReserveBase,
    ReserveIncrement,
    TicketSequence,
    OracleDocumentId,
    LastUpdateTime,
    IndexNext,
    IndexPrevious,
    OwnerNode,
    BaseFee,
    LowNode,
    HighNode,
    AssetPrice,
    EmailHash,
    LedgerHash,
    ParentHash,
    TransactionHash,
    AccountHash,
    PreviousTxnId,
    RootIndex,
    AccountTxnId,
    Amount,
    Balance,
    LimitAmount,
    LowLimit,
    HighLimit,
    Fee,
    SendMax,
    SigningPubKey,
    TxnSignature,
    Uri,
    Domain,
    MemoType,
    MemoData,
    MemoFormat,
    Provider,
    AssetClass,
    Account,
    Owner,
    Destination,
    RegularKey,
    Memo,
    PriceData,
    Memos,
    PriceDataSeries,
    Scale,
    BaseAsset,
    QuoteAsset,
    Indexes,
    Hashes,
    Amendments,

    // --- Transaction metadata (SPEC_FULL "Metadata wire encoding") ---
    TransactionIndex,
    TransactionResult,
    LedgerIndex,
    FinalFields,
    PreviousFields,
    NewFields,
    CreatedNode,
    ModifiedNode,
    DeletedNode,
    Meta,
    AffectedNodes,
}

impl Field {
    pub fn info(self) -> FieldInfo {
        registry::info(self)
    }

    pub fn type_code(self) -> TypeCode {
        self.info().type_code
    }

    pub fn field_code(self) -> u8 {
        self.info().field_code
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn is_signing(self) -> bool {
        self.info().signing
    }

    pub fn is_vl_encoded(self) -> bool {
        self.info().vl_encoded
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields are ordered by `(type-code, field-code)` ascending — the
/// canonical binary-encoding order (§3). Storing field objects in a
/// `BTreeMap<Field, Value>` therefore yields the correct wire order for
/// free; see [`crate::object::FieldObject`].
impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.info().key().cmp(&other.info().key())
    }
}
