/// Wire-type ordinals (§3 "Field"). These are the `type-code` half of a
/// field's `(type-code, field-code)` pair and are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TypeCode {
    UInt16 = 1,
    UInt32 = 2,
    UInt64 = 3,
    Hash128 = 4,
    Hash256 = 5,
    Amount = 6,
    Blob = 7,
    AccountId = 8,
    Object = 14,
    Array = 15,
    UInt8 = 16,
    Hash160 = 17,
    PathSet = 18,
    Vector256 = 19,
}

impl TypeCode {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Transaction-type tags (`TransactionType`, a `UInt16` field whose value
/// selects the per-type handler, §4.2). Only the subset this core's handlers
/// implement is enumerated; pseudo-transaction types are included because
/// the block processor must recognize (without applying) them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum TransactionType {
    Payment = 0,
    TrustSet = 20,
    OracleSet = 51,
    OracleDelete = 52,
    EnableAmendment = 100,
    SetFee = 101,
}

impl TransactionType {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Payment),
            20 => Some(Self::TrustSet),
            51 => Some(Self::OracleSet),
            52 => Some(Self::OracleDelete),
            100 => Some(Self::EnableAmendment),
            101 => Some(Self::SetFee),
            _ => None,
        }
    }
}

/// Ledger-entry-type tags (`LedgerEntryType`, a `UInt16` field identifying
/// an SLE's kind, §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum LedgerEntryType {
    AccountRoot = 0x0061,
    DirectoryNode = 0x0064,
    Amendments = 0x0066,
    LedgerHashes = 0x0068,
    RippleState = 0x0072,
    FeeSettings = 0x0073,
    Ticket = 0x0054,
    Oracle = 0x0080,
}

impl LedgerEntryType {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0061 => Some(Self::AccountRoot),
            0x0064 => Some(Self::DirectoryNode),
            0x0066 => Some(Self::Amendments),
            0x0068 => Some(Self::LedgerHashes),
            0x0072 => Some(Self::RippleState),
            0x0073 => Some(Self::FeeSettings),
            0x0054 => Some(Self::Ticket),
            0x0080 => Some(Self::Oracle),
            _ => None,
        }
    }
}
