use xrpl_hash::{AccountId, Hash};

use crate::{amount::Amount, object::FieldObject, pathset::PathSet};

/// A decoded field value: a strongly-typed tagged sum in place of a
/// dynamically-typed decode map.
///
/// Per-type transaction/SLE structs (in `xrpl-ledger`) are views over a
/// [`FieldObject`] plus typed accessors; they do not duplicate storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Hash128(Hash<16>),
    Hash160(Hash<20>),
    Hash256(Hash<32>),
    Blob(Vec<u8>),
    AccountId(AccountId),
    Amount(Amount),
    PathSet(PathSet),
    Vector256(Vec<Hash<32>>),
    Array(Vec<FieldObject>),
    Object(FieldObject),
}

impl Value {
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Value::UInt8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::UInt16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_hash256(&self) -> Option<Hash<32>> {
        match self {
            Value::Hash256(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_hash160(&self) -> Option<Hash<20>> {
        match self {
            Value::Hash160(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_account_id(&self) -> Option<AccountId> {
        match self {
            Value::AccountId(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<&Amount> {
        match self {
            Value::Amount(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector256(&self) -> Option<&[Hash<32>]> {
        match self {
            Value::Vector256(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldObject]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FieldObject> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }
}
