//! Field registry and canonical binary codec (§3, §4.2, §4.3) for typed
//! field objects: transactions, ledger entries, and transaction metadata.
//!
//! A [`FieldObject`] is a `BTreeMap<Field, Value>` that orders itself the
//! way the wire format requires; [`encode`]/[`decode`] convert it to and
//! from the canonical binary form. [`keylet`] derives the tree key a given
//! ledger entry lives at.

pub mod amount;
pub mod currency;
pub mod decode;
pub mod encode;
pub mod error;
pub mod field;
pub mod keylet;
pub mod object;
pub mod pathset;
pub mod value;
pub mod vl;

pub use amount::{Amount, IssuedAmount};
pub use currency::Currency;
pub use decode::decode;
pub use encode::{encode, encode_for_multisigning, encode_for_signing};
pub use error::{DecodeError, EncodeError};
pub use field::{Field, LedgerEntryType, TransactionType, TypeCode};
pub use object::FieldObject;
pub use pathset::{Path, PathSet, PathStep};
pub use value::Value;
