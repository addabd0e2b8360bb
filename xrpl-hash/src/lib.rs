//! Hashing, AccountID derivation, base58-check codec, and the
//! domain-separation hash prefixes used throughout the ledger core.
//!
//! Every other crate in this workspace depends on this one and on nothing
//! else below it: it has no notion of fields, transactions, or trees, only
//! bytes in and bytes out.

mod account;
mod base58;
mod digest;
mod error;
mod hash;
mod prefix;
mod verify;

pub use account::AccountId;
pub use base58::{decode_base58_check, encode_base58_check};
pub use digest::{account_id_from_public_key, sha256, sha512_half};
pub use error::Error;
pub use hash::Hash;
pub use prefix::HashPrefix;
pub use verify::{SignatureVerifier, SkipVerifier, Verifier};
