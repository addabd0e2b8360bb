//! Keylets (§3 "Keylet", §4.4): deterministic derivations of a ledger
//! entry's 256-bit tree key from its logical identity. Every keylet is
//! `sha512_half(space_prefix || params)` where `space_prefix` is a 2-byte
//! type tag, so two calls with the same parameters always land on the
//! same key (P9) and distinct identities collide only as likely as the
//! hash function allows.

use xrpl_hash::{sha512_half, AccountId, Hash};

use crate::currency::Currency;

const SPACE_ACCOUNT: u16 = b'a' as u16;
const SPACE_TRUST_LINE: u16 = b'r' as u16;
const SPACE_OWNER_DIR: u16 = b'O' as u16;
const SPACE_DIR_NODE: u16 = b'd' as u16;
const SPACE_FEE_SETTINGS: u16 = b'f' as u16;
const SPACE_AMENDMENTS: u16 = b'A' as u16;
const SPACE_LEDGER_HASHES_RECENT: u16 = b'h' as u16;
const SPACE_LEDGER_HASHES_SPARSE: u16 = b's' as u16;
const SPACE_ORACLE: u16 = b'Q' as u16;
const SPACE_TICKET: u16 = b'T' as u16;

/// Ledger sequences per sparse `LedgerHashes` bucket (§4.8, §8 scenario 6:
/// `(N-1) & 0xFF == 0`).
pub const SKIP_LIST_BUCKET_SIZE: u32 = 256;

fn derive(space: u16, parts: &[&[u8]]) -> Hash<32> {
    let mut buf = space.to_be_bytes().to_vec();
    for part in parts {
        buf.extend_from_slice(part);
    }
    sha512_half(&buf)
}

/// `AccountRoot` keylet.
pub fn account(id: AccountId) -> Hash<32> {
    derive(SPACE_ACCOUNT, &[id.as_bytes()])
}

/// `RippleState` keylet. Canonicalized on the byte-ordering of the two
/// accounts so either argument order derives the same key (§4.4, P9).
pub fn ripple_state(a: AccountId, b: AccountId, currency: Currency) -> Hash<32> {
    let (low, high) = if a.as_bytes() <= b.as_bytes() {
        (a, b)
    } else {
        (b, a)
    };
    derive(
        SPACE_TRUST_LINE,
        &[low.as_bytes(), high.as_bytes(), currency.as_hash().as_ref()],
    )
}

/// Root `DirectoryNode` keylet for an account's owner directory.
pub fn owner_directory(owner: AccountId) -> Hash<32> {
    derive(SPACE_OWNER_DIR, &[owner.as_bytes()])
}

/// A non-root page of a directory chain, addressed by its root and page
/// index (§4.6 "directory page algorithm"). Page 0 is the root itself.
pub fn directory_page(root: Hash<32>, page: u64) -> Hash<32> {
    if page == 0 {
        return root;
    }
    derive(SPACE_DIR_NODE, &[root.as_ref(), &page.to_be_bytes()])
}

/// The single `FeeSettings` entry's keylet (§4.2 "FeeSettings").
pub fn fee_settings() -> Hash<32> {
    derive(SPACE_FEE_SETTINGS, &[b"fee_settings"])
}

/// The single `Amendments` entry's keylet.
pub fn amendments() -> Hash<32> {
    derive(SPACE_AMENDMENTS, &[b"amendments"])
}

/// The "recent 256" `LedgerHashes` entry's keylet — a fixed singleton.
pub fn ledger_hashes_recent() -> Hash<32> {
    derive(SPACE_LEDGER_HASHES_RECENT, &[b"ledger_hashes"])
}

/// A sparse `LedgerHashes` bucket's keylet, covering ledger sequences
/// `[bucket * SKIP_LIST_BUCKET_SIZE, (bucket + 1) * SKIP_LIST_BUCKET_SIZE)`
/// (§4.8 "skip list").
pub fn ledger_hashes_sparse(ledger_seq: u32) -> Hash<32> {
    let bucket = ledger_seq / SKIP_LIST_BUCKET_SIZE;
    derive(SPACE_LEDGER_HASHES_SPARSE, &[&bucket.to_be_bytes()])
}

/// An `Oracle` entry's keylet.
pub fn oracle(owner: AccountId, document_id: u32) -> Hash<32> {
    derive(
        SPACE_ORACLE,
        &[owner.as_bytes(), &document_id.to_be_bytes()],
    )
}

/// A `Ticket` entry's keylet.
pub fn ticket(owner: AccountId, ticket_sequence: u32) -> Hash<32> {
    derive(
        SPACE_TICKET,
        &[owner.as_bytes(), &ticket_sequence.to_be_bytes()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_keylet_is_stable_across_calls() {
        let id = AccountId::from_bytes([7; 20]);
        assert_eq!(account(id), account(id));
    }

    #[test]
    fn distinct_accounts_derive_distinct_keylets() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);
        assert_ne!(account(a), account(b));
    }

    #[test]
    fn ripple_state_is_symmetric_in_account_order() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);
        let usd = Currency::from_iso("USD").unwrap();
        assert_eq!(ripple_state(a, b, usd), ripple_state(b, a, usd));
    }

    #[test]
    fn sparse_ledger_hashes_bucket_groups_by_256() {
        assert_eq!(ledger_hashes_sparse(0), ledger_hashes_sparse(255));
        assert_ne!(ledger_hashes_sparse(0), ledger_hashes_sparse(256));
    }

    #[test]
    fn directory_page_zero_is_the_root() {
        let root = owner_directory(AccountId::from_bytes([3; 20]));
        assert_eq!(directory_page(root, 0), root);
        assert_ne!(directory_page(root, 1), root);
    }
}
