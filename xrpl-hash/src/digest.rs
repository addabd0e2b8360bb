use ripemd::Ripemd160;
use sha2::{Digest as _, Sha256, Sha512};

use crate::{account::AccountId, hash::Hash};

/// SHA-512, truncated to its first 32 bytes (§4.1).
///
/// This is the ledger's workhorse hash: every tree node, transaction ID, and
/// ledger hash is `sha512_half` of some canonically encoded byte string.
pub fn sha512_half(bytes: &[u8]) -> Hash<32> {
    let digest = Sha512::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    Hash::new(out)
}

/// Plain SHA-256, used by the base58-check double-hash checksum.
pub fn sha256(bytes: &[u8]) -> Hash<32> {
    Hash::new(Sha256::digest(bytes).into())
}

/// `RIPEMD-160(SHA-256(public_key))` — the 20-byte AccountID derivation
/// (§4.1). The zero AccountID is never produced by this function; it is
/// reserved to denote native XRP.
pub fn account_id_from_public_key(public_key: &[u8]) -> AccountId {
    let sha = Sha256::digest(public_key);
    let ripe = Ripemd160::digest(sha);
    AccountId::new(Hash::new(ripe.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha512_half_is_32_bytes_of_the_full_digest() {
        let full = sha2::Sha512::digest(b"xrpl");
        let half = sha512_half(b"xrpl");
        assert_eq!(&full[..32], half.as_ref());
    }

    #[test]
    fn account_id_is_never_zero_for_a_real_key() {
        let id = account_id_from_public_key(b"some public key bytes");
        assert!(!id.is_zero());
    }
}
