//! Signature verification as an injected capability (§9 "Open Questions").
//!
//! The core never bakes in a particular crypto library: the transaction
//! framework takes a `&dyn SignatureVerifier` and calls it once per
//! signature. Replaying a known-good block uses [`SkipVerifier`]; normal
//! operation uses a real implementation.

use ed25519_dalek::{Signature as EdSignature, Verifier as _, VerifyingKey};
use secp256k1::{ecdsa::Signature as EcdsaSignature, Message, PublicKey, Secp256k1};

/// `{ verify(pub_key, msg, sig) -> bool }`, exactly as specified in §9.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool;
}

/// Accepts every signature without checking it. Used when replaying a block
/// whose validity has already been established by the reference
/// implementation, so the cost of signature checking can be skipped (§9).
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipVerifier;

impl SignatureVerifier for SkipVerifier {
    fn verify(&self, _public_key: &[u8], _message: &[u8], _signature: &[u8]) -> bool {
        true
    }
}

/// Dispatches on the public key's leading type byte: `0xED` selects
/// Ed25519, anything else is treated as a compressed secp256k1 key — the
/// same convention XRPL accounts use to mix key types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier;

impl SignatureVerifier for Verifier {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        match public_key.split_first() {
            Some((0xED, rest)) => verify_ed25519(rest, message, signature),
            _ => verify_secp256k1(public_key, message, signature),
        }
    }
}

fn verify_ed25519(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let sig = EdSignature::from_bytes(&sig_bytes);
    key.verify(message, &sig).is_ok()
}

fn verify_secp256k1(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let secp = Secp256k1::verification_only();
    let Ok(key) = PublicKey::from_slice(public_key) else {
        return false;
    };
    let Ok(sig) = EcdsaSignature::from_der(signature) else {
        return false;
    };
    let digest = crate::digest::sha512_half(message);
    let Ok(msg) = Message::from_digest_slice(digest.as_ref()) else {
        return false;
    };
    secp.verify_ecdsa(&msg, &sig, &key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_verifier_always_accepts() {
        let v = SkipVerifier;
        assert!(v.verify(&[], &[], &[]));
    }

    #[test]
    fn real_verifier_rejects_malformed_input() {
        let v = Verifier;
        assert!(!v.verify(&[0xED; 32], b"msg", &[0u8; 64]));
    }
}
