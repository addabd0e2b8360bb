use std::sync::OnceLock;

use crate::error::Error;

/// XRPL's base58 alphabet (§3). It is a permutation of the usual Bitcoin
/// alphabet that additionally excludes visually ambiguous characters; the
/// permutation itself, not just the exclusions, is part of the wire
/// contract — decoding with the Bitcoin alphabet produces different bytes.
const XRPL_ALPHABET_BYTES: &[u8; 58] =
    b"rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";

fn alphabet() -> &'static bs58::Alphabet {
    static ALPHABET: OnceLock<bs58::Alphabet> = OnceLock::new();
    ALPHABET.get_or_init(|| {
        bs58::Alphabet::new(XRPL_ALPHABET_BYTES).expect("XRPL alphabet is a valid permutation")
    })
}

/// Encode `payload` as base58-check: `prefix || payload`, followed by the
/// first 4 bytes of `SHA-256(SHA-256(prefix || payload))`.
pub fn encode_base58_check(payload: &[u8], prefix: u8) -> String {
    let mut buf = Vec::with_capacity(1 + payload.len());
    buf.push(prefix);
    buf.extend_from_slice(payload);
    bs58::encode(&buf)
        .with_alphabet(alphabet())
        .with_check()
        .into_string()
}

/// Decode and verify a base58-check string, returning the payload bytes
/// (without the version/prefix byte or the checksum) after confirming the
/// version byte matches `expected_prefix`.
pub fn decode_base58_check(s: &str, expected_prefix: u8) -> Result<Vec<u8>, Error> {
    let decoded = bs58::decode(s)
        .with_alphabet(alphabet())
        .with_check(None)
        .into_vec()
        .map_err(|_| Error::BadBase58)?;

    let (prefix, payload) = decoded.split_first().ok_or(Error::ChecksumTooShort)?;
    if *prefix != expected_prefix {
        return Err(Error::PrefixMismatch {
            expected: expected_prefix,
            actual: *prefix,
        });
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_payload() {
        let payload = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20];
        let encoded = encode_base58_check(&payload, 0x00);
        let decoded = decode_base58_check(&encoded, 0x00).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn wrong_prefix_is_rejected() {
        let payload = [0u8; 20];
        let encoded = encode_base58_check(&payload, 0x00);
        assert!(decode_base58_check(&encoded, 0x05).is_err());
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let payload = [7u8; 20];
        let mut encoded = encode_base58_check(&payload, 0x00).into_bytes();
        let last = encoded.len() - 1;
        encoded[last] = if encoded[last] == b'r' { b'p' } else { b'r' };
        let encoded = String::from_utf8(encoded).unwrap();
        assert!(decode_base58_check(&encoded, 0x00).is_err());
    }

    #[test]
    fn non_alphabet_character_fails() {
        assert!(decode_base58_check("0OIl", 0x00).is_err());
    }
}
