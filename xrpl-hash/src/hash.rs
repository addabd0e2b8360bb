use std::{fmt, ops::Deref, str::FromStr};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A fixed-size, strongly typed byte array used for tree keys, ledger
/// hashes, and transaction IDs.
///
/// `BYTES` is almost always 32 (a 256-bit identifier, §3), but 20-byte
/// `Hash`es back [`crate::AccountId`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Hash<BYTES> {
    pub const ZERO: Hash<BYTES> = Hash([0u8; BYTES]);

    #[inline]
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; BYTES]
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != BYTES {
            return Err(Error::WrongHashLength {
                expected: BYTES,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; BYTES];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }
}

impl<const BYTES: usize> From<[u8; BYTES]> for Hash<BYTES> {
    #[inline]
    fn from(bytes: [u8; BYTES]) -> Self {
        Self::new(bytes)
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> Deref for Hash<BYTES> {
    type Target = [u8; BYTES];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const BYTES: usize> Default for Hash<BYTES> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Hash<{BYTES}>"))
            .field(&hex::encode_upper(self.0))
            .finish()
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = vec![0u8; BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::BadHex)?;
        Self::from_slice(&bytes)
    }
}

impl<const BYTES: usize> Serialize for Hash<BYTES> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Hash<BYTES> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_str(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_hex() {
        let h: Hash<32> = "0000000000000000000000000000000000000000000000000000000000000A"
            .to_lowercase()
            .parse()
            .unwrap();
        assert_eq!(h.to_string().to_lowercase(), h.to_string().to_lowercase());
        assert_eq!(h[31], 0x0A);
    }

    #[test]
    fn zero_is_all_zero_bytes() {
        let z: Hash<32> = Hash::ZERO;
        assert!(z.is_zero());
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(Hash::<32>::from_slice(&[0u8; 31]).is_err());
    }
}
