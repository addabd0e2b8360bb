use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{base58, error::Error, hash::Hash};

/// Base58-check version byte for classic XRPL account addresses.
const ACCOUNT_PREFIX: u8 = 0x00;

/// A 20-byte XRPL account identifier (§3).
///
/// The all-zero value is reserved to denote native XRP rather than any real
/// account, matching the "issuer" slot of a native [`crate::Hash`]-free
/// amount.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Hash<20>);

impl AccountId {
    pub const ZERO: AccountId = AccountId(Hash::ZERO);

    #[inline]
    pub const fn new(hash: Hash<20>) -> Self {
        Self(hash)
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(Hash::new(bytes))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_base58(self) -> String {
        base58::encode_base58_check(self.0.as_ref(), ACCOUNT_PREFIX)
    }

    pub fn from_base58(s: &str) -> Result<Self, Error> {
        let bytes = base58::decode_base58_check(s, ACCOUNT_PREFIX)?;
        Ok(Self(Hash::from_slice(&bytes)?))
    }
}

impl From<Hash<20>> for AccountId {
    fn from(hash: Hash<20>) -> Self {
        Self(hash)
    }
}

impl From<AccountId> for Hash<20> {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_base58())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // P8: AccountID base58-check round-trip.
    #[test]
    fn round_trips_through_base58_check() {
        let id = AccountId::from_bytes(*b"01234567890123456789");
        let encoded = id.to_base58();
        let decoded = AccountId::from_base58(&encoded).unwrap();
        assert_eq!(id, decoded);
    }

    #[test]
    fn rejects_non_alphabet_characters() {
        // '0', 'O', 'I', 'l' are excluded from the XRPL alphabet.
        assert!(AccountId::from_base58("r0l0l0l0l0l0l0l0l0l0l0l0l0").is_err());
    }

    #[test]
    fn zero_account_denotes_native_xrp() {
        assert!(AccountId::ZERO.is_zero());
    }
}
