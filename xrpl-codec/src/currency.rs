use xrpl_hash::Hash;

/// A 20-byte currency code (§3 "Amount"). ISO-style 3-letter codes (`"USD"`)
/// are ASCII-padded into the low bytes of an otherwise-zero 20-byte value;
/// anything else is an opaque 20-byte code (a "non-standard currency").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Currency(Hash<20>);

/// The reserved all-zero code denoting native XRP inside an Issue-shaped
/// pair; issued amounts never legitimately carry it.
pub const XRP: Currency = Currency(Hash::ZERO);

impl Currency {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(Hash::new(bytes))
    }

    /// Encode a 3-letter ISO currency code the way the reference does: the
    /// three ASCII bytes at offset 12, zero elsewhere.
    pub fn from_iso(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return None;
        }
        let mut raw = [0u8; 20];
        raw[12..15].copy_from_slice(bytes);
        Some(Self(Hash::new(raw)))
    }

    /// The ISO code, if this value was constructed in the standard layout
    /// (zero everywhere except the 3 ASCII bytes at offset 12).
    pub fn as_iso(&self) -> Option<String> {
        let raw: &[u8; 20] = &self.0;
        let is_standard_layout =
            raw[..12].iter().all(|&b| b == 0) && raw[15..].iter().all(|&b| b == 0);
        if !is_standard_layout {
            return None;
        }
        std::str::from_utf8(&raw[12..15])
            .ok()
            .map(str::to_owned)
    }

    pub fn is_xrp(&self) -> bool {
        *self == XRP
    }

    pub fn as_hash(&self) -> Hash<20> {
        self.0
    }
}

impl From<Hash<20>> for Currency {
    fn from(hash: Hash<20>) -> Self {
        Self(hash)
    }
}

impl From<Currency> for Hash<20> {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_code_round_trips() {
        let usd = Currency::from_iso("USD").unwrap();
        assert_eq!(usd.as_iso().as_deref(), Some("USD"));
    }

    #[test]
    fn rejects_non_iso_codes() {
        assert!(Currency::from_iso("usd").is_none());
        assert!(Currency::from_iso("TOOLONG").is_none());
    }

    #[test]
    fn xrp_is_the_zero_code() {
        assert!(XRP.is_xrp());
        assert!(Currency::from_bytes([0; 20]).is_xrp());
    }
}
