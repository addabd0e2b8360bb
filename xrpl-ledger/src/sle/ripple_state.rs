//! `RippleState` (§3 "Trust line / RippleState", §4.7 "TrustSet"): a
//! bidirectional balance/limit pair between two accounts for one currency.
//!
//! The entry is stored once, addressed by the lexicographically lower of
//! the two accounts ("low") and the higher ("high") — `Balance` is always
//! signed from the low side's perspective, so the high side's balance is
//! its negation.

use xrpl_codec::{Amount, Currency, Field, FieldObject, IssuedAmount, LedgerEntryType, Value};
use xrpl_hash::AccountId;

/// Per-side reserve-exemption flags, set once a page has been created and
/// never otherwise meaningful; carried for completeness since the registry
/// models `Flags` as a plain `UInt32` bitfield.
pub const LSF_LOW_RESERVE: u32 = 0x0001_0000;
pub const LSF_HIGH_RESERVE: u32 = 0x0002_0000;
pub const LSF_LOW_AUTH: u32 = 0x0004_0000;
pub const LSF_HIGH_AUTH: u32 = 0x0008_0000;
pub const LSF_LOW_NO_RIPPLE: u32 = 0x0010_0000;
pub const LSF_HIGH_NO_RIPPLE: u32 = 0x0020_0000;
pub const LSF_LOW_FREEZE: u32 = 0x0040_0000;
pub const LSF_HIGH_FREEZE: u32 = 0x0080_0000;
pub const LSF_LOW_DEEP_FREEZE: u32 = 0x0100_0000;
pub const LSF_HIGH_DEEP_FREEZE: u32 = 0x0200_0000;

/// Which side of a trust line an account is on, and hence which limit,
/// node index, and flag bits are "its own" (§4.7 "Determine low/high by
/// AccountID lexicographic order").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Low,
    High,
}

pub fn side_of(account: AccountId, counterparty: AccountId) -> Side {
    if account.as_bytes() <= counterparty.as_bytes() {
        Side::Low
    } else {
        Side::High
    }
}

pub fn new(
    low: AccountId,
    high: AccountId,
    currency: Currency,
    low_limit: u64,
    high_limit: u64,
) -> FieldObject {
    FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(LedgerEntryType::RippleState.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(
            Field::Balance,
            Value::Amount(Amount::Issued(IssuedAmount::zero(currency, AccountId::ZERO))),
        )
        .with(
            Field::LowLimit,
            Value::Amount(issued_limit(currency, high, low_limit)),
        )
        .with(
            Field::HighLimit,
            Value::Amount(issued_limit(currency, low, high_limit)),
        )
        .with(Field::LowNode, Value::UInt64(0))
        .with(Field::HighNode, Value::UInt64(0))
}

/// A `LimitAmount`/`Balance`-shaped issued amount: the limit a side has
/// extended to the *other* account, so its issuer slot names the
/// counterparty, matching how the reference stores trust-line limits.
fn issued_limit(currency: Currency, issuer: AccountId, limit: u64) -> Amount {
    if limit == 0 {
        Amount::Issued(IssuedAmount::zero(currency, issuer))
    } else {
        // Canonical mantissa/exponent normalization for a plain integer
        // limit: scale into [10^15, 10^16) and record the compensating
        // exponent.
        let (mantissa, exponent) = normalize(limit as i128);
        Amount::Issued(
            IssuedAmount::new(mantissa, exponent, true, currency, issuer)
                .expect("normalize produces a canonical mantissa"),
        )
    }
}

/// Scale `value` into the canonical `[10^15, 10^16)` mantissa range,
/// returning `(mantissa, exponent)` such that `mantissa * 10^exponent ==
/// value` (for integral `value`; trust-line limits in this core are always
/// whole-unit amounts).
fn normalize(value: i128) -> (u64, i8) {
    if value == 0 {
        return (0, 0);
    }
    let mut mantissa = value.unsigned_abs();
    let mut exponent: i32 = 0;
    while mantissa >= 10_000_000_000_000_000 {
        mantissa /= 10;
        exponent += 1;
    }
    while mantissa < 1_000_000_000_000_000 {
        mantissa *= 10;
        exponent -= 1;
    }
    (mantissa as u64, exponent as i8)
}

pub fn low_limit(object: &FieldObject) -> u64 {
    amount_to_drops_like(object, Field::LowLimit)
}

pub fn high_limit(object: &FieldObject) -> u64 {
    amount_to_drops_like(object, Field::HighLimit)
}

/// `mantissa * 10^exponent`, the unsigned magnitude an [`IssuedAmount`]
/// represents.
fn issued_magnitude(issued: &IssuedAmount) -> i128 {
    if issued.mantissa() == 0 {
        return 0;
    }
    let mantissa = issued.mantissa() as i128;
    let exponent = issued.exponent() as i32;
    if exponent >= 0 {
        mantissa * 10i128.pow(exponent as u32)
    } else {
        mantissa / 10i128.pow((-exponent) as u32)
    }
}

fn amount_to_drops_like(object: &FieldObject, field: Field) -> u64 {
    match object.get(field).and_then(Value::as_amount) {
        Some(Amount::Issued(issued)) => issued_magnitude(issued).max(0) as u64,
        _ => 0,
    }
}

/// Balance from the low side's perspective; the high side's is its
/// negation.
pub fn balance_low(object: &FieldObject) -> i128 {
    match object.get(Field::Balance).and_then(Value::as_amount) {
        Some(Amount::Issued(issued)) => {
            let magnitude = issued_magnitude(issued);
            if issued.is_positive() {
                magnitude
            } else {
                -magnitude
            }
        }
        _ => 0,
    }
}

pub fn is_zero_balance(object: &FieldObject) -> bool {
    balance_low(object) == 0
}

pub fn flags(object: &FieldObject) -> u32 {
    object.get(Field::Flags).and_then(Value::as_u32).unwrap_or(0)
}

pub fn set_flags(object: &mut FieldObject, flags: u32) {
    object.set(Field::Flags, Value::UInt32(flags));
}

pub fn low_node(object: &FieldObject) -> u64 {
    object.get(Field::LowNode).and_then(Value::as_u64).unwrap_or(0)
}

pub fn high_node(object: &FieldObject) -> u64 {
    object.get(Field::HighNode).and_then(Value::as_u64).unwrap_or(0)
}

pub fn set_low_node(object: &mut FieldObject, node: u64) {
    object.set(Field::LowNode, Value::UInt64(node));
}

pub fn set_high_node(object: &mut FieldObject, node: u64) {
    object.set(Field::HighNode, Value::UInt64(node));
}

/// Has every field defaulted and a zero balance (§3 I3, §4.7 "Delete the
/// line when all fields return to default and balance is zero").
pub fn is_default(object: &FieldObject) -> bool {
    is_zero_balance(object)
        && low_limit(object) == 0
        && high_limit(object) == 0
        && flags(object)
            & (LSF_LOW_NO_RIPPLE
                | LSF_HIGH_NO_RIPPLE
                | LSF_LOW_FREEZE
                | LSF_HIGH_FREEZE
                | LSF_LOW_DEEP_FREEZE
                | LSF_HIGH_DEEP_FREEZE)
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_of_is_determined_by_byte_order() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);
        assert_eq!(side_of(a, b), Side::Low);
        assert_eq!(side_of(b, a), Side::High);
    }

    #[test]
    fn normalize_round_trips_plain_integers() {
        let (mantissa, exponent) = normalize(100);
        let exp = exponent as i32;
        let back = if exp >= 0 {
            mantissa as i128 * 10i128.pow(exp as u32)
        } else {
            mantissa as i128 / 10i128.pow((-exp) as u32)
        };
        assert_eq!(back, 100);
    }

    #[test]
    fn fresh_line_has_zero_balance_and_is_default_when_limits_are_zero() {
        let currency = Currency::from_iso("USD").unwrap();
        let obj = new(
            AccountId::from_bytes([1; 20]),
            AccountId::from_bytes([2; 20]),
            currency,
            0,
            0,
        );
        assert!(is_default(&obj));
    }
}
