//! `AccountRoot` (§3, §4.7 "Payment (native)"): an account's balance,
//! sequence, and owned-object count.

use xrpl_codec::{Amount, Field, FieldObject, LedgerEntryType, Value};
use xrpl_hash::AccountId;

/// Once set, the account can never again freeze or deep-freeze a trust
/// line (§4.7 "TrustSet": "set/clear Freeze/DeepFreeze disallowed if
/// account has NoFreeze") — an irreversible promise to counterparties.
pub const LSF_NO_FREEZE: u32 = 0x0020_0000;

pub fn new(account: AccountId, balance: u64, sequence: u32) -> FieldObject {
    FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(LedgerEntryType::AccountRoot.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(Field::Account, Value::AccountId(account))
        .with(Field::Balance, Value::Amount(Amount::native(balance)))
        .with(Field::Sequence, Value::UInt32(sequence))
        .with(Field::OwnerCount, Value::UInt32(0))
}

pub fn account(object: &FieldObject) -> AccountId {
    object
        .get(Field::Account)
        .and_then(Value::as_account_id)
        .expect("AccountRoot always carries Account")
}

pub fn balance(object: &FieldObject) -> u64 {
    object
        .get(Field::Balance)
        .and_then(Value::as_amount)
        .and_then(Amount::as_drops)
        .expect("AccountRoot.Balance is always native")
}

pub fn set_balance(object: &mut FieldObject, drops: u64) {
    object.set(Field::Balance, Value::Amount(Amount::native(drops)));
}

pub fn sequence(object: &FieldObject) -> u32 {
    object
        .get(Field::Sequence)
        .and_then(Value::as_u32)
        .expect("AccountRoot always carries Sequence")
}

pub fn set_sequence(object: &mut FieldObject, sequence: u32) {
    object.set(Field::Sequence, Value::UInt32(sequence));
}

pub fn owner_count(object: &FieldObject) -> u32 {
    object
        .get(Field::OwnerCount)
        .and_then(Value::as_u32)
        .unwrap_or(0)
}

pub fn set_owner_count(object: &mut FieldObject, count: u32) {
    object.set(Field::OwnerCount, Value::UInt32(count));
}

pub fn incr_owner_count(object: &mut FieldObject, delta: i32) {
    let next = (owner_count(object) as i64 + delta as i64).max(0) as u32;
    set_owner_count(object, next);
}

pub fn flags(object: &FieldObject) -> u32 {
    object.get(Field::Flags).and_then(Value::as_u32).unwrap_or(0)
}

pub fn has_no_freeze(object: &FieldObject) -> bool {
    flags(object) & LSF_NO_FREEZE != 0
}
