//! `FeeSettings` and `Amendments` (§3, SPEC_FULL "FeeSettings and
//! Amendments pseudo-handling"): read-only entries the engine consults for
//! the fee schedule and the active-amendment set. Neither is written by any
//! handler in this core — voting pseudo-transactions are out of scope
//! (§1) — so this module has no constructors, only readers, and the engine
//! falls back to the caller-supplied [`crate::Environment`] when no
//! `FeeSettings` SLE exists (genesis).

use xrpl_codec::{keylet, Field, FieldObject, Value};
use xrpl_hash::Hash;
use xrpl_tree::NodeStore;

use crate::{environment::FeeSchedule, error::LedgerError, view::LedgerView};

pub fn keylet_fee_settings() -> Hash<32> {
    keylet::fee_settings()
}

pub fn keylet_amendments() -> Hash<32> {
    keylet::amendments()
}

pub fn read_fee_schedule<S: NodeStore>(
    view: &LedgerView<'_, S>,
    fallback: FeeSchedule,
) -> Result<FeeSchedule, LedgerError> {
    let Some(object) = view.read_sle(&keylet_fee_settings())? else {
        return Ok(fallback);
    };
    Ok(FeeSchedule {
        base_fee: object
            .get(Field::BaseFee)
            .and_then(Value::as_u64)
            .unwrap_or(fallback.base_fee),
        reserve_base: object
            .get(Field::ReserveBase)
            .and_then(Value::as_u32)
            .map(u64::from)
            .unwrap_or(fallback.reserve_base),
        reserve_increment: object
            .get(Field::ReserveIncrement)
            .and_then(Value::as_u32)
            .map(u64::from)
            .unwrap_or(fallback.reserve_increment),
    })
}

pub fn read_active_amendments<S: NodeStore>(
    view: &LedgerView<'_, S>,
) -> Result<Vec<Hash<32>>, LedgerError> {
    let Some(object) = view.read_sle(&keylet_amendments())? else {
        return Ok(Vec::new());
    };
    Ok(object
        .get(Field::Amendments)
        .and_then(Value::as_vector256)
        .map(<[Hash<32>]>::to_vec)
        .unwrap_or_default())
}

pub fn test_fee_settings_object(fees: FeeSchedule) -> FieldObject {
    FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(xrpl_codec::LedgerEntryType::FeeSettings.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(Field::BaseFee, Value::UInt64(fees.base_fee))
        .with(Field::ReserveBase, Value::UInt32(fees.reserve_base as u32))
        .with(
            Field::ReserveIncrement,
            Value::UInt32(fees.reserve_increment as u32),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpl_tree::{MemNodeStore, StateMap};

    #[test]
    fn falls_back_to_the_environment_fee_schedule_when_absent() {
        let base = StateMap::new_state(MemNodeStore::new());
        let view = LedgerView::new(&base);
        let fallback = FeeSchedule {
            base_fee: 10,
            reserve_base: 10_000_000,
            reserve_increment: 2_000_000,
        };
        assert_eq!(read_fee_schedule(&view, fallback).unwrap(), fallback);
    }

    #[test]
    fn reads_overridden_fee_schedule_when_present() {
        let mut base = StateMap::new_state(MemNodeStore::new());
        let fallback = FeeSchedule {
            base_fee: 10,
            reserve_base: 10_000_000,
            reserve_increment: 2_000_000,
        };
        let overridden = FeeSchedule {
            base_fee: 15,
            ..fallback
        };
        let key = keylet_fee_settings();
        let bytes = xrpl_codec::encode(&test_fee_settings_object(overridden)).unwrap();
        base.put(key, bytes).unwrap();

        let view = LedgerView::new(&base);
        assert_eq!(read_fee_schedule(&view, fallback).unwrap(), overridden);
    }
}
