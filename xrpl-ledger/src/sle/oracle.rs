//! `Oracle` (§4.7 "OracleSet / OracleDelete"): a provider's published price
//! series for a set of base/quote asset pairs.
//!
//! Bounds are enforced here, against the decoded object, rather than in the
//! transaction handler, so both `OracleSet`'s preclaim check and any future
//! direct inspection of an existing entry share one source of truth.

use xrpl_codec::{Currency, Field, FieldObject, LedgerEntryType, Value};
use xrpl_hash::AccountId;

pub const MAX_PROVIDER_LEN: usize = 256;
pub const MAX_URI_LEN: usize = 256;
pub const MAX_ASSET_CLASS_LEN: usize = 16;
pub const MIN_PRICE_PAIRS: usize = 1;
pub const MAX_PRICE_PAIRS: usize = 10;
/// Pair count past which a second owner-reserve unit is charged (§3 I7).
pub const LARGE_SERIES_THRESHOLD: usize = 5;
/// Allowed drift between a transaction's close time and `LastUpdateTime`
/// (§4.7 "reject stale updates").
pub const MAX_UPDATE_TIME_DRIFT: i64 = 300;

pub fn keylet(owner: AccountId, document_id: u32) -> xrpl_hash::Hash<32> {
    xrpl_codec::keylet::oracle(owner, document_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    pub base_asset: Currency,
    pub quote_asset: Currency,
    pub asset_price: u64,
    pub scale: u8,
}

fn price_data_object(point: &PricePoint) -> FieldObject {
    FieldObject::new()
        .with(Field::BaseAsset, Value::Hash160(point.base_asset.as_hash()))
        .with(Field::QuoteAsset, Value::Hash160(point.quote_asset.as_hash()))
        .with(Field::AssetPrice, Value::UInt64(point.asset_price))
        .with(Field::Scale, Value::UInt8(point.scale))
}

fn price_point_from_object(object: &FieldObject) -> Option<PricePoint> {
    Some(PricePoint {
        base_asset: Currency::from(object.get(Field::BaseAsset)?.as_hash160()?),
        quote_asset: Currency::from(object.get(Field::QuoteAsset)?.as_hash160()?),
        asset_price: object.get(Field::AssetPrice)?.as_u64()?,
        scale: object.get(Field::Scale)?.as_u8()?,
    })
}

/// One `PriceDataSeries` entry from an `OracleSet` request (§4.7): an
/// entry carrying `AssetPrice` upserts that pair; one without requests
/// deletion of the pair, which is only meaningful against an existing
/// entry (an `OracleSet` that creates a new Oracle can't delete a pair
/// from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdate {
    pub base_asset: Currency,
    pub quote_asset: Currency,
    pub asset_price: Option<u64>,
    pub scale: Option<u8>,
}

pub fn price_update_from_object(object: &FieldObject) -> Option<PriceUpdate> {
    Some(PriceUpdate {
        base_asset: Currency::from(object.get(Field::BaseAsset)?.as_hash160()?),
        quote_asset: Currency::from(object.get(Field::QuoteAsset)?.as_hash160()?),
        asset_price: object.get(Field::AssetPrice).and_then(Value::as_u64),
        scale: object.get(Field::Scale).and_then(Value::as_u8),
    })
}

/// Apply a request's `PriceDataSeries` deltas against `existing` (empty
/// when this `OracleSet` creates a new entry), per §4.7: upsert pairs that
/// carry an `AssetPrice`, drop pairs that don't. Rejects a deletion
/// request against a brand-new entry and duplicate pairs within the
/// request itself (bounds on the resulting series are checked separately
/// by the caller, since the limit applies to the stored entry, not to one
/// update's delta).
pub fn apply_updates(
    existing: &[PricePoint],
    updates: &[PriceUpdate],
    creating: bool,
) -> Result<Vec<PricePoint>, &'static str> {
    let mut seen = std::collections::HashSet::new();
    for update in updates {
        if !seen.insert((update.base_asset, update.quote_asset)) {
            return Err("duplicate base/quote asset pair");
        }
    }

    let mut merged = existing.to_vec();
    for update in updates {
        let slot = merged
            .iter()
            .position(|p| p.base_asset == update.base_asset && p.quote_asset == update.quote_asset);
        match (update.asset_price, update.scale) {
            (Some(asset_price), Some(scale)) => match slot {
                Some(i) => {
                    merged[i].asset_price = asset_price;
                    merged[i].scale = scale;
                }
                None => merged.push(PricePoint {
                    base_asset: update.base_asset,
                    quote_asset: update.quote_asset,
                    asset_price,
                    scale,
                }),
            },
            (None, None) => {
                if creating {
                    return Err("deletion request invalid when creating an Oracle");
                }
                match slot {
                    Some(i) => {
                        merged.remove(i);
                    }
                    None => return Err("deletion request for a pair that does not exist"),
                }
            }
            _ => return Err("AssetPrice and Scale must both be present or both absent"),
        }
    }
    Ok(merged)
}

pub fn new(
    owner: AccountId,
    provider: Vec<u8>,
    uri: Option<Vec<u8>>,
    asset_class: Vec<u8>,
    last_update_time: u32,
    series: &[PricePoint],
) -> FieldObject {
    let mut object = FieldObject::new()
        .with(
            Field::LedgerEntryType,
            Value::UInt16(LedgerEntryType::Oracle.code()),
        )
        .with(Field::Flags, Value::UInt32(0))
        .with(Field::Owner, Value::AccountId(owner))
        .with(Field::Provider, Value::Blob(provider))
        .with(Field::AssetClass, Value::Blob(asset_class))
        .with(Field::LastUpdateTime, Value::UInt32(last_update_time))
        .with(
            Field::PriceDataSeries,
            Value::Array(series.iter().map(price_data_object).collect()),
        )
        .with(Field::OwnerNode, Value::UInt64(0));
    if let Some(uri) = uri {
        object.set(Field::Uri, Value::Blob(uri));
    }
    object
}

pub fn owner(object: &FieldObject) -> Option<AccountId> {
    object.get(Field::Owner).and_then(Value::as_account_id)
}

pub fn provider(object: &FieldObject) -> &[u8] {
    object
        .get(Field::Provider)
        .and_then(Value::as_blob)
        .unwrap_or(&[])
}

pub fn asset_class(object: &FieldObject) -> &[u8] {
    object
        .get(Field::AssetClass)
        .and_then(Value::as_blob)
        .unwrap_or(&[])
}

pub fn last_update_time(object: &FieldObject) -> u32 {
    object
        .get(Field::LastUpdateTime)
        .and_then(Value::as_u32)
        .unwrap_or(0)
}

pub fn set_last_update_time(object: &mut FieldObject, time: u32) {
    object.set(Field::LastUpdateTime, Value::UInt32(time));
}

pub fn series(object: &FieldObject) -> Vec<PricePoint> {
    object
        .get(Field::PriceDataSeries)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(price_point_from_object).collect())
        .unwrap_or_default()
}

pub fn set_series(object: &mut FieldObject, series: &[PricePoint]) {
    object.set(
        Field::PriceDataSeries,
        Value::Array(series.iter().map(price_data_object).collect()),
    );
}

pub fn owner_node(object: &FieldObject) -> u64 {
    object.get(Field::OwnerNode).and_then(Value::as_u64).unwrap_or(0)
}

pub fn set_owner_node(object: &mut FieldObject, node: u64) {
    object.set(Field::OwnerNode, Value::UInt64(node));
}

/// Owner-reserve units this entry costs (§3 I7): one unit for up to
/// [`LARGE_SERIES_THRESHOLD`] pairs, two past it.
pub fn reserve_units(pair_count: usize) -> u32 {
    if pair_count > LARGE_SERIES_THRESHOLD {
        2
    } else {
        1
    }
}

/// Bounds-check a candidate `OracleSet` request against §4.7's limits,
/// independent of any existing on-ledger entry: `series` is the request's
/// own `PriceDataSeries` delta, not the entry's final stored series (which
/// [`apply_updates`] computes and whose own length is checked separately).
pub fn validate_bounds(
    provider: &[u8],
    uri: Option<&[u8]>,
    asset_class: &[u8],
    series: &[PriceUpdate],
) -> Result<(), &'static str> {
    if provider.is_empty() || provider.len() > MAX_PROVIDER_LEN {
        return Err("Provider length out of bounds");
    }
    if let Some(uri) = uri {
        if uri.len() > MAX_URI_LEN {
            return Err("URI length out of bounds");
        }
    }
    if asset_class.is_empty() || asset_class.len() > MAX_ASSET_CLASS_LEN {
        return Err("AssetClass length out of bounds");
    }
    if series.len() < MIN_PRICE_PAIRS || series.len() > MAX_PRICE_PAIRS {
        return Err("PriceDataSeries length out of bounds");
    }
    let mut seen = std::collections::HashSet::new();
    for update in series {
        if !seen.insert((update.base_asset, update.quote_asset)) {
            return Err("duplicate base/quote asset pair");
        }
    }
    Ok(())
}

/// Bounds-check the entry's final stored series (after [`apply_updates`]
/// has merged the request's deltas in).
pub fn validate_stored_series_len(series: &[PricePoint]) -> Result<(), &'static str> {
    if series.len() < MIN_PRICE_PAIRS || series.len() > MAX_PRICE_PAIRS {
        return Err("stored PriceDataSeries length out of bounds");
    }
    Ok(())
}

/// Whether `update_time` falls within [`MAX_UPDATE_TIME_DRIFT`] seconds of
/// `reference_time` (§4.7 "reject stale updates").
pub fn within_update_window(reference_time: i64, update_time: i64) -> bool {
    (reference_time - update_time).abs() <= MAX_UPDATE_TIME_DRIFT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(base: &str, quote: &str) -> PricePoint {
        PricePoint {
            base_asset: Currency::from_iso(base).unwrap(),
            quote_asset: Currency::from_iso(quote).unwrap(),
            asset_price: 1_500_000_000_000_000,
            scale: 6,
        }
    }

    fn upsert(base: &str, quote: &str) -> PriceUpdate {
        PriceUpdate {
            base_asset: Currency::from_iso(base).unwrap(),
            quote_asset: Currency::from_iso(quote).unwrap(),
            asset_price: Some(1_500_000_000_000_000),
            scale: Some(6),
        }
    }

    fn delete(base: &str, quote: &str) -> PriceUpdate {
        PriceUpdate {
            base_asset: Currency::from_iso(base).unwrap(),
            quote_asset: Currency::from_iso(quote).unwrap(),
            asset_price: None,
            scale: None,
        }
    }

    #[test]
    fn series_round_trips_through_the_field_object() {
        let owner = AccountId::from_bytes([4; 20]);
        let pairs = vec![pair("USD", "XRP"), pair("EUR", "XRP")];
        let object = new(owner, b"example".to_vec(), None, b"currency".to_vec(), 1_000, &pairs);
        assert_eq!(series(&object), pairs);
        assert_eq!(provider(&object), b"example");
    }

    #[test]
    fn rejects_duplicate_pairs() {
        let updates = vec![upsert("USD", "XRP"), upsert("USD", "XRP")];
        assert!(validate_bounds(b"p", None, b"currency", &updates).is_err());
    }

    #[test]
    fn rejects_oversize_series() {
        let updates: Vec<_> = (0..11).map(|_| upsert("USD", "XRP")).collect();
        assert!(validate_bounds(b"p", None, b"currency", &updates).is_err());
    }

    #[test]
    fn create_rejects_a_deletion_request() {
        let err = apply_updates(&[], &[delete("USD", "XRP")], true).unwrap_err();
        assert_eq!(err, "deletion request invalid when creating an Oracle");
    }

    #[test]
    fn update_upserts_a_new_pair_without_disturbing_existing_ones() {
        let existing = vec![pair("USD", "XRP")];
        let merged = apply_updates(&existing, &[upsert("EUR", "XRP")], false).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&pair("USD", "XRP")));
        assert!(merged.contains(&pair("EUR", "XRP")));
    }

    #[test]
    fn update_deletes_only_the_named_pair() {
        let existing = vec![pair("USD", "XRP"), pair("EUR", "XRP")];
        let merged = apply_updates(&existing, &[delete("USD", "XRP")], false).unwrap();
        assert_eq!(merged, vec![pair("EUR", "XRP")]);
    }

    #[test]
    fn update_rejects_deleting_a_pair_that_is_not_there() {
        let existing = vec![pair("USD", "XRP")];
        assert!(apply_updates(&existing, &[delete("EUR", "XRP")], false).is_err());
    }

    #[test]
    fn reserve_units_escalate_past_five_pairs() {
        assert_eq!(reserve_units(5), 1);
        assert_eq!(reserve_units(6), 2);
    }

    #[test]
    fn update_window_rejects_stale_times() {
        assert!(within_update_window(1_000, 1_000 + 300));
        assert!(!within_update_window(1_000, 1_000 + 301));
    }
}
