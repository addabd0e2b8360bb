//! `OracleSet` / `OracleDelete` (§4.7): create, update, or remove a price
//! oracle entry. Bounds and staleness checks delegate to
//! [`crate::sle::oracle`]; this module only threads the owner directory and
//! reserve bookkeeping around it.

use xrpl_codec::{keylet, Field, FieldObject, Value};
use xrpl_hash::Hash;
use xrpl_tree::NodeStore;

use crate::{
    environment::Environment,
    error::{LedgerError, TxResultCode},
    sle::{self, account_root, directory, fee_settings, oracle as oracle_sle},
    tx::{Common, Transaction},
    view::LedgerView,
};

fn read_common_fields(
    object: &FieldObject,
) -> Result<(u32, Vec<u8>, Option<Vec<u8>>, Vec<u8>, u32, Vec<oracle_sle::PriceUpdate>), TxResultCode> {
    let document_id = object
        .get(Field::OracleDocumentId)
        .and_then(Value::as_u32)
        .ok_or(TxResultCode::TemMalformed)?;
    let provider = object
        .get(Field::Provider)
        .and_then(Value::as_blob)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    let uri = object.get(Field::Uri).and_then(Value::as_blob).map(<[u8]>::to_vec);
    let asset_class = object
        .get(Field::AssetClass)
        .and_then(Value::as_blob)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    let last_update_time = object
        .get(Field::LastUpdateTime)
        .and_then(Value::as_u32)
        .ok_or(TxResultCode::TemMalformed)?;
    let series = object
        .get(Field::PriceDataSeries)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(oracle_sle::price_update_from_object)
                .collect()
        })
        .unwrap_or_default();

    Ok((document_id, provider, uri, asset_class, last_update_time, series))
}

#[derive(Debug, Clone)]
pub struct OracleSet {
    common: Common,
    document_id: u32,
    provider: Vec<u8>,
    uri: Option<Vec<u8>>,
    asset_class: Vec<u8>,
    last_update_time: u32,
    series: Vec<oracle_sle::PriceUpdate>,
}

impl OracleSet {
    pub(crate) fn from_object(common: Common, object: &FieldObject) -> Result<Self, TxResultCode> {
        let (document_id, provider, uri, asset_class, last_update_time, series) =
            read_common_fields(object)?;
        Ok(Self {
            common,
            document_id,
            provider,
            uri,
            asset_class,
            last_update_time,
            series,
        })
    }

    /// Merge this request's `PriceDataSeries` deltas against `existing`
    /// (§4.7: upsert pairs that carry an `AssetPrice`, drop pairs that
    /// don't), producing the entry's final stored series.
    fn merged_series(&self, existing: Option<&[oracle_sle::PricePoint]>) -> Result<Vec<oracle_sle::PricePoint>, TxResultCode> {
        let existing = existing.unwrap_or(&[]);
        let merged = oracle_sle::apply_updates(existing, &self.series, existing.is_empty())
            .map_err(|_| TxResultCode::TemMalformed)?;
        oracle_sle::validate_stored_series_len(&merged).map_err(|_| TxResultCode::TecOracleOversize)?;
        Ok(merged)
    }
}

impl<S: NodeStore> Transaction<S> for OracleSet {
    fn common(&self) -> &Common {
        &self.common
    }

    fn preflight(&self) -> Result<(), TxResultCode> {
        oracle_sle::validate_bounds(
            &self.provider,
            self.uri.as_deref(),
            &self.asset_class,
            &self.series,
        )
        .map_err(|_| TxResultCode::TecOracleOversize)
    }

    fn preclaim(&self, view: &LedgerView<'_, S>, env: &Environment) -> Result<(), TxResultCode> {
        view.read_sle(&keylet::account(self.common.account))
            .map_err(|_| TxResultCode::TefBadAuth)?
            .ok_or(TxResultCode::TefBadAuth)?;

        if !oracle_sle::within_update_window(env.close_time, self.last_update_time as i64) {
            return Err(TxResultCode::TemMalformed);
        }

        let key = keylet::oracle(self.common.account, self.document_id);
        let existing = view.read_sle(&key).map_err(|_| TxResultCode::TefBadAuth)?;
        let existing_series = existing.as_ref().map(|object| oracle_sle::series(object));

        let previous_units = existing_series
            .as_deref()
            .map(|series| oracle_sle::reserve_units(series.len()))
            .unwrap_or(0);
        let merged = self.merged_series(existing_series.as_deref())?;
        let next_units = oracle_sle::reserve_units(merged.len());
        if next_units > previous_units {
            let sender = view
                .read_sle(&keylet::account(self.common.account))
                .map_err(|_| TxResultCode::TefBadAuth)?
                .ok_or(TxResultCode::TefBadAuth)?;
            let fees = fee_settings::read_fee_schedule(view, env.fees)
                .map_err(|_| TxResultCode::TefBadAuth)?;
            let extra = next_units - previous_units;
            let reserve = fees.reserve(account_root::owner_count(&sender) + extra);
            if account_root::balance(&sender) < reserve {
                return Err(TxResultCode::TecInsufficientReserve);
            }
        }
        Ok(())
    }

    fn do_apply(
        &self,
        view: &mut LedgerView<'_, S>,
        env: &Environment,
        tx_id: Hash<32>,
    ) -> Result<TxResultCode, LedgerError> {
        let key = keylet::oracle(self.common.account, self.document_id);
        let existing = view.read_sle(&key)?;
        let is_new = existing.is_none();
        let existing_series = existing.as_ref().map(|object| oracle_sle::series(object));
        let previous_units = existing_series
            .as_deref()
            .map(|series| oracle_sle::reserve_units(series.len()))
            .unwrap_or(0);
        let merged = self.merged_series(existing_series.as_deref()).map_err(|code| {
            LedgerError::Malformed(format!("PriceDataSeries merge rejected after preclaim: {code}"))
        })?;

        let mut object = existing.unwrap_or_else(|| {
            oracle_sle::new(
                self.common.account,
                self.provider.clone(),
                self.uri.clone(),
                self.asset_class.clone(),
                self.last_update_time,
                &merged,
            )
        });
        if !is_new {
            oracle_sle::set_last_update_time(&mut object, self.last_update_time);
            oracle_sle::set_series(&mut object, &merged);
        }
        sle::stamp_previous_txn(&mut object, tx_id, env.ledger_index);

        if is_new {
            let (_, page) = directory::insert(view, self.common.account, key)?;
            oracle_sle::set_owner_node(&mut object, page);
            view.write_sle(key, &object)?;

            let mut sender = view
                .read_sle(&keylet::account(self.common.account))?
                .ok_or(LedgerError::MissingField("sender AccountRoot"))?;
            let units = oracle_sle::reserve_units(merged.len());
            account_root::incr_owner_count(&mut sender, units as i32);
            view.write_sle(keylet::account(self.common.account), &sender)?;
        } else {
            let next_units = oracle_sle::reserve_units(merged.len());
            if next_units != previous_units {
                let mut sender = view
                    .read_sle(&keylet::account(self.common.account))?
                    .ok_or(LedgerError::MissingField("sender AccountRoot"))?;
                account_root::incr_owner_count(&mut sender, next_units as i32 - previous_units as i32);
                view.write_sle(keylet::account(self.common.account), &sender)?;
            }
            view.write_sle(key, &object)?;
        }

        Ok(TxResultCode::TesSuccess)
    }
}

#[derive(Debug, Clone)]
pub struct OracleDelete {
    common: Common,
    document_id: u32,
}

impl OracleDelete {
    pub(crate) fn from_object(common: Common, object: &FieldObject) -> Result<Self, TxResultCode> {
        let document_id = object
            .get(Field::OracleDocumentId)
            .and_then(Value::as_u32)
            .ok_or(TxResultCode::TemMalformed)?;
        Ok(Self { common, document_id })
    }
}

impl<S: NodeStore> Transaction<S> for OracleDelete {
    fn common(&self) -> &Common {
        &self.common
    }

    fn preflight(&self) -> Result<(), TxResultCode> {
        Ok(())
    }

    fn preclaim(&self, view: &LedgerView<'_, S>, _env: &Environment) -> Result<(), TxResultCode> {
        let key = keylet::oracle(self.common.account, self.document_id);
        let object = view
            .read_sle(&key)
            .map_err(|_| TxResultCode::TefBadAuth)?
            .ok_or(TxResultCode::TecNoEntry)?;
        if oracle_sle::owner(&object) != Some(self.common.account) {
            return Err(TxResultCode::TefBadAuth);
        }
        Ok(())
    }

    fn do_apply(
        &self,
        view: &mut LedgerView<'_, S>,
        _env: &Environment,
        _tx_id: Hash<32>,
    ) -> Result<TxResultCode, LedgerError> {
        let key = keylet::oracle(self.common.account, self.document_id);
        let object = view
            .read_sle(&key)?
            .ok_or(LedgerError::MissingField("Oracle"))?;
        let page = oracle_sle::owner_node(&object);
        let units = oracle_sle::reserve_units(oracle_sle::series(&object).len());

        view.erase_sle(key);
        directory::remove(view, self.common.account, page, key)?;

        let mut sender = view
            .read_sle(&keylet::account(self.common.account))?
            .ok_or(LedgerError::MissingField("sender AccountRoot"))?;
        account_root::incr_owner_count(&mut sender, -(units as i32));
        view.write_sle(keylet::account(self.common.account), &sender)?;

        Ok(TxResultCode::TesSuccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpl_codec::Currency;
    use xrpl_hash::AccountId;
    use xrpl_tree::{MemNodeStore, StateMap};

    fn env() -> Environment {
        Environment {
            ledger_index: 10,
            parent_hash: Hash::ZERO,
            parent_close_time: 0,
            close_time: 1_000,
            close_time_resolution: 10,
            close_flags: 0,
            total_coins: 100_000_000_000,
            fees: crate::environment::FeeSchedule {
                base_fee: 10,
                reserve_base: 10_000_000,
                reserve_increment: 2_000_000,
            },
            amendments: Vec::new(),
        }
    }

    fn price_upsert(base: &str, quote: &str) -> oracle_sle::PriceUpdate {
        oracle_sle::PriceUpdate {
            base_asset: Currency::from_iso(base).unwrap(),
            quote_asset: Currency::from_iso(quote).unwrap(),
            asset_price: Some(1_500_000_000_000_000),
            scale: Some(6),
        }
    }

    fn common(account: AccountId) -> Common {
        Common {
            account,
            tx_type: xrpl_codec::TransactionType::OracleSet,
            fee: 10,
            sequence: 1,
            ticket_sequence: None,
            signing_pub_key: vec![],
            txn_signature: None,
            flags: 0,
            last_ledger_sequence: None,
            account_txn_id: None,
        }
    }

    #[test]
    fn creates_a_new_oracle_and_charges_one_reserve_unit() {
        let a = AccountId::from_bytes([1; 20]);
        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(
            keylet::account(a),
            xrpl_codec::encode(&account_root::new(a, 20_000_000, 1)).unwrap(),
        )
        .unwrap();

        let mut view = LedgerView::new(&base);
        let tx = OracleSet {
            common: common(a),
            document_id: 1,
            provider: b"example".to_vec(),
            uri: None,
            asset_class: b"currency".to_vec(),
            last_update_time: 1_000,
            series: vec![price_upsert("USD", "XRP")],
        };

        let env = env();
        Transaction::<MemNodeStore>::preclaim(&tx, &view, &env).unwrap();
        Transaction::<MemNodeStore>::do_apply(&tx, &mut view, &env, Hash::ZERO).unwrap();

        let sender = view.read_sle(&keylet::account(a)).unwrap().unwrap();
        assert_eq!(account_root::owner_count(&sender), 1);
    }

    #[test]
    fn delete_frees_the_reserve() {
        let a = AccountId::from_bytes([1; 20]);
        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(
            keylet::account(a),
            xrpl_codec::encode(&account_root::new(a, 20_000_000, 1)).unwrap(),
        )
        .unwrap();

        let mut view = LedgerView::new(&base);
        let set = OracleSet {
            common: common(a),
            document_id: 7,
            provider: b"example".to_vec(),
            uri: None,
            asset_class: b"currency".to_vec(),
            last_update_time: 1_000,
            series: vec![price_upsert("USD", "XRP")],
        };
        let env = env();
        Transaction::<MemNodeStore>::do_apply(&set, &mut view, &env, Hash::ZERO).unwrap();

        let delete = OracleDelete {
            common: common(a),
            document_id: 7,
        };
        Transaction::<MemNodeStore>::preclaim(&delete, &view, &env).unwrap();
        let result = Transaction::<MemNodeStore>::do_apply(&delete, &mut view, &env, Hash::ZERO).unwrap();
        assert_eq!(result, TxResultCode::TesSuccess);

        let sender = view.read_sle(&keylet::account(a)).unwrap().unwrap();
        assert_eq!(account_root::owner_count(&sender), 0);
        assert!(view.read_sle(&keylet::oracle(a, 7)).unwrap().is_none());
    }

    /// §8 scenario 5: growing a two-pair oracle to six pairs on update
    /// charges the second owner-reserve unit, and growing it must merge
    /// against the existing pairs rather than replace them outright.
    #[test]
    fn update_past_five_pairs_escalates_the_reserve_and_keeps_prior_pairs() {
        let a = AccountId::from_bytes([1; 20]);
        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(
            keylet::account(a),
            xrpl_codec::encode(&account_root::new(a, 20_000_000, 1)).unwrap(),
        )
        .unwrap();

        let mut view = LedgerView::new(&base);
        let env = env();

        let create = OracleSet {
            common: common(a),
            document_id: 1,
            provider: b"example".to_vec(),
            uri: None,
            asset_class: b"currency".to_vec(),
            last_update_time: 1_000,
            series: vec![price_upsert("USD", "XRP"), price_upsert("EUR", "XRP")],
        };
        Transaction::<MemNodeStore>::preclaim(&create, &view, &env).unwrap();
        Transaction::<MemNodeStore>::do_apply(&create, &mut view, &env, Hash::ZERO).unwrap();
        let sender = view.read_sle(&keylet::account(a)).unwrap().unwrap();
        assert_eq!(account_root::owner_count(&sender), 1);

        let grow = OracleSet {
            common: common(a),
            document_id: 1,
            provider: b"example".to_vec(),
            uri: None,
            asset_class: b"currency".to_vec(),
            last_update_time: 1_000,
            series: vec![
                price_upsert("GBP", "XRP"),
                price_upsert("JPY", "XRP"),
                price_upsert("CAD", "XRP"),
                price_upsert("AUD", "XRP"),
            ],
        };
        Transaction::<MemNodeStore>::preclaim(&grow, &view, &env).unwrap();
        Transaction::<MemNodeStore>::do_apply(&grow, &mut view, &env, Hash::ZERO).unwrap();

        let sender = view.read_sle(&keylet::account(a)).unwrap().unwrap();
        assert_eq!(account_root::owner_count(&sender), 2);

        let object = view.read_sle(&keylet::oracle(a, 1)).unwrap().unwrap();
        assert_eq!(oracle_sle::series(&object).len(), 6);
    }
}
