//! `Payment` (§4.7): moves value from `Account` to `Destination`, either as
//! native drops or, for a single direct trust-line hop, an issued balance
//! adjustment. Multi-hop rippling through an intermediate account is out of
//! scope here (§4.7 "out of full scope ... implementers must consult
//! reference"); a payment whose issuer is neither side of the transfer
//! returns `tecPATH_DRY`.

use xrpl_codec::{keylet, Amount, Field, FieldObject, Value};
use xrpl_hash::{AccountId, Hash};
use xrpl_tree::NodeStore;

use crate::{
    environment::Environment,
    error::{LedgerError, TxResultCode},
    sle::{self, account_root, fee_settings, ripple_state},
    tx::{Common, Transaction},
    view::LedgerView,
};

pub const TF_NO_DIRECT_RIPPLE: u32 = 0x0001_0000;
pub const TF_PARTIAL_PAYMENT: u32 = 0x0002_0000;
pub const TF_LIMIT_QUALITY: u32 = 0x0004_0000;

const PAYMENT_FLAG_MASK: u32 =
    super::TF_FULLY_CANONICAL_SIG | TF_NO_DIRECT_RIPPLE | TF_PARTIAL_PAYMENT | TF_LIMIT_QUALITY;

#[derive(Debug, Clone)]
pub struct Payment {
    common: Common,
    destination: AccountId,
    amount: Amount,
    destination_tag: Option<u32>,
}

impl Payment {
    pub(crate) fn from_object(common: Common, object: &FieldObject) -> Result<Self, TxResultCode> {
        let destination = object
            .get(Field::Destination)
            .and_then(Value::as_account_id)
            .ok_or(TxResultCode::TemMalformed)?;
        let amount = object
            .get(Field::Amount)
            .and_then(Value::as_amount)
            .copied()
            .ok_or(TxResultCode::TemMalformed)?;
        let destination_tag = object.get(Field::DestinationTag).and_then(Value::as_u32);
        Ok(Self {
            common,
            destination,
            amount,
            destination_tag,
        })
    }
}

fn check_flags(payment: &Payment) -> Result<(), TxResultCode> {
    if payment.common.flags & !PAYMENT_FLAG_MASK != 0 {
        return Err(TxResultCode::TemInvalidFlag);
    }
    Ok(())
}

fn check_nonzero_amount(payment: &Payment) -> Result<(), TxResultCode> {
    if payment.amount.is_zero() {
        return Err(TxResultCode::TemMalformed);
    }
    Ok(())
}

fn check_not_self_payment(payment: &Payment) -> Result<(), TxResultCode> {
    if payment.common.account == payment.destination && payment.amount.is_native() {
        return Err(TxResultCode::TemMalformed);
    }
    Ok(())
}

impl<S: NodeStore> Transaction<S> for Payment {
    fn common(&self) -> &Common {
        &self.common
    }

    fn preflight(&self) -> Result<(), TxResultCode> {
        check_flags(self)?;
        check_nonzero_amount(self)?;
        check_not_self_payment(self)
    }

    fn preclaim(&self, view: &LedgerView<'_, S>, env: &Environment) -> Result<(), TxResultCode> {
        let sender_key = keylet::account(self.common.account);
        let sender = view
            .read_sle(&sender_key)
            .map_err(|_| TxResultCode::TefBadAuth)?
            .ok_or(TxResultCode::TefBadAuth)?;

        match self.amount {
            Amount::Native(drops) => {
                let destination_key = keylet::account(self.destination);
                let destination_exists = view
                    .read_sle(&destination_key)
                    .map_err(|_| TxResultCode::TefBadAuth)?
                    .is_some();

                if !destination_exists {
                    let fees = fee_settings::read_fee_schedule(view, env.fees)
                        .map_err(|_| TxResultCode::TefBadAuth)?;
                    if drops < fees.reserve_base {
                        return Err(TxResultCode::TecNoDst);
                    }
                }

                let fees = fee_settings::read_fee_schedule(view, env.fees)
                    .map_err(|_| TxResultCode::TefBadAuth)?;
                let reserve = fees.reserve(account_root::owner_count(&sender));
                if account_root::balance(&sender) < drops.saturating_add(reserve) {
                    return Err(TxResultCode::TecInsufficientReserve);
                }
                Ok(())
            }
            Amount::Issued(issued) => {
                let issuer = issued.issuer();
                if issuer != self.common.account && issuer != self.destination {
                    return Err(TxResultCode::TecPathDry);
                }
                let line_key = keylet::ripple_state(self.common.account, self.destination, issued.currency());
                if view.read_sle(&line_key).map_err(|_| TxResultCode::TefBadAuth)?.is_none() {
                    return Err(TxResultCode::TecNoEntry);
                }
                Ok(())
            }
        }
    }

    fn do_apply(
        &self,
        view: &mut LedgerView<'_, S>,
        env: &Environment,
        tx_id: Hash<32>,
    ) -> Result<TxResultCode, LedgerError> {
        match self.amount {
            Amount::Native(drops) => apply_native(self, view, env, tx_id, drops),
            Amount::Issued(issued) => apply_issued(self, view, tx_id, issued.currency(), issued),
        }
    }
}

fn apply_native<S: NodeStore>(
    payment: &Payment,
    view: &mut LedgerView<'_, S>,
    env: &Environment,
    tx_id: Hash<32>,
    drops: u64,
) -> Result<TxResultCode, LedgerError> {
    let sender_key = keylet::account(payment.common.account);
    let mut sender = view
        .read_sle(&sender_key)?
        .ok_or(LedgerError::MissingField("sender AccountRoot"))?;

    if account_root::balance(&sender) < drops {
        return Ok(TxResultCode::TecInsufficientReserve);
    }
    account_root::set_balance(&mut sender, account_root::balance(&sender) - drops);
    sle::stamp_previous_txn(&mut sender, tx_id, env.ledger_index);
    view.write_sle(sender_key, &sender)?;

    let destination_key = keylet::account(payment.destination);
    let mut destination = match view.read_sle(&destination_key)? {
        Some(object) => object,
        None => account_root::new(payment.destination, 0, 1),
    };
    account_root::set_balance(&mut destination, account_root::balance(&destination) + drops);
    sle::stamp_previous_txn(&mut destination, tx_id, env.ledger_index);
    view.write_sle(destination_key, &destination)?;

    Ok(TxResultCode::TesSuccess)
}

fn apply_issued<S: NodeStore>(
    payment: &Payment,
    view: &mut LedgerView<'_, S>,
    tx_id: Hash<32>,
    currency: xrpl_codec::Currency,
    issued: xrpl_codec::IssuedAmount,
) -> Result<TxResultCode, LedgerError> {
    let line_key = keylet::ripple_state(payment.common.account, payment.destination, currency);
    let mut line = view
        .read_sle(&line_key)?
        .ok_or(LedgerError::MissingField("RippleState"))?;

    let side = ripple_state::side_of(payment.common.account, payment.destination);
    let magnitude = issued_unsigned_magnitude(issued);
    let current = ripple_state::balance_low(&line);
    let delta = match side {
        ripple_state::Side::Low => -(magnitude as i128),
        ripple_state::Side::High => magnitude as i128,
    };
    let next = current + delta;

    let low_limit = ripple_state::low_limit(&line) as i128;
    if side == ripple_state::Side::High && -next > low_limit {
        return Ok(TxResultCode::TecPathDry);
    }

    set_balance_low(&mut line, next, currency, payment.common.account);
    sle::stamp_previous_txn(&mut line, tx_id, 0);
    view.write_sle(line_key, &line)?;
    Ok(TxResultCode::TesSuccess)
}

fn issued_unsigned_magnitude(issued: xrpl_codec::IssuedAmount) -> i128 {
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

fn set_balance_low(line: &mut FieldObject, value: i128, currency: xrpl_codec::Currency, low_side_hint: AccountId) {
    let _ = low_side_hint;
    let positive = value >= 0;
    let magnitude = value.unsigned_abs();
    let amount = if magnitude == 0 {
        Amount::Issued(xrpl_codec::IssuedAmount::zero(currency, AccountId::ZERO))
    } else {
        let (mantissa, exponent) = normalize_balance(magnitude);
        Amount::Issued(
            xrpl_codec::IssuedAmount::new(mantissa, exponent, positive, currency, AccountId::ZERO)
                .expect("normalize_balance produces a canonical mantissa"),
        )
    };
    line.set(Field::Balance, Value::Amount(amount));
}

fn normalize_balance(mut mantissa: i128) -> (u64, i8) {
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
