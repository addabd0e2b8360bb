//! `TrustSet` (§4.7): create or modify the trust line between `Account` and
//! `Issuer`, or delete it once it has decayed back to its default state.

use xrpl_codec::{keylet, Amount, Currency, Field, FieldObject, IssuedAmount, Value};
use xrpl_hash::{AccountId, Hash};
use xrpl_tree::NodeStore;

use crate::{
    environment::Environment,
    error::{LedgerError, TxResultCode},
    sle::{self, account_root, directory, fee_settings, ripple_state},
    tx::{Common, Transaction},
    view::LedgerView,
};

pub const TF_SET_AUTH: u32 = 0x0001_0000;
pub const TF_SET_NO_RIPPLE: u32 = 0x0002_0000;
pub const TF_CLEAR_NO_RIPPLE: u32 = 0x0004_0000;
pub const TF_SET_FREEZE: u32 = 0x0008_0000;
pub const TF_CLEAR_FREEZE: u32 = 0x0010_0000;
pub const TF_SET_DEEP_FREEZE: u32 = 0x0020_0000;
pub const TF_CLEAR_DEEP_FREEZE: u32 = 0x0040_0000;

const TRUST_SET_FLAG_MASK: u32 = super::TF_FULLY_CANONICAL_SIG
    | TF_SET_AUTH
    | TF_SET_NO_RIPPLE
    | TF_CLEAR_NO_RIPPLE
    | TF_SET_FREEZE
    | TF_CLEAR_FREEZE
    | TF_SET_DEEP_FREEZE
    | TF_CLEAR_DEEP_FREEZE;

#[derive(Debug, Clone)]
pub struct TrustSet {
    common: Common,
    limit_amount: IssuedAmount,
}

impl TrustSet {
    pub(crate) fn from_object(common: Common, object: &FieldObject) -> Result<Self, TxResultCode> {
        let limit_amount = match object.get(Field::LimitAmount).and_then(Value::as_amount) {
            Some(Amount::Issued(issued)) => *issued,
            _ => return Err(TxResultCode::TemMalformed),
        };
        Ok(Self { common, limit_amount })
    }

    fn currency(&self) -> Currency {
        self.limit_amount.currency()
    }

    fn issuer(&self) -> AccountId {
        self.limit_amount.issuer()
    }

    fn limit(&self) -> u64 {
        if self.limit_amount.mantissa() == 0 {
            return 0;
        }
        let mantissa = self.limit_amount.mantissa() as i128;
        let exponent = self.limit_amount.exponent() as i32;
        let magnitude = if exponent >= 0 {
            mantissa * 10i128.pow(exponent as u32)
        } else {
            mantissa / 10i128.pow((-exponent) as u32)
        };
        magnitude.max(0) as u64
    }
}

fn check_flags(tx: &TrustSet) -> Result<(), TxResultCode> {
    if tx.common.flags & !TRUST_SET_FLAG_MASK != 0 {
        return Err(TxResultCode::TemInvalidFlag);
    }
    if tx.common.flags & TF_SET_NO_RIPPLE != 0 && tx.common.flags & TF_CLEAR_NO_RIPPLE != 0 {
        return Err(TxResultCode::TemInvalidFlag);
    }
    if tx.common.flags & TF_SET_FREEZE != 0 && tx.common.flags & TF_CLEAR_FREEZE != 0 {
        return Err(TxResultCode::TemInvalidFlag);
    }
    if tx.common.flags & TF_SET_DEEP_FREEZE != 0 && tx.common.flags & TF_CLEAR_DEEP_FREEZE != 0 {
        return Err(TxResultCode::TemInvalidFlag);
    }
    Ok(())
}

fn check_not_self_referencing(tx: &TrustSet) -> Result<(), TxResultCode> {
    if tx.common.account == tx.issuer() {
        return Err(TxResultCode::TemMalformed);
    }
    Ok(())
}

fn check_currency_is_issued(tx: &TrustSet) -> Result<(), TxResultCode> {
    if tx.currency().is_xrp() {
        return Err(TxResultCode::TemMalformed);
    }
    Ok(())
}

impl<S: NodeStore> Transaction<S> for TrustSet {
    fn common(&self) -> &Common {
        &self.common
    }

    fn preflight(&self) -> Result<(), TxResultCode> {
        check_flags(self)?;
        check_not_self_referencing(self)?;
        check_currency_is_issued(self)
    }

    fn preclaim(&self, view: &LedgerView<'_, S>, env: &Environment) -> Result<(), TxResultCode> {
        let sender_key = keylet::account(self.common.account);
        let sender = view
            .read_sle(&sender_key)
            .map_err(|_| TxResultCode::TefBadAuth)?
            .ok_or(TxResultCode::TefBadAuth)?;

        let line_key = keylet::ripple_state(self.common.account, self.issuer(), self.currency());
        let existing_line = view.read_sle(&line_key).map_err(|_| TxResultCode::TefBadAuth)?;

        if existing_line.is_none() && self.limit() > 0 {
            let fees = fee_settings::read_fee_schedule(view, env.fees)
                .map_err(|_| TxResultCode::TefBadAuth)?;
            let reserve = fees.reserve(account_root::owner_count(&sender) + 1);
            if account_root::balance(&sender) < reserve {
                return Err(TxResultCode::TecInsufficientReserve);
            }
        }

        let wants_freeze_change = self.common.flags
            & (TF_SET_FREEZE | TF_CLEAR_FREEZE | TF_SET_DEEP_FREEZE | TF_CLEAR_DEEP_FREEZE)
            != 0;
        if wants_freeze_change && account_root::has_no_freeze(&sender) {
            return Err(TxResultCode::TecNoPermission);
        }

        if self.common.flags & TF_SET_NO_RIPPLE != 0 {
            if let Some(line) = &existing_line {
                let side = ripple_state::side_of(self.common.account, self.issuer());
                let balance_for_side = match side {
                    ripple_state::Side::Low => ripple_state::balance_low(line),
                    ripple_state::Side::High => -ripple_state::balance_low(line),
                };
                if balance_for_side < 0 {
                    return Err(TxResultCode::TecNoPermission);
                }
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
        let (low, high) = if self.common.account.as_bytes() <= self.issuer().as_bytes() {
            (self.common.account, self.issuer())
        } else {
            (self.issuer(), self.common.account)
        };
        let line_key = keylet::ripple_state(self.common.account, self.issuer(), self.currency());
        let side = ripple_state::side_of(self.common.account, self.issuer());

        let existing = view.read_sle(&line_key)?;
        let is_new_line = existing.is_none();
        let mut line = existing.unwrap_or_else(|| ripple_state::new(low, high, self.currency(), 0, 0));

        match side {
            ripple_state::Side::Low => set_low_limit(&mut line, self.currency(), high, self.limit()),
            ripple_state::Side::High => set_high_limit(&mut line, self.currency(), low, self.limit()),
        }
        apply_flag_changes(&mut line, side, self.common.flags);
        sle::stamp_previous_txn(&mut line, tx_id, env.ledger_index);

        if ripple_state::is_default(&line) {
            view.erase_sle(line_key);
            if let Some(owner_node) = match side {
                ripple_state::Side::Low => Some(ripple_state::low_node(&line)),
                ripple_state::Side::High => Some(ripple_state::high_node(&line)),
            } {
                directory::remove(view, self.common.account, owner_node, line_key)?;
            }
            let mut sender = view
                .read_sle(&keylet::account(self.common.account))?
                .ok_or(LedgerError::MissingField("sender AccountRoot"))?;
            account_root::incr_owner_count(&mut sender, -1);
            view.write_sle(keylet::account(self.common.account), &sender)?;
            return Ok(TxResultCode::TesSuccess);
        }

        view.write_sle(line_key, &line)?;

        if is_new_line {
            let (_, page) = directory::insert(view, self.common.account, line_key)?;
            let mut line = view.read_sle(&line_key)?.ok_or(LedgerError::MissingField("RippleState"))?;
            match side {
                ripple_state::Side::Low => ripple_state::set_low_node(&mut line, page),
                ripple_state::Side::High => ripple_state::set_high_node(&mut line, page),
            }
            view.write_sle(line_key, &line)?;

            let mut sender = view
                .read_sle(&keylet::account(self.common.account))?
                .ok_or(LedgerError::MissingField("sender AccountRoot"))?;
            account_root::incr_owner_count(&mut sender, 1);
            view.write_sle(keylet::account(self.common.account), &sender)?;
        }

        Ok(TxResultCode::TesSuccess)
    }
}

fn set_low_limit(line: &mut FieldObject, currency: Currency, high: AccountId, limit: u64) {
    line.set(Field::LowLimit, Value::Amount(limit_amount(currency, high, limit)));
}

fn set_high_limit(line: &mut FieldObject, currency: Currency, low: AccountId, limit: u64) {
    line.set(Field::HighLimit, Value::Amount(limit_amount(currency, low, limit)));
}

fn limit_amount(currency: Currency, issuer: AccountId, limit: u64) -> Amount {
    if limit == 0 {
        return Amount::Issued(IssuedAmount::zero(currency, issuer));
    }
    let mut mantissa = limit as i128;
    let mut exponent: i32 = 0;
    while mantissa >= 10_000_000_000_000_000 {
        mantissa /= 10;
        exponent += 1;
    }
    while mantissa < 1_000_000_000_000_000 {
        mantissa *= 10;
        exponent -= 1;
    }
    Amount::Issued(
        IssuedAmount::new(mantissa as u64, exponent as i8, true, currency, issuer)
            .expect("limit magnitudes normalize to a canonical mantissa"),
    )
}

fn apply_flag_changes(line: &mut FieldObject, side: ripple_state::Side, flags: u32) {
    let mut current = ripple_state::flags(line);
    let (no_ripple_bit, freeze_bit, deep_freeze_bit) = match side {
        ripple_state::Side::Low => (
            ripple_state::LSF_LOW_NO_RIPPLE,
            ripple_state::LSF_LOW_FREEZE,
            ripple_state::LSF_LOW_DEEP_FREEZE,
        ),
        ripple_state::Side::High => (
            ripple_state::LSF_HIGH_NO_RIPPLE,
            ripple_state::LSF_HIGH_FREEZE,
            ripple_state::LSF_HIGH_DEEP_FREEZE,
        ),
    };
    if flags & TF_SET_NO_RIPPLE != 0 {
        current |= no_ripple_bit;
    }
    if flags & TF_CLEAR_NO_RIPPLE != 0 {
        current &= !no_ripple_bit;
    }
    if flags & TF_SET_FREEZE != 0 {
        current |= freeze_bit;
    }
    if flags & TF_CLEAR_FREEZE != 0 {
        current &= !freeze_bit;
    }
    if flags & TF_SET_DEEP_FREEZE != 0 {
        current |= deep_freeze_bit;
    }
    if flags & TF_CLEAR_DEEP_FREEZE != 0 {
        current &= !deep_freeze_bit;
    }
    ripple_state::set_flags(line, current);
}
