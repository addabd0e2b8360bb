//! The transaction engine (§4.6): drives one transaction through
//! `parse_and_prepare` → preflight → preclaim → fee/sequence bookkeeping →
//! `do_apply`, then commits or discards the handler's own state changes
//! depending on the result code (§4.6 step 6, `TxResultCode::is_claimed`).

use tracing::{debug, instrument, warn};
use xrpl_codec::{decode, encode_for_signing, keylet, FieldObject};
use xrpl_hash::{AccountId, Hash, SignatureVerifier};
use xrpl_tree::{NodeStore, StateMap, TreeKey};

use crate::{
    environment::Environment,
    error::{LedgerError, TxResultCode},
    sle::{account_root, fee_settings, ticket},
    tx::{self, Common},
    view::LedgerView,
};

/// What happened to one touched ledger entry, for `AffectedNodes`-style
/// metadata (§4.7 "report every affected SLE in metadata").
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEffect {
    Created(FieldObject),
    Modified { pre: FieldObject, post: FieldObject },
    Deleted(FieldObject),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffectedNode {
    pub key: TreeKey,
    pub effect: NodeEffect,
}

#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub result_code: TxResultCode,
    pub applied: bool,
    pub fee_paid: u64,
    pub metadata: Vec<AffectedNode>,
}

impl ApplyResult {
    fn rejected(result_code: TxResultCode) -> Self {
        Self {
            result_code,
            applied: false,
            fee_paid: 0,
            metadata: Vec::new(),
        }
    }
}

/// Deduct `common.fee` from the sender's balance and advance its sequence
/// counter (or consume the named ticket), per §4.6 step 4. Run only once
/// preflight and preclaim have both passed.
fn apply_fee_and_sequence<S: NodeStore>(
    view: &mut LedgerView<'_, S>,
    env: &Environment,
    common: &Common,
) -> Result<Result<(), TxResultCode>, LedgerError> {
    if common.fee < env.fees.base_fee {
        return Ok(Err(TxResultCode::TerInsufficientFee));
    }

    let account_key = keylet::account(common.account);
    let mut account = view
        .read_sle(&account_key)?
        .ok_or(LedgerError::MissingField("sender AccountRoot"))?;

    if account_root::balance(&account) < common.fee {
        return Ok(Err(TxResultCode::TerInsufficientFee));
    }
    let remaining = account_root::balance(&account) - common.fee;
    account_root::set_balance(&mut account, remaining);

    match common.ticket_sequence {
        Some(ticket_sequence) => {
            let ticket_key = ticket::keylet_for(common.account, ticket_sequence);
            if view.read_sle(&ticket_key)?.is_none() {
                return Ok(Err(TxResultCode::TerPreSeq));
            }
            view.erase_sle(ticket_key);
        }
        None => {
            if account_root::sequence(&account) != common.sequence {
                return Ok(Err(TxResultCode::TerPreSeq));
            }
            account_root::set_sequence(&mut account, account_root::sequence(&account) + 1);
        }
    }

    view.write_sle(account_key, &account)?;
    Ok(Ok(()))
}

fn verify_signature(common: &Common, object: &FieldObject, verifier: &dyn SignatureVerifier) -> bool {
    if common.signing_pub_key.is_empty() {
        return true;
    }
    let Some(signature) = &common.txn_signature else {
        return false;
    };
    let Ok(message) = encode_for_signing(object) else {
        return false;
    };
    verifier.verify(&common.signing_pub_key, &message, signature)
}

fn build_metadata<S: NodeStore>(view: &LedgerView<'_, S>) -> Result<Vec<AffectedNode>, LedgerError> {
    let mut metadata = Vec::with_capacity(view.touched().len());
    for key in view.touched() {
        let pre = view.read_base_sle(key)?;
        let post = view.read_sle(key)?;
        let effect = match (pre, post) {
            (None, Some(post)) => NodeEffect::Created(post),
            (Some(pre), Some(post)) => NodeEffect::Modified { pre, post },
            (Some(pre), None) => NodeEffect::Deleted(pre),
            (None, None) => continue,
        };
        metadata.push(AffectedNode { key: *key, effect });
    }
    Ok(metadata)
}

/// Apply one transaction blob against `base`, mutating it in place on
/// success or on a claimed (`tec`) failure, and leaving it untouched on any
/// earlier rejection.
#[instrument(skip_all, fields(ledger_index = env.ledger_index))]
pub fn apply_transaction<S: NodeStore>(
    base: &mut StateMap<S>,
    env: &Environment,
    blob: &[u8],
    verifier: &dyn SignatureVerifier,
) -> Result<ApplyResult, LedgerError> {
    let (parsed, tx_id) = match tx::parse_and_prepare(blob) {
        Ok(parsed) => parsed,
        Err(code) => {
            warn!(?code, "rejected at parse_and_prepare");
            return Ok(ApplyResult::rejected(code));
        }
    };

    if let Err(code) = parsed.preflight() {
        warn!(?tx_id, ?code, "rejected at preflight");
        return Ok(ApplyResult::rejected(code));
    }

    let object = decode(blob)?;
    if !verify_signature(parsed.common(), &object, verifier) {
        warn!(?tx_id, "rejected: bad signature");
        return Ok(ApplyResult::rejected(TxResultCode::TefBadAuth));
    }

    for amendment in parsed.required_amendments() {
        if !env.amendment_enabled(amendment) {
            warn!(?tx_id, ?amendment, "rejected: amendment not enabled");
            return Ok(ApplyResult::rejected(TxResultCode::TemDisabled));
        }
    }

    let mut fee_view = LedgerView::new(base);
    if let Err(code) = parsed.preclaim(&fee_view, env) {
        warn!(?tx_id, ?code, "rejected at preclaim");
        return Ok(ApplyResult::rejected(code));
    }

    let fee_result = apply_fee_and_sequence(&mut fee_view, env, parsed.common())?;
    let fee = parsed.common().fee;
    if let Err(code) = fee_result {
        warn!(?tx_id, ?code, "rejected at fee/sequence step");
        return Ok(ApplyResult::rejected(code));
    }
    fee_view
        .commit(base)
        .map_err(|e| LedgerError::Tree(e.to_string()))?;

    let mut view = LedgerView::new(base);
    let result_code = parsed.do_apply(&mut view, env, tx_id)?;

    if result_code.is_claimed() {
        // Only the fee/sequence bookkeeping above persists; the handler's
        // own state changes are discarded.
        debug!(?tx_id, ?result_code, fee, "applied (claimed, no-op)");
        return Ok(ApplyResult {
            result_code,
            applied: true,
            fee_paid: fee,
            metadata: Vec::new(),
        });
    }
    if !result_code.is_success() {
        return Err(LedgerError::InvariantViolation {
            result: result_code,
            detail: "do_apply returned a non-terminal result code".into(),
        });
    }

    let metadata = build_metadata(&view)?;
    view.commit(base).map_err(|e| LedgerError::Tree(e.to_string()))?;

    debug!(?tx_id, ?result_code, fee, touched = metadata.len(), "applied");
    Ok(ApplyResult {
        result_code,
        applied: true,
        fee_paid: fee,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpl_codec::{encode, Amount, Field, TransactionType, Value};
    use xrpl_hash::SkipVerifier;
    use xrpl_tree::MemNodeStore;

    fn env() -> Environment {
        Environment {
            ledger_index: 5,
            parent_hash: Hash::ZERO,
            parent_close_time: 0,
            close_time: 0,
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

    fn payment_blob(account: AccountId, destination: AccountId, amount: u64, fee: u64, sequence: u32) -> Vec<u8> {
        let object = FieldObject::new()
            .with(Field::TransactionType, Value::UInt16(TransactionType::Payment.code()))
            .with(Field::Account, Value::AccountId(account))
            .with(Field::Destination, Value::AccountId(destination))
            .with(Field::Amount, Value::Amount(Amount::native(amount)))
            .with(Field::Fee, Value::Amount(Amount::native(fee)))
            .with(Field::Sequence, Value::UInt32(sequence))
            .with(Field::SigningPubKey, Value::Blob(vec![]))
            .with(Field::Flags, Value::UInt32(tx::TF_FULLY_CANONICAL_SIG));
        encode(&object).unwrap()
    }

    #[test]
    fn a_successful_payment_advances_sequence_and_balances() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);

        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(
            keylet::account(a),
            encode(&account_root::new(a, 1_000_000_000, 1)).unwrap(),
        )
        .unwrap();
        base.put(
            keylet::account(b),
            encode(&account_root::new(b, 20_000_000, 1)).unwrap(),
        )
        .unwrap();

        let blob = payment_blob(a, b, 5_000_000, 10, 1);
        let env = env();
        let result = apply_transaction(&mut base, &env, &blob, &SkipVerifier).unwrap();

        assert_eq!(result.result_code, TxResultCode::TesSuccess);
        assert!(result.applied);
        assert_eq!(result.fee_paid, 10);

        let sender = decode(&base.get(&keylet::account(a)).unwrap().unwrap()).unwrap();
        assert_eq!(account_root::balance(&sender), 1_000_000_000 - 10 - 5_000_000);
        assert_eq!(account_root::sequence(&sender), 2);

        let dest = decode(&base.get(&keylet::account(b)).unwrap().unwrap()).unwrap();
        assert_eq!(account_root::balance(&dest), 25_000_000);
    }

    #[test]
    fn a_fee_below_the_base_fee_is_retriable_not_malformed() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);

        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(
            keylet::account(a),
            encode(&account_root::new(a, 1_000_000_000, 1)).unwrap(),
        )
        .unwrap();

        let blob = payment_blob(a, b, 5_000_000, 0, 1);
        let env = env();
        let before = base.root_hash();
        let result = apply_transaction(&mut base, &env, &blob, &SkipVerifier).unwrap();

        assert_eq!(result.result_code, TxResultCode::TerInsufficientFee);
        assert!(!result.applied);
        assert_eq!(base.root_hash(), before);
    }

    #[test]
    fn a_stale_sequence_is_rejected_before_any_state_changes() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);

        let mut base = StateMap::new_state(MemNodeStore::new());
        base.put(
            keylet::account(a),
            encode(&account_root::new(a, 1_000_000_000, 5)).unwrap(),
        )
        .unwrap();

        let blob = payment_blob(a, b, 5_000_000, 10, 1);
        let env = env();
        let before = base.root_hash();
        let result = apply_transaction(&mut base, &env, &blob, &SkipVerifier).unwrap();

        assert_eq!(result.result_code, TxResultCode::TerPreSeq);
        assert!(!result.applied);
        assert_eq!(base.root_hash(), before);
    }
}
