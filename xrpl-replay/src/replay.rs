//! `replay(pre_state, env, txs, expected) -> ReplayResult` (§6 "Core entry
//! points"): load a fixture's pre-state into an in-memory tree, apply its
//! block of transactions, close the resulting ledger, and report whether
//! the roots it produced match the fixture's `expected.json`.
//!
//! Grounded on `examples/block-decode`'s "load fixture, run the real
//! pipeline, print what came out" main-loop shape; the closing and
//! hash-comparison logic is this core's own (§4.8, §7 "the engine never
//! swallows hash-mismatch signals").

use serde::Serialize;
use tracing::{info, instrument};
use xrpl_hash::{Hash, SkipVerifier};
use xrpl_ledger::{
    block::apply_block,
    close::{close_ledger, CloseInputs},
    environment::{Environment, FeeSchedule},
};
use xrpl_tree::{MemNodeStore, StateMap};

use crate::{
    error::ReplayError,
    fixtures::{EnvFixture, ExpectedFixture, StateFixture, TxsFixture},
};

/// One transaction's reported outcome (§6 `ReplayResult.tx_result`).
#[derive(Debug, Clone, Serialize)]
pub struct TxResultEntry {
    pub index: u32,
    pub hash: Hash<32>,
    pub result: String,
    pub applied: bool,
}

/// `ReplayResult` (§6): what `replay` produces, independent of whether it
/// was asked to compare against an `expected.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResult {
    pub ledger_hash: Hash<32>,
    pub state_root: Hash<32>,
    pub tx_root: Hash<32>,
    pub total_drops: u64,
    pub tx_result: Vec<TxResultEntry>,
    pub error: Option<String>,
}

fn environment(fixture: &EnvFixture) -> Result<Environment, ReplayError> {
    Ok(Environment {
        ledger_index: fixture.ledger_index,
        parent_hash: fixture.parent_hash,
        parent_close_time: fixture.parent_close_time,
        close_time: fixture.close_time,
        close_time_resolution: fixture.close_time_resolution,
        close_flags: fixture.close_flags,
        total_coins: fixture.total_coins()?,
        fees: FeeSchedule {
            base_fee: fixture.fees.base_fee,
            reserve_base: fixture.fees.reserve_base,
            reserve_increment: fixture.fees.reserve_increment,
        },
        amendments: fixture.amendments.clone(),
    })
}

/// Build an in-memory state map from `state.json`'s entries, in whatever
/// order the fixture lists them — the tree's root is order-insensitive
/// (P5), so replay doesn't need to preserve insertion order.
fn load_state(fixture: &StateFixture) -> Result<StateMap<MemNodeStore>, ReplayError> {
    let mut state = StateMap::new_state(MemNodeStore::new());
    for entry in &fixture.entries {
        state
            .put(entry.index, entry.data.clone())
            .map_err(|e| ReplayError::Tree(e.to_string()))?;
    }
    Ok(state)
}

/// Run one block through the core (§4.8 H/I) and report the resulting
/// roots. Does not compare against any `expected.json` itself — see
/// [`check`] for that.
///
/// Replaying a block whose validity the reference has already established
/// skips signature verification (§9 "Open questions" / "Signature
/// verification").
#[instrument(skip_all, fields(ledger_index = env.ledger_index, txs = txs.transactions.len()))]
pub fn replay(
    pre_state: &StateFixture,
    env: &EnvFixture,
    txs: &TxsFixture,
) -> Result<ReplayResult, ReplayError> {
    let mut state = load_state(pre_state)?;
    let env = environment(env)?;
    let mut tx_tree = StateMap::new_tx(MemNodeStore::new());

    let blobs: Vec<Vec<u8>> = txs.transactions.iter().map(|tx| tx.tx_blob.clone()).collect();

    let block = apply_block(&mut state, &mut tx_tree, &env, &blobs, &SkipVerifier)?;

    let total_drops = env.total_coins.saturating_sub(block.total_drops_burned);
    let (_, ledger_hash) = close_ledger(CloseInputs {
        sequence: env.ledger_index,
        parent_hash: env.parent_hash,
        parent_close_time: env.parent_close_time,
        close_time: env.close_time,
        close_time_resolution: env.close_time_resolution,
        close_flags: env.close_flags,
        total_drops,
        account_state_hash: state.root_hash(),
        transaction_tree_hash: tx_tree.root_hash(),
    });

    let tx_result = block
        .outcomes
        .iter()
        .map(|outcome| TxResultEntry {
            index: outcome.index,
            hash: outcome.tx_hash,
            result: outcome.result_code.to_string(),
            applied: outcome.applied,
        })
        .collect();

    info!(?ledger_hash, total_drops, "replayed block");

    Ok(ReplayResult {
        ledger_hash,
        state_root: state.root_hash(),
        tx_root: tx_tree.root_hash(),
        total_drops,
        tx_result,
        error: None,
    })
}

/// Compare a `replay` outcome against `expected.json`, collecting every
/// mismatch rather than stopping at the first (§7 "the driver surfaces the
/// mismatch and exits non-zero" — a useful diagnostic lists all of them).
pub fn check(result: &ReplayResult, expected: &ExpectedFixture) -> Result<(), Vec<String>> {
    let mut mismatches = Vec::new();

    if result.ledger_hash != expected.ledger_hash {
        mismatches.push(format!(
            "ledger_hash: got {}, expected {}",
            result.ledger_hash, expected.ledger_hash
        ));
    }
    if result.state_root != expected.account_hash {
        mismatches.push(format!(
            "account_hash: got {}, expected {}",
            result.state_root, expected.account_hash
        ));
    }
    if result.tx_root != expected.transaction_hash {
        mismatches.push(format!(
            "transaction_hash: got {}, expected {}",
            result.tx_root, expected.transaction_hash
        ));
    }
    match expected.total_coins() {
        Ok(total_coins) if total_coins != result.total_drops => mismatches.push(format!(
            "total_coins: got {}, expected {total_coins}",
            result.total_drops
        )),
        Err(e) => mismatches.push(e.to_string()),
        Ok(_) => {}
    }

    let applied: Vec<_> = result.tx_result.iter().filter(|t| t.applied).collect();
    if applied.len() != expected.transactions.len() {
        mismatches.push(format!(
            "applied transaction count: got {}, expected {}",
            applied.len(),
            expected.transactions.len()
        ));
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        tracing::warn!(count = mismatches.len(), "replay diverged from expected.json");
        Err(mismatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpl_codec::{encode, keylet, Amount, Field, FieldObject, TransactionType, Value};
    use xrpl_hash::AccountId;
    use xrpl_ledger::sle::account_root;

    fn genesis_account(id: AccountId, balance: u64) -> (Hash<32>, Vec<u8>) {
        (keylet::account(id), encode(&account_root::new(id, balance, 1)).unwrap())
    }

    fn env_fixture() -> EnvFixture {
        EnvFixture {
            ledger_index: 2,
            parent_hash: Hash::new([9; 32]),
            parent_close_time: 0,
            close_time: 10,
            close_time_resolution: 10,
            close_flags: 0,
            total_coins: "1000000000".to_string(),
            fees: crate::fixtures::FeeScheduleFixture {
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
            .with(Field::Flags, Value::UInt32(xrpl_ledger::tx::TF_FULLY_CANONICAL_SIG));
        encode(&object).unwrap()
    }

    /// Builds pre-state/env/txs fixtures, runs `replay`, then builds an
    /// `expected.json` straight from that same run's output — a
    /// self-consistency check on the harness's fixture plumbing, not a
    /// literal reference-vector comparison.
    #[test]
    fn replaying_a_payment_matches_an_expected_built_from_its_own_output() {
        let a = AccountId::from_bytes([1; 20]);
        let b = AccountId::from_bytes([2; 20]);
        let (a_key, a_data) = genesis_account(a, 1_000_000_000);

        let state = StateFixture {
            ledger_index: 1,
            account_hash: Hash::ZERO, // not checked by `replay` itself
            entries: vec![crate::fixtures::StateEntry { index: a_key, data: a_data }],
        };
        let env = env_fixture();
        let blob = payment_blob(a, b, 20_000_000, 12, 1);
        let txs = TxsFixture {
            transactions: vec![crate::fixtures::TxEntry {
                index: 0,
                hash: Hash::ZERO, // not checked by `replay` itself
                tx_blob: blob,
            }],
        };

        let result = replay(&state, &env, &txs).unwrap();
        assert_eq!(result.total_drops, 1_000_000_000 - 12);
        assert!(result.tx_result[0].applied);
        assert_eq!(result.tx_result[0].result, "tesSUCCESS");

        let expected = ExpectedFixture {
            ledger_index: env.ledger_index,
            ledger_hash: result.ledger_hash,
            account_hash: result.state_root,
            transaction_hash: result.tx_root,
            total_coins: result.total_drops.to_string(),
            transactions: vec![crate::fixtures::ExpectedTxEntry {
                index: 0,
                hash: result.tx_result[0].hash,
                meta_blob: vec![],
            }],
        };

        assert!(check(&result, &expected).is_ok());
    }

    #[test]
    fn a_flipped_expected_hash_is_reported_as_a_mismatch() {
        let a = AccountId::from_bytes([3; 20]);
        let (a_key, a_data) = genesis_account(a, 1_000_000_000);
        let state = StateFixture {
            ledger_index: 1,
            account_hash: Hash::ZERO,
            entries: vec![crate::fixtures::StateEntry { index: a_key, data: a_data }],
        };
        let env = env_fixture();
        let txs = TxsFixture { transactions: vec![] };

        let result = replay(&state, &env, &txs).unwrap();
        let mut expected = ExpectedFixture {
            ledger_index: env.ledger_index,
            ledger_hash: result.ledger_hash,
            account_hash: result.state_root,
            transaction_hash: result.tx_root,
            total_coins: result.total_drops.to_string(),
            transactions: vec![],
        };
        expected.ledger_hash = Hash::new([0xFF; 32]);

        let mismatches = check(&result, &expected).unwrap_err();
        assert!(mismatches.iter().any(|m| m.starts_with("ledger_hash")));
    }
}
