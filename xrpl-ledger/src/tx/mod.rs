//! The transaction framework: parsing a signed blob into a typed,
//! dispatchable transaction, and the `Transaction` trait each per-type
//! handler implements. A handler's preflight/preclaim is a straight-line
//! list of small functions threaded with `?`, each named for the one rule
//! it checks.

pub mod oracle;
pub mod payment;
pub mod trust_set;

use xrpl_codec::{decode, Field, FieldObject, TransactionType, Value};
use xrpl_hash::{sha512_half, AccountId, Hash, HashPrefix};
use xrpl_tree::NodeStore;

use crate::{environment::Environment, error::TxResultCode, view::LedgerView};

/// The one universal transaction flag the framework itself validates
/// (§4.6 step 3, SPEC_FULL "Universal transaction flags mask"). Per-type
/// flags (e.g. TrustSet's `tfSetNoRipple`) are handler-local and never
/// checked here.
pub const TF_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

/// The common header fields present on every transaction (SPEC_FULL
/// "common fields"), independent of its type-specific body.
#[derive(Debug, Clone)]
pub struct Common {
    pub account: AccountId,
    pub tx_type: TransactionType,
    pub fee: u64,
    pub sequence: u32,
    pub ticket_sequence: Option<u32>,
    pub signing_pub_key: Vec<u8>,
    pub txn_signature: Option<Vec<u8>>,
    pub flags: u32,
    pub last_ledger_sequence: Option<u32>,
    pub account_txn_id: Option<Hash<32>>,
}

impl Common {
    fn from_object(object: &FieldObject) -> Result<Self, TxResultCode> {
        let account = object
            .get(Field::Account)
            .and_then(Value::as_account_id)
            .ok_or(TxResultCode::TemMalformed)?;
        let tx_type = object
            .get(Field::TransactionType)
            .and_then(Value::as_u16)
            .and_then(TransactionType::from_code)
            .ok_or(TxResultCode::TemMalformed)?;
        let fee = object
            .get(Field::Fee)
            .and_then(Value::as_amount)
            .and_then(xrpl_codec::Amount::as_drops)
            .ok_or(TxResultCode::TemMalformed)?;
        let sequence = object
            .get(Field::Sequence)
            .and_then(Value::as_u32)
            .ok_or(TxResultCode::TemMalformed)?;
        let ticket_sequence = object.get(Field::TicketSequence).and_then(Value::as_u32);
        let signing_pub_key = object
            .get(Field::SigningPubKey)
            .and_then(Value::as_blob)
            .ok_or(TxResultCode::TemMalformed)?
            .to_vec();
        let txn_signature = object
            .get(Field::TxnSignature)
            .and_then(Value::as_blob)
            .map(<[u8]>::to_vec);
        let flags = object.get(Field::Flags).and_then(Value::as_u32).unwrap_or(0);
        let last_ledger_sequence = object.get(Field::LastLedgerSequence).and_then(Value::as_u32);
        let account_txn_id = object.get(Field::AccountTxnId).and_then(Value::as_hash256);

        Ok(Self {
            account,
            tx_type,
            fee,
            sequence,
            ticket_sequence,
            signing_pub_key,
            txn_signature,
            flags,
            last_ledger_sequence,
            account_txn_id,
        })
    }

    /// §4.6 step 3's type-independent checks, run again here during
    /// preflight since `parse_and_prepare` and preflight share the same
    /// rule set.
    fn validate_universal(&self) -> Result<(), TxResultCode> {
        check_sequence_or_ticket(self)?;
        check_signing_key_present(self)
    }
}

fn check_sequence_or_ticket(common: &Common) -> Result<(), TxResultCode> {
    match (common.sequence, common.ticket_sequence) {
        // A ticket-sequenced transaction carries Sequence = 0.
        (0, Some(_)) => Ok(()),
        (0, None) => Err(TxResultCode::TemBadSequence),
        (_, Some(_)) => Err(TxResultCode::TemBadSequence),
        (_, None) => Ok(()),
    }
}

fn check_signing_key_present(common: &Common) -> Result<(), TxResultCode> {
    // An empty SigningPubKey is valid only in signature-skip mode, which
    // the framework cannot distinguish at this layer; emptiness itself is
    // never malformed, only a key of the wrong length is.
    if !common.signing_pub_key.is_empty()
        && common.signing_pub_key.len() != 33
        && common.signing_pub_key.len() != 32
    {
        return Err(TxResultCode::TemMalformed);
    }
    Ok(())
}

/// A decoded transaction dispatched to its per-type handler (§9 "prefer a
/// trait/interface `Transaction`").
pub enum ParsedTx {
    Payment(payment::Payment),
    TrustSet(trust_set::TrustSet),
    OracleSet(oracle::OracleSet),
    OracleDelete(oracle::OracleDelete),
}

impl ParsedTx {
    pub fn common(&self) -> &Common {
        match self {
            ParsedTx::Payment(tx) => tx.common(),
            ParsedTx::TrustSet(tx) => tx.common(),
            ParsedTx::OracleSet(tx) => tx.common(),
            ParsedTx::OracleDelete(tx) => tx.common(),
        }
    }

    pub fn preflight(&self) -> Result<(), TxResultCode> {
        self.common().validate_universal()?;
        match self {
            ParsedTx::Payment(tx) => tx.preflight(),
            ParsedTx::TrustSet(tx) => tx.preflight(),
            ParsedTx::OracleSet(tx) => tx.preflight(),
            ParsedTx::OracleDelete(tx) => tx.preflight(),
        }
    }

    pub fn preclaim<S: NodeStore>(
        &self,
        view: &LedgerView<'_, S>,
        env: &Environment,
    ) -> Result<(), TxResultCode> {
        match self {
            ParsedTx::Payment(tx) => tx.preclaim(view, env),
            ParsedTx::TrustSet(tx) => tx.preclaim(view, env),
            ParsedTx::OracleSet(tx) => tx.preclaim(view, env),
            ParsedTx::OracleDelete(tx) => tx.preclaim(view, env),
        }
    }

    pub fn do_apply<S: NodeStore>(
        &self,
        view: &mut LedgerView<'_, S>,
        env: &Environment,
        tx_id: Hash<32>,
    ) -> Result<TxResultCode, crate::error::LedgerError> {
        match self {
            ParsedTx::Payment(tx) => tx.do_apply(view, env, tx_id),
            ParsedTx::TrustSet(tx) => tx.do_apply(view, env, tx_id),
            ParsedTx::OracleSet(tx) => tx.do_apply(view, env, tx_id),
            ParsedTx::OracleDelete(tx) => tx.do_apply(view, env, tx_id),
        }
    }

    /// Amendments this transaction's semantics depend on (§9 Transaction
    /// trait); none of this core's handlers are amendment-gated, so every
    /// implementation returns an empty slice.
    pub fn required_amendments(&self) -> &'static [Hash<32>] {
        &[]
    }
}

/// A transaction's typed, dispatchable body plus the checks unique to its
/// type (§9 "Transaction" trait). `Common` carries the fields every type
/// shares; the framework calls `preflight`/`preclaim`/`do_apply` in that
/// order, matching §4.6's named apply steps.
pub trait Transaction<S: NodeStore> {
    fn common(&self) -> &Common;

    /// Stateless, type-specific syntax checks (§4.6 step 2). A `temXXX`
    /// code here aborts before anything touches state.
    fn preflight(&self) -> Result<(), TxResultCode>;

    /// Read-only state checks (§4.6 step 3): does the account exist, is
    /// the reserve satisfied, are required amendments enabled.
    fn preclaim(&self, view: &LedgerView<'_, S>, env: &Environment) -> Result<(), TxResultCode>;

    /// Mutates `view` to carry out the transaction's effect, having
    /// already passed preflight, preclaim, and the fee/sequence check
    /// (§4.6 step 5). Returns the terminal result code.
    fn do_apply(
        &self,
        view: &mut LedgerView<'_, S>,
        env: &Environment,
        tx_id: Hash<32>,
    ) -> Result<TxResultCode, crate::error::LedgerError>;
}

/// `parse_and_prepare` (§4.6 F): decode a raw transaction blob, dispatch on
/// `TransactionType`, and run the universal checks common to every type.
/// Returns the dispatched transaction, its hash, and the raw blob it was
/// built from.
pub fn parse_and_prepare(blob: &[u8]) -> Result<(ParsedTx, Hash<32>), TxResultCode> {
    let object = decode(blob).map_err(|_| TxResultCode::TemMalformed)?;
    let common = Common::from_object(&object)?;
    common.validate_universal()?;

    let parsed = match common.tx_type {
        TransactionType::Payment => ParsedTx::Payment(payment::Payment::from_object(common, &object)?),
        TransactionType::TrustSet => {
            ParsedTx::TrustSet(trust_set::TrustSet::from_object(common, &object)?)
        }
        TransactionType::OracleSet => {
            ParsedTx::OracleSet(oracle::OracleSet::from_object(common, &object)?)
        }
        TransactionType::OracleDelete => {
            ParsedTx::OracleDelete(oracle::OracleDelete::from_object(common, &object)?)
        }
        TransactionType::EnableAmendment | TransactionType::SetFee => {
            return Err(TxResultCode::TemMalformed)
        }
    };

    let mut hash_input = Vec::from(HashPrefix::TransactionId.as_bytes());
    hash_input.extend_from_slice(blob);
    let tx_hash = sha512_half(&hash_input);

    Ok((parsed, tx_hash))
}
