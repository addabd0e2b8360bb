//! Ledger view, transaction framework, per-type handlers, block processor,
//! and ledger close for an XRPL-compatible state-transition core (§4.5–4.9).
//!
//! Layering mirrors the rest of the workspace: `xrpl-hash` for primitives,
//! `xrpl-codec` for the wire format, `xrpl-tree` for the authenticated
//! store, and this crate for everything that gives those three meaning —
//! what a transaction is, how it changes state, and how a block of them
//! becomes the next ledger header.

pub mod block;
pub mod close;
pub mod engine;
pub mod environment;
pub mod error;
pub mod sle;
pub mod tx;
pub mod view;

pub use block::{apply_block, BlockResult, TxOutcome};
pub use close::{ledger_hash, LedgerHeader};
pub use engine::{apply_transaction, ApplyResult};
pub use environment::{Environment, FeeSchedule};
pub use error::{LedgerError, TxResultCode};
pub use tx::{Common, ParsedTx, Transaction};
pub use view::LedgerView;
