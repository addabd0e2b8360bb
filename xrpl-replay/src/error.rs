//! Errors this driver can raise: bad fixtures, and the ledger core's own
//! errors passed through (§7 "Malformed input" aborts the enclosing
//! operation and surfaces to the caller).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("reading {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("parsing {0}: {1}")]
    BadJson(PathBuf, serde_json::Error),

    #[error("{0}")]
    BadFixture(String),

    #[error(transparent)]
    Ledger(#[from] xrpl_ledger::LedgerError),

    #[error("tree operation failed: {0}")]
    Tree(String),
}
