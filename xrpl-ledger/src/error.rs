//! Transaction result codes (§4.6 "Result code taxonomy", §7) and the
//! framework-level error type.

use thiserror::Error;

/// The six result-code classes (§4.6), in the order the framework checks
/// them: malformed syntax is rejected before anything touches state, local
/// policy rejection never reaches a ledger, temporary conditions may be
/// retried, in-ledger failures are terminal but free, claimed transactions
/// burn a fee, and success is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TxResultCode {
    /// `tem*` — invalid transaction syntax; never applicable, at any time.
    TemMalformed,
    TemBadFee,
    TemBadSequence,
    TemInvalidFlag,
    TemDisabled,
    /// `tel*` — rejected by local node policy only; never enters a ledger.
    TelLocalError,
    /// `ter*` — temporary; may be retried once the condition clears.
    TerInsufficientFee,
    TerPreSeq,
    /// `tef*` — failure in ledger context; not applied, not retriable.
    TefBadAuth,
    TefMaxLedger,
    TefAlreadyApplied,
    /// `tec*` — claimed: applied, fee burned, transaction's purpose failed.
    TecInsufficientReserve,
    TecNoDst,
    TecNoEntry,
    TecDirFull,
    TecPathDry,
    TecOracleOversize,
    TecNoPermission,
    /// `tes*` — fully applied.
    TesSuccess,
}

impl TxResultCode {
    /// The conventional three-letter prefix (§4.6).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::TemMalformed
            | Self::TemBadFee
            | Self::TemBadSequence
            | Self::TemInvalidFlag
            | Self::TemDisabled => "tem",
            Self::TelLocalError => "tel",
            Self::TerInsufficientFee | Self::TerPreSeq => "ter",
            Self::TefBadAuth | Self::TefMaxLedger | Self::TefAlreadyApplied => "tef",
            Self::TecInsufficientReserve
            | Self::TecNoDst
            | Self::TecNoEntry
            | Self::TecDirFull
            | Self::TecPathDry
            | Self::TecOracleOversize
            | Self::TecNoPermission => "tec",
            Self::TesSuccess => "tes",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::TesSuccess)
    }

    /// Whether the view's state changes (not just fee/sequence) persist:
    /// `tes` commits everything, `tec` commits only the fee-and-sequence
    /// bookkeeping the engine itself applied (§4.6 step 6).
    pub fn is_claimed(self) -> bool {
        self.prefix() == "tec"
    }

    /// Whether this transaction consumed a place in the ledger at all
    /// (`tes`/`tec`), as opposed to being rejected outright.
    pub fn was_applied(self) -> bool {
        self.is_success() || self.is_claimed()
    }
}

impl std::fmt::Display for TxResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TemMalformed => "temMALFORMED",
            Self::TemBadFee => "temBAD_FEE",
            Self::TemBadSequence => "temBAD_SEQUENCE",
            Self::TemInvalidFlag => "temINVALID_FLAG",
            Self::TemDisabled => "temDISABLED",
            Self::TelLocalError => "telLOCAL_ERROR",
            Self::TerInsufficientFee => "terINSUFFICIENT_FEE",
            Self::TerPreSeq => "terPRE_SEQ",
            Self::TefBadAuth => "tefBAD_AUTH",
            Self::TefMaxLedger => "tefMAX_LEDGER",
            Self::TefAlreadyApplied => "tefALREADY",
            Self::TecInsufficientReserve => "tecINSUFFICIENT_RESERVE",
            Self::TecNoDst => "tecNO_DST",
            Self::TecNoEntry => "tecNO_ENTRY",
            Self::TecDirFull => "tecDIR_FULL",
            Self::TecPathDry => "tecPATH_DRY",
            Self::TecOracleOversize => "tecOVERSIZE",
            Self::TecNoPermission => "tecNO_PERMISSION",
            Self::TesSuccess => "tesSUCCESS",
        };
        f.write_str(name)
    }
}

/// Failures that abort the enclosing operation rather than producing a
/// result code (§7 "Malformed input", "Invariant violation"): bad blobs,
/// bad JSON fixtures, or a `tef*`/invariant break surfacing out of
/// `apply_block`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to decode transaction blob: {0}")]
    Decode(#[from] xrpl_codec::DecodeError),

    #[error("failed to encode field object: {0}")]
    Encode(#[from] xrpl_codec::EncodeError),

    #[error("tree operation failed: {0}")]
    Tree(String),

    #[error("transaction {result} is a ledger-context failure, aborting block: {detail}")]
    InvariantViolation {
        result: TxResultCode,
        detail: String,
    },

    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("malformed transaction: {0}")]
    Malformed(String),
}
