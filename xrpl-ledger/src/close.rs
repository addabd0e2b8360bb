//! Ledger close: finalize close time, read the now-committed tree roots,
//! assemble the header in its fixed field order, and hash it.

use tracing::debug;
use xrpl_hash::{sha512_half, Hash, HashPrefix};

/// The ledger header (§3), in the exact field order its binary form and
/// hash are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerHeader {
    pub sequence: u32,
    pub total_drops: u64,
    pub parent_hash: Hash<32>,
    pub transaction_tree_hash: Hash<32>,
    pub account_state_hash: Hash<32>,
    pub parent_close_time: u32,
    pub close_time: u32,
    pub close_time_resolution: u8,
    pub close_flags: u8,
}

impl LedgerHeader {
    /// The fixed-order binary form §3 hashes: sequence, total drops, parent
    /// hash, transaction root, account-state root, parent close time, close
    /// time, close resolution, close flags.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 8 + 32 + 32 + 32 + 4 + 4 + 1 + 1);
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out.extend_from_slice(&self.total_drops.to_be_bytes());
        out.extend_from_slice(self.parent_hash.as_ref());
        out.extend_from_slice(self.transaction_tree_hash.as_ref());
        out.extend_from_slice(self.account_state_hash.as_ref());
        out.extend_from_slice(&self.parent_close_time.to_be_bytes());
        out.extend_from_slice(&self.close_time.to_be_bytes());
        out.push(self.close_time_resolution);
        out.push(self.close_flags);
        out
    }
}

/// `sha512_half(LEDGER-PREFIX || header_bytes)` (§3 "The ledger hash is").
pub fn ledger_hash(header: &LedgerHeader) -> Hash<32> {
    let mut buf = Vec::from(HashPrefix::Ledger.as_bytes());
    buf.extend_from_slice(&header.to_bytes());
    sha512_half(&buf)
}

/// Round a proposed close time to the nearest multiple of `resolution`
/// seconds, never going backwards past `parent_close_time` (§4.8 "Finalize
/// close time by rounding to close_time_resolution"). Ripple epoch seconds
/// throughout (§6).
pub fn round_close_time(close_time: i64, parent_close_time: i64, resolution: u32) -> i64 {
    let resolution = i64::from(resolution).max(1);
    let rounded = ((close_time + resolution / 2) / resolution) * resolution;
    rounded.max(parent_close_time + 1)
}

/// Everything §4.8 I needs to finish a block once every transaction has
/// been applied and threaded: the already-committed tree roots plus the
/// execution context's timing and total-drops fields.
pub struct CloseInputs {
    pub sequence: u32,
    pub parent_hash: Hash<32>,
    pub parent_close_time: i64,
    pub close_time: i64,
    pub close_time_resolution: u32,
    pub close_flags: u8,
    pub total_drops: u64,
    pub account_state_hash: Hash<32>,
    pub transaction_tree_hash: Hash<32>,
}

/// Assemble and hash the header for a closed ledger (§4.8 I). Returns the
/// header alongside its hash so callers don't have to call
/// [`ledger_hash`] separately.
pub fn close_ledger(inputs: CloseInputs) -> (LedgerHeader, Hash<32>) {
    let close_time = round_close_time(
        inputs.close_time,
        inputs.parent_close_time,
        inputs.close_time_resolution,
    );

    let header = LedgerHeader {
        sequence: inputs.sequence,
        total_drops: inputs.total_drops,
        parent_hash: inputs.parent_hash,
        transaction_tree_hash: inputs.transaction_tree_hash,
        account_state_hash: inputs.account_state_hash,
        parent_close_time: inputs.parent_close_time as u32,
        close_time: close_time as u32,
        close_time_resolution: inputs.close_time_resolution as u8,
        close_flags: inputs.close_flags,
    };
    let hash = ledger_hash(&header);
    debug!(sequence = header.sequence, ?hash, "ledger closed");
    (header, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> LedgerHeader {
        LedgerHeader {
            sequence: 5,
            total_drops: 100_000_000_000,
            parent_hash: Hash::new([1; 32]),
            transaction_tree_hash: Hash::ZERO,
            account_state_hash: Hash::new([2; 32]),
            parent_close_time: 10,
            close_time: 20,
            close_time_resolution: 10,
            close_flags: 0,
        }
    }

    #[test]
    fn header_hash_is_deterministic() {
        assert_eq!(ledger_hash(&header()), ledger_hash(&header()));
    }

    #[test]
    fn changing_any_header_field_changes_the_hash() {
        let base = ledger_hash(&header());
        let mut changed = header();
        changed.sequence += 1;
        assert_ne!(ledger_hash(&changed), base);
    }

    #[test]
    fn close_time_rounds_to_the_nearest_resolution_multiple() {
        assert_eq!(round_close_time(24, 0, 10), 20);
        assert_eq!(round_close_time(26, 0, 10), 30);
    }

    #[test]
    fn close_time_never_precedes_the_parent() {
        assert_eq!(round_close_time(5, 100, 10), 101);
    }

    #[test]
    fn close_ledger_produces_a_header_matching_its_own_hash() {
        let inputs = CloseInputs {
            sequence: 6,
            parent_hash: Hash::new([3; 32]),
            parent_close_time: 100,
            close_time: 104,
            close_time_resolution: 10,
            close_flags: 0,
            total_drops: 99_999_999_990,
            account_state_hash: Hash::new([5; 32]),
            transaction_tree_hash: Hash::new([6; 32]),
        };
        let (header, hash) = close_ledger(inputs);
        assert_eq!(ledger_hash(&header), hash);
        assert_eq!(header.sequence, 6);
        assert!(header.close_time as i64 >= header.parent_close_time as i64 + 1);
    }
}
