//! Execution context for a block: close time, fee schedule, and active
//! amendments.

use xrpl_hash::Hash;

/// The fee-and-reserve schedule read from the (out-of-scope) `FeeSettings`
/// genesis configuration (§4.2 "FeeSettings").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub base_fee: u64,
    pub reserve_base: u64,
    pub reserve_increment: u64,
}

impl FeeSchedule {
    /// The minimum balance an `AccountRoot` with `owner_count` owned
    /// objects must maintain (§3 I2, P7).
    pub fn reserve(&self, owner_count: u32) -> u64 {
        self.reserve_base + self.reserve_increment * owner_count as u64
    }
}

/// Everything about the surrounding ledger a transaction's validation or
/// application needs to read, but that no handler is allowed to mutate.
#[derive(Debug, Clone)]
pub struct Environment {
    pub ledger_index: u32,
    pub parent_hash: Hash<32>,
    pub parent_close_time: i64,
    pub close_time: i64,
    pub close_time_resolution: u32,
    pub close_flags: u8,
    pub total_coins: u64,
    pub fees: FeeSchedule,
    pub amendments: Vec<Hash<32>>,
}

impl Environment {
    pub fn amendment_enabled(&self, id: &Hash<32>) -> bool {
        self.amendments.contains(id)
    }
}
