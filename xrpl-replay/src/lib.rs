//! Library half of the replay driver: fixture structs plus the `replay`/
//! `check` functions the binary wires up to a CLI (§6 "Core entry points").

pub mod error;
pub mod fixtures;
pub mod replay;

pub use error::ReplayError;
pub use fixtures::{EnvFixture, ExpectedFixture, StateFixture, TxsFixture};
pub use replay::{check, replay, ReplayResult, TxResultEntry};
