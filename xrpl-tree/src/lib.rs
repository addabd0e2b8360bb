//! An authenticated 16-ary radix tree over 256-bit keys (§4.4), the shared
//! shape behind both the state tree and the per-ledger transaction tree.
//! Storage is delegated entirely to a caller-supplied [`NodeStore`]; this
//! crate has no opinion on disks, databases, or caches.

pub mod error;
pub mod map;
pub mod node;
pub mod store;

pub use error::Error;
pub use map::StateMap;
pub use node::{nibble_at, InnerNode, LeafKind, LeafNode, Node, TreeKey, DEPTH, FANOUT};
pub use store::{MemNodeStore, NodeStore};
