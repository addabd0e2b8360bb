use std::collections::HashMap;

use xrpl_hash::Hash;

use crate::node::Node;

/// Caller-supplied content-addressed node storage: the tree never picks a
/// backend itself, it only asks this trait to remember and recall nodes by
/// hash. Persistent storage backends are out of scope for this crate.
pub trait NodeStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, hash: &Hash<32>) -> Result<Option<Node>, Self::Error>;
    fn put(&mut self, hash: Hash<32>, node: Node) -> Result<(), Self::Error>;
}

/// An in-memory [`NodeStore`], useful for tests and for the replay tool
/// when a fixture's pre-state is small enough to hold entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemNodeStore {
    nodes: HashMap<Hash<32>, Node>,
}

impl MemNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeStore for MemNodeStore {
    type Error = std::convert::Infallible;

    fn get(&self, hash: &Hash<32>) -> Result<Option<Node>, Self::Error> {
        Ok(self.nodes.get(hash).cloned())
    }

    fn put(&mut self, hash: Hash<32>, node: Node) -> Result<(), Self::Error> {
        self.nodes.insert(hash, node);
        Ok(())
    }
}
