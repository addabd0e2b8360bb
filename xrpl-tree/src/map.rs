use xrpl_hash::Hash;

use crate::{
    error::Error,
    node::{nibble_at, InnerNode, LeafKind, LeafNode, Node, TreeKey, DEPTH},
    store::NodeStore,
};

/// An authenticated 16-ary radix tree over 256-bit keys (§4.4), backed by a
/// caller-supplied [`NodeStore`]. `root_hash()` is the tree's content
/// address: two maps with the same entries always produce the same root
/// hash regardless of insertion order (P5).
///
/// A single `StateMap` is entirely one [`LeafKind`] (§3 distinguishes the
/// *state* map from the *transaction* map by leaf hash recipe, not by any
/// per-entry tag) — construct with [`StateMap::new_state`] or
/// [`StateMap::new_tx`].
pub struct StateMap<S> {
    store: S,
    root: Option<Hash<32>>,
    kind: LeafKind,
}

impl<S: NodeStore> StateMap<S> {
    /// An empty state (account) map: leaves are SLE blobs.
    pub fn new_state(store: S) -> Self {
        Self {
            store,
            root: None,
            kind: LeafKind::State,
        }
    }

    /// An empty transaction map: leaves are tx+metadata blobs.
    pub fn new_tx(store: S) -> Self {
        Self {
            store,
            root: None,
            kind: LeafKind::Transaction,
        }
    }

    /// A map whose root is already known to exist in `store` — used to
    /// resume from an immutable pre-state (§2 SYSTEM OVERVIEW).
    pub fn with_root(store: S, root: Hash<32>, kind: LeafKind) -> Self {
        Self {
            store,
            root: Some(root),
            kind,
        }
    }

    /// The tree's current root hash; the all-zero hash for an empty tree
    /// (P3).
    pub fn root_hash(&self) -> Hash<32> {
        self.root.unwrap_or(Hash::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn get(&self, key: &TreeKey) -> Result<Option<Vec<u8>>, Error<S::Error>> {
        get_rec(&self.store, self.root, 0, key)
    }

    pub fn put(&mut self, key: TreeKey, data: Vec<u8>) -> Result<(), Error<S::Error>> {
        let new_root = put_rec(&mut self.store, self.root, 0, key, data, self.kind)?;
        self.root = Some(new_root);
        Ok(())
    }

    /// Remove `key`, returning whether it was present. An empty resulting
    /// subtree collapses upward so repeated insert/erase of the same keys
    /// always returns the tree to the same (empty) root (P4).
    pub fn erase(&mut self, key: &TreeKey) -> Result<bool, Error<S::Error>> {
        let (new_root, removed) = erase_rec(&mut self.store, self.root, 0, key)?;
        self.root = new_root;
        Ok(removed)
    }

    /// Visit every `(key, data)` pair in deterministic depth-first order,
    /// descending child slots 0..16 ascending at each level (§4.4).
    pub fn for_each(
        &self,
        mut visit: impl FnMut(&TreeKey, &[u8]),
    ) -> Result<(), Error<S::Error>> {
        for_each_rec(&self.store, self.root, &mut visit)
    }
}

impl<S: NodeStore + Clone> StateMap<S> {
    /// A lightweight, independent view of the tree at its current root.
    /// Because nodes are content-addressed, this is structural sharing:
    /// mutating the snapshot never touches nodes the original still needs.
    pub fn snapshot(&self) -> Self {
        Self {
            store: self.store.clone(),
            root: self.root,
            kind: self.kind,
        }
    }
}

fn load_inner<S: NodeStore>(
    store: &S,
    hash: Hash<32>,
    depth: usize,
) -> Result<InnerNode, Error<S::Error>> {
    match store.get(&hash).map_err(Error::Store)? {
        Some(Node::Inner(inner)) => Ok(inner),
        Some(Node::Leaf(_)) => Err(Error::ExpectedInner { depth }),
        None => Err(Error::DanglingPointer),
    }
}

fn load_leaf<S: NodeStore>(store: &S, hash: Hash<32>) -> Result<LeafNode, Error<S::Error>> {
    match store.get(&hash).map_err(Error::Store)? {
        Some(Node::Leaf(leaf)) => Ok(leaf),
        Some(Node::Inner(_)) | None => Err(Error::DanglingPointer),
    }
}

fn get_rec<S: NodeStore>(
    store: &S,
    node: Option<Hash<32>>,
    depth: usize,
    key: &TreeKey,
) -> Result<Option<Vec<u8>>, Error<S::Error>> {
    let Some(hash) = node else {
        return Ok(None);
    };

    if depth == DEPTH {
        let leaf = load_leaf(store, hash)?;
        return Ok((leaf.key == *key).then_some(leaf.data));
    }

    let inner = load_inner(store, hash, depth)?;
    get_rec(store, inner.children[nibble_at(key, depth)], depth + 1, key)
}

fn put_rec<S: NodeStore>(
    store: &mut S,
    node: Option<Hash<32>>,
    depth: usize,
    key: TreeKey,
    data: Vec<u8>,
    kind: LeafKind,
) -> Result<Hash<32>, Error<S::Error>> {
    if depth == DEPTH {
        let leaf = LeafNode { key, data, kind };
        let hash = leaf.hash();
        store.put(hash, Node::Leaf(leaf)).map_err(Error::Store)?;
        return Ok(hash);
    }

    let mut inner = match node {
        Some(hash) => load_inner(store, hash, depth)?,
        None => InnerNode::empty(),
    };

    let slot = nibble_at(&key, depth);
    let new_child = put_rec(store, inner.children[slot], depth + 1, key, data, kind)?;
    inner.children[slot] = Some(new_child);

    let hash = inner.hash();
    store.put(hash, Node::Inner(inner)).map_err(Error::Store)?;
    Ok(hash)
}

fn erase_rec<S: NodeStore>(
    store: &mut S,
    node: Option<Hash<32>>,
    depth: usize,
    key: &TreeKey,
) -> Result<(Option<Hash<32>>, bool), Error<S::Error>> {
    let Some(hash) = node else {
        return Ok((None, false));
    };

    if depth == DEPTH {
        let leaf = load_leaf(store, hash)?;
        return if leaf.key == *key {
            Ok((None, true))
        } else {
            Ok((Some(hash), false))
        };
    }

    let mut inner = load_inner(store, hash, depth)?;
    let slot = nibble_at(key, depth);
    let (new_child, removed) = erase_rec(store, inner.children[slot], depth + 1, key)?;
    if !removed {
        return Ok((Some(hash), false));
    }

    inner.children[slot] = new_child;
    if inner.is_empty() {
        return Ok((None, true));
    }

    let new_hash = inner.hash();
    store
        .put(new_hash, Node::Inner(inner))
        .map_err(Error::Store)?;
    Ok((Some(new_hash), true))
}

fn for_each_rec<S: NodeStore>(
    store: &S,
    node: Option<Hash<32>>,
    visit: &mut impl FnMut(&TreeKey, &[u8]),
) -> Result<(), Error<S::Error>> {
    let Some(hash) = node else {
        return Ok(());
    };

    match store.get(&hash).map_err(Error::Store)?.ok_or(Error::DanglingPointer)? {
        Node::Leaf(leaf) => {
            visit(&leaf.key, &leaf.data);
            Ok(())
        }
        Node::Inner(inner) => {
            for child in inner.children {
                for_each_rec(store, child, visit)?;
            }
            Ok(())
        }
    }
}
