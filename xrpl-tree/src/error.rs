use thiserror::Error;

/// Failures walking or mutating a [`crate::map::StateMap`].
#[derive(Debug, Error)]
pub enum Error<E: std::error::Error + 'static> {
    #[error("node store error: {0}")]
    Store(#[source] E),

    #[error("tree is corrupt: expected an inner node at depth {depth}, found a leaf")]
    ExpectedInner { depth: usize },

    #[error("tree is corrupt: a hash pointer does not resolve to any stored node")]
    DanglingPointer,
}
