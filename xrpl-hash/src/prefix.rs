/// Four-byte, null-terminated domain-separation tags prepended before
/// hashing (§4.1). These values are part of the wire contract: changing one
/// changes every hash downstream of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HashPrefix {
    /// Transaction ID: `sha512_half(TransactionID || tx_blob)`.
    TransactionId,
    /// Inner node of the transaction tree.
    TxNode,
    /// Leaf node of the state (account) tree.
    LeafNode,
    /// Inner node of the state (account) tree.
    InnerNode,
    /// Ledger header hash.
    Ledger,
    /// Single-signature signing hash.
    TxSign,
    /// Multi-signature signing hash.
    TxMultiSign,
}

impl HashPrefix {
    /// The four raw bytes prepended before hashing, e.g. `b"TXN\0"`.
    pub const fn as_bytes(self) -> [u8; 4] {
        match self {
            HashPrefix::TransactionId => *b"TXN\0",
            HashPrefix::TxNode => *b"SND\0",
            HashPrefix::LeafNode => *b"MLN\0",
            HashPrefix::InnerNode => *b"MIN\0",
            HashPrefix::Ledger => *b"LWR\0",
            HashPrefix::TxSign => *b"STX\0",
            HashPrefix::TxMultiSign => *b"SMT\0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha512_half;

    // P2: hash-prefix domain separation.
    #[test]
    fn prefixes_are_pairwise_distinct_over_the_same_body() {
        let body = b"identical payload";
        let prefixes = [
            HashPrefix::TransactionId,
            HashPrefix::TxNode,
            HashPrefix::LeafNode,
            HashPrefix::InnerNode,
            HashPrefix::Ledger,
            HashPrefix::TxSign,
            HashPrefix::TxMultiSign,
        ];

        let mut hashes = Vec::new();
        for prefix in prefixes {
            let mut buf = prefix.as_bytes().to_vec();
            buf.extend_from_slice(body);
            hashes.push(sha512_half(&buf));
        }

        for i in 0..hashes.len() {
            for j in (i + 1)..hashes.len() {
                assert_ne!(hashes[i], hashes[j], "prefixes {i} and {j} collided");
            }
        }
    }
}
