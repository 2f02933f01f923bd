//! # Incremental Merkle Tree
//!
//! A fixed-depth binary Merkle tree filled strictly left to right. Each
//! thread's anonymity set is one tree; leaf `i` is the `i`-th commitment
//! that joined.
//!
//! ## Algorithm
//!
//! Empty subtrees are represented by precomputed zero hashes:
//! `zeros[0] = 0`, `zeros[k+1] = hash_pair(zeros[k], zeros[k])`.
//!
//! Insertion walks from the new leaf to the root. At each level a node at
//! an even index is a left child; its right sibling is still empty
//! (`zeros[level]`) and the node is remembered in `filled_subtrees[level]`.
//! A node at an odd index is a right child; its left sibling is the
//! remembered `filled_subtrees[level]`. Only `depth` nodes are stored, and
//! each insert costs `depth` hashes.
//!
//! ## Paths
//!
//! `build_path()` recomputes the sibling path for any leaf from the ordered
//! leaf list (what `list_commitments` returns). `verify_path()` folds a path
//! back to a root. Neither touches a live tree.

use thiserror::Error;

use zkt_core::{IdentityCommitment, MerkleRoot};

use crate::hasher::FieldHasher;

/// Largest supported depth (2^32 leaves).
pub const MAX_DEPTH: u32 = 32;

/// Errors from membership-tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Every leaf is occupied.
    #[error("tree is full ({capacity} leaves)")]
    Full {
        /// Number of leaves the tree holds.
        capacity: usize,
    },
    /// Depth outside `1..=32`.
    #[error("invalid tree depth {0}; must be 1..={MAX_DEPTH}")]
    InvalidDepth(u32),
    /// Requested leaf does not exist.
    #[error("leaf index {index} out of range (len {len})")]
    LeafOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves present.
        len: usize,
    },
}

/// Append-only membership structure producing a root after each insert.
pub trait MembershipTree {
    /// Append a leaf and return the new root.
    fn insert(&mut self, leaf: IdentityCommitment) -> Result<MerkleRoot, TreeError>;

    /// Current root.
    fn root(&self) -> MerkleRoot;

    /// Number of leaves inserted so far.
    fn len(&self) -> usize;

    /// Maximum number of leaves.
    fn capacity(&self) -> usize;

    /// Whether no leaf has been inserted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether another insert would fail.
    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }
}

fn zero_hashes<H: FieldHasher + ?Sized>(hasher: &H, depth: u32) -> Vec<[u8; 32]> {
    let mut zeros = Vec::with_capacity(depth as usize + 1);
    let mut current = [0u8; 32];
    zeros.push(current);
    for _ in 0..depth {
        current = hasher.hash_pair(&current, &current);
        zeros.push(current);
    }
    zeros
}

fn capacity_for(depth: u32) -> usize {
    1usize.checked_shl(depth).unwrap_or(usize::MAX)
}

fn check_depth(depth: u32) -> Result<(), TreeError> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(TreeError::InvalidDepth(depth));
    }
    Ok(())
}

/// Frontier-only incremental Merkle tree.
#[derive(Debug, Clone)]
pub struct IncrementalMerkleTree<H> {
    hasher: H,
    depth: u32,
    zeros: Vec<[u8; 32]>,
    filled_subtrees: Vec<[u8; 32]>,
    next_index: usize,
    root: [u8; 32],
}

impl<H: FieldHasher> IncrementalMerkleTree<H> {
    /// Create an empty tree of the given depth.
    pub fn new(hasher: H, depth: u32) -> Result<Self, TreeError> {
        check_depth(depth)?;
        let zeros = zero_hashes(&hasher, depth);
        let filled_subtrees = zeros[..depth as usize].to_vec();
        let root = zeros[depth as usize];
        Ok(Self {
            hasher,
            depth,
            zeros,
            filled_subtrees,
            next_index: 0,
            root,
        })
    }

    /// Tree depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Root of the tree with no leaves.
    pub fn empty_root(&self) -> MerkleRoot {
        MerkleRoot(self.zeros[self.depth as usize])
    }
}

impl<H: FieldHasher> MembershipTree for IncrementalMerkleTree<H> {
    fn insert(&mut self, leaf: IdentityCommitment) -> Result<MerkleRoot, TreeError> {
        if self.is_full() {
            return Err(TreeError::Full {
                capacity: self.capacity(),
            });
        }

        let mut index = self.next_index;
        let mut current = leaf.0;
        for level in 0..self.depth as usize {
            let (left, right) = if index % 2 == 0 {
                self.filled_subtrees[level] = current;
                (current, self.zeros[level])
            } else {
                (self.filled_subtrees[level], current)
            };
            current = self.hasher.hash_pair(&left, &right);
            index /= 2;
        }

        self.root = current;
        self.next_index += 1;
        Ok(MerkleRoot(current))
    }

    fn root(&self) -> MerkleRoot {
        MerkleRoot(self.root)
    }

    fn len(&self) -> usize {
        self.next_index
    }

    fn capacity(&self) -> usize {
        capacity_for(self.depth)
    }
}

/// Sibling path from one leaf to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerklePath {
    /// Position of the leaf.
    pub leaf_index: usize,
    /// Sibling at each level, leaf level first.
    pub siblings: Vec<[u8; 32]>,
    /// Root the path folds to.
    pub root: MerkleRoot,
}

/// Build the inclusion path for `leaves[leaf_index]` in a tree of `depth`.
pub fn build_path<H: FieldHasher + ?Sized>(
    hasher: &H,
    depth: u32,
    leaves: &[IdentityCommitment],
    leaf_index: usize,
) -> Result<MerklePath, TreeError> {
    check_depth(depth)?;
    if leaves.len() > capacity_for(depth) {
        return Err(TreeError::Full {
            capacity: capacity_for(depth),
        });
    }
    if leaf_index >= leaves.len() {
        return Err(TreeError::LeafOutOfRange {
            index: leaf_index,
            len: leaves.len(),
        });
    }

    let zeros = zero_hashes(hasher, depth);
    let mut level: Vec<[u8; 32]> = leaves.iter().map(|c| c.0).collect();
    let mut pos = leaf_index;
    let mut siblings = Vec::with_capacity(depth as usize);

    for zero in zeros.iter().take(depth as usize) {
        let sibling = level.get(pos ^ 1).copied().unwrap_or(*zero);
        siblings.push(sibling);

        let next: Vec<[u8; 32]> = level
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).copied().unwrap_or(*zero);
                hasher.hash_pair(&pair[0], &right)
            })
            .collect();
        level = next;
        pos /= 2;
    }

    let root = level.first().copied().unwrap_or(zeros[depth as usize]);
    Ok(MerklePath {
        leaf_index,
        siblings,
        root: MerkleRoot(root),
    })
}

/// Fold `leaf` up `path` and check it reaches `path.root`.
pub fn verify_path<H: FieldHasher + ?Sized>(
    hasher: &H,
    leaf: &IdentityCommitment,
    path: &MerklePath,
) -> bool {
    let mut current = leaf.0;
    let mut index = path.leaf_index;
    for sibling in &path.siblings {
        current = if index % 2 == 0 {
            hasher.hash_pair(&current, sibling)
        } else {
            hasher.hash_pair(sibling, &current)
        };
        index /= 2;
    }
    index == 0 && current == path.root.0
}
