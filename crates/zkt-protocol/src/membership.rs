//! # Group Membership Store
//!
//! One `Group` per thread: the ordered commitment list, the incremental
//! tree over it, and every root the list has produced.
//!
//! ## Root history
//!
//! A participant builds a proof off-device against the list as it was when
//! they fetched it. Later joins move the current root, so a root stays
//! valid forever once produced. The empty tree's root is never recorded:
//! no membership proof exists for an empty group.

use std::collections::{BTreeMap, HashMap, HashSet};

use zkt_core::{IdentityCommitment, MerkleRoot, ThreadId, ThreadsError};
use zkt_crypto::{FieldHasher, IncrementalMerkleTree, MembershipTree, TreeError};

/// Anonymity set of one thread.
#[derive(Debug, Clone)]
pub struct Group<H> {
    tree: IncrementalMerkleTree<H>,
    commitments: Vec<IdentityCommitment>,
    positions: HashMap<IdentityCommitment, usize>,
    root_history: Vec<MerkleRoot>,
    known_roots: HashSet<MerkleRoot>,
}

impl<H: FieldHasher> Group<H> {
    fn new(tree: IncrementalMerkleTree<H>) -> Self {
        Self {
            tree,
            commitments: Vec::new(),
            positions: HashMap::new(),
            root_history: Vec::new(),
            known_roots: HashSet::new(),
        }
    }

    /// Ordered commitments; index is leaf position.
    pub fn commitments(&self) -> &[IdentityCommitment] {
        &self.commitments
    }

    /// Every root produced, oldest first.
    pub fn root_history(&self) -> &[MerkleRoot] {
        &self.root_history
    }

    /// Current root, `None` while the group is empty.
    pub fn current_root(&self) -> Option<MerkleRoot> {
        self.root_history.last().copied()
    }

    pub fn is_known_root(&self, root: &MerkleRoot) -> bool {
        self.known_roots.contains(root)
    }

    pub fn member_count(&self) -> usize {
        self.commitments.len()
    }

    pub fn leaf_index_of(&self, commitment: &IdentityCommitment) -> Option<usize> {
        self.positions.get(commitment).copied()
    }

    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Append a commitment. Fails without mutation on the zero value, a
    /// duplicate or a full tree.
    fn insert(
        &mut self,
        thread_id: ThreadId,
        commitment: IdentityCommitment,
    ) -> Result<(usize, MerkleRoot), ThreadsError> {
        // Zero is the empty-leaf value.
        if commitment.is_zero() {
            return Err(ThreadsError::ZeroCommitment { thread_id });
        }
        if self.positions.contains_key(&commitment) {
            return Err(ThreadsError::DuplicateCommitment {
                thread_id,
                commitment,
            });
        }
        let root = self.tree.insert(commitment).map_err(|e| match e {
            TreeError::Full { capacity } => ThreadsError::GroupFull {
                thread_id,
                capacity,
            },
            other => ThreadsError::InvalidConfig(other.to_string()),
        })?;

        let leaf_index = self.commitments.len();
        self.commitments.push(commitment);
        self.positions.insert(commitment, leaf_index);
        self.root_history.push(root);
        self.known_roots.insert(root);
        Ok((leaf_index, root))
    }
}

/// All groups, keyed by thread.
#[derive(Debug, Clone)]
pub struct GroupMembershipStore<H> {
    empty_tree: IncrementalMerkleTree<H>,
    groups: BTreeMap<ThreadId, Group<H>>,
}

impl<H: FieldHasher + Clone> GroupMembershipStore<H> {
    /// Store whose groups use trees of `depth`.
    pub fn new(hasher: H, depth: u32) -> Result<Self, ThreadsError> {
        let empty_tree = IncrementalMerkleTree::new(hasher, depth)
            .map_err(|e| ThreadsError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            empty_tree,
            groups: BTreeMap::new(),
        })
    }

    /// Tree depth shared by every group.
    pub fn depth(&self) -> u32 {
        self.empty_tree.depth()
    }

    /// Open an empty group. An existing group is left as is.
    pub fn create_group(&mut self, thread_id: ThreadId) {
        self.groups
            .entry(thread_id)
            .or_insert_with(|| Group::new(self.empty_tree.clone()));
    }

    pub fn group(&self, thread_id: ThreadId) -> Option<&Group<H>> {
        self.groups.get(&thread_id)
    }

    fn group_mut(&mut self, thread_id: ThreadId) -> Result<&mut Group<H>, ThreadsError> {
        self.groups
            .get_mut(&thread_id)
            .ok_or(ThreadsError::ThreadNotFound { thread_id })
    }

    /// Append `commitment` to the thread's group; returns its leaf index
    /// and the new root.
    pub fn join(
        &mut self,
        thread_id: ThreadId,
        commitment: IdentityCommitment,
    ) -> Result<(usize, MerkleRoot), ThreadsError> {
        self.group_mut(thread_id)?.insert(thread_id, commitment)
    }

    /// Ordered commitments of a thread.
    pub fn list_commitments(&self, thread_id: ThreadId) -> Result<&[IdentityCommitment], ThreadsError> {
        self.group(thread_id)
            .map(Group::commitments)
            .ok_or(ThreadsError::ThreadNotFound { thread_id })
    }

    /// Whether `root` was ever produced by the thread's group.
    pub fn is_known_root(&self, thread_id: ThreadId, root: &MerkleRoot) -> bool {
        self.group(thread_id).is_some_and(|g| g.is_known_root(root))
    }

    /// Iterate groups in thread id order.
    pub fn iter(&self) -> impl Iterator<Item = (ThreadId, &Group<H>)> {
        self.groups.iter().map(|(id, g)| (*id, g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkt_crypto::Sha256FieldHasher;

    fn store(depth: u32) -> GroupMembershipStore<Sha256FieldHasher> {
        let mut s = GroupMembershipStore::new(Sha256FieldHasher, depth).unwrap();
        s.create_group(ThreadId(1));
        s
    }

    fn c(n: u64) -> IdentityCommitment {
        IdentityCommitment::from_u64(n)
    }

    #[test]
    fn test_empty_group_has_no_valid_root() {
        let s = store(4);
        let g = s.group(ThreadId(1)).unwrap();
        assert_eq!(g.current_root(), None);
        assert!(g.root_history().is_empty());
        let empty = IncrementalMerkleTree::new(Sha256FieldHasher, 4).unwrap().empty_root();
        assert!(!s.is_known_root(ThreadId(1), &empty));
    }

    #[test]
    fn test_join_assigns_positions_and_records_roots() {
        let mut s = store(4);
        let (i0, r0) = s.join(ThreadId(1), c(10)).unwrap();
        let (i1, r1) = s.join(ThreadId(1), c(11)).unwrap();
        assert_eq!((i0, i1), (0, 1));
        assert_ne!(r0, r1);
        assert!(s.is_known_root(ThreadId(1), &r0));
        assert!(s.is_known_root(ThreadId(1), &r1));
        let g = s.group(ThreadId(1)).unwrap();
        assert_eq!(g.current_root(), Some(r1));
        assert_eq!(g.leaf_index_of(&c(11)), Some(1));
        assert_eq!(s.list_commitments(ThreadId(1)).unwrap(), &[c(10), c(11)]);
    }

    #[test]
    fn test_duplicate_commitment_rejected_without_mutation() {
        let mut s = store(4);
        s.join(ThreadId(1), c(10)).unwrap();
        let err = s.join(ThreadId(1), c(10)).unwrap_err();
        assert_eq!(err.code(), "duplicate_commitment");
        assert_eq!(s.group(ThreadId(1)).unwrap().member_count(), 1);
        assert_eq!(s.group(ThreadId(1)).unwrap().root_history().len(), 1);
    }

    #[test]
    fn test_zero_commitment_rejected() {
        let mut s = store(4);
        let err = s.join(ThreadId(1), IdentityCommitment::default()).unwrap_err();
        assert_eq!(err, ThreadsError::ZeroCommitment { thread_id: ThreadId(1) });
        let g = s.group(ThreadId(1)).unwrap();
        assert_eq!(g.member_count(), 0);
        assert_eq!(g.current_root(), None);
        let empty = IncrementalMerkleTree::new(Sha256FieldHasher, 4).unwrap().empty_root();
        assert!(!s.is_known_root(ThreadId(1), &empty));
    }

    #[test]
    fn test_same_commitment_may_join_other_threads() {
        let mut s = store(4);
        s.create_group(ThreadId(2));
        s.join(ThreadId(1), c(10)).unwrap();
        assert!(s.join(ThreadId(2), c(10)).is_ok());
    }

    #[test]
    fn test_full_group() {
        let mut s = store(1);
        s.join(ThreadId(1), c(1)).unwrap();
        s.join(ThreadId(1), c(2)).unwrap();
        let err = s.join(ThreadId(1), c(3)).unwrap_err();
        assert_eq!(
            err,
            ThreadsError::GroupFull {
                thread_id: ThreadId(1),
                capacity: 2,
            }
        );
        assert_eq!(s.group(ThreadId(1)).unwrap().member_count(), 2);
    }

    #[test]
    fn test_roots_are_not_shared_across_threads() {
        let mut s = store(4);
        s.create_group(ThreadId(2));
        let (_, root) = s.join(ThreadId(1), c(1)).unwrap();
        assert!(!s.is_known_root(ThreadId(2), &root));
        assert!(!s.is_known_root(ThreadId(3), &root));
    }

    #[test]
    fn test_missing_thread() {
        let mut s = store(4);
        assert_eq!(s.join(ThreadId(9), c(1)).unwrap_err().code(), "thread_not_found");
        assert_eq!(s.list_commitments(ThreadId(9)).unwrap_err().code(), "thread_not_found");
    }

    #[test]
    fn test_invalid_depth_is_config_error() {
        let err = GroupMembershipStore::new(Sha256FieldHasher, 0).unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }
}
