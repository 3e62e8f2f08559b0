//! Ordered process lists.

use std::fmt;
use std::sync::Arc;

use mpp_core::{CommError, PelistId, PelistKey, Rank};

/// An ordered, duplicate-free, non-empty list of world ranks.
///
/// Order is significant: position 0 is the root, and domain partitions
/// assign divisions to ranks in list order. Cloning is cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessList(Arc<[Rank]>);

impl ProcessList {
    /// Build from a rank slice, rejecting empty lists and duplicates.
    pub fn new(ranks: &[Rank]) -> Result<Self, CommError> {
        if ranks.is_empty() {
            return Err(CommError::InvalidPelist {
                reason: "pelist is empty".into(),
            });
        }
        for (n, r) in ranks.iter().enumerate() {
            if ranks[..n].contains(r) {
                return Err(CommError::InvalidPelist {
                    reason: format!("rank {r} listed more than once"),
                });
            }
        }
        Ok(Self(ranks.into()))
    }

    /// The world list `0..n`.
    pub fn world(n: usize) -> Self {
        Self((0..n as u32).map(Rank).collect())
    }

    /// Number of ranks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of `rank` in the list.
    pub fn position(&self, rank: Rank) -> Option<usize> {
        self.0.iter().position(|&r| r == rank)
    }

    /// Whether `rank` is a member.
    pub fn contains(&self, rank: Rank) -> bool {
        self.0.contains(&rank)
    }

    /// Iterate members in order.
    pub fn iter(&self) -> impl Iterator<Item = Rank> + '_ {
        self.0.iter().copied()
    }

    /// The first member.
    pub fn root(&self) -> Rank {
        self.0[0]
    }

    /// Members as a slice.
    pub fn as_slice(&self) -> &[Rank] {
        &self.0
    }

    /// Rank-independent key of this exact member order.
    pub fn key(&self) -> PelistKey {
        PelistKey::of(&self.0)
    }

    /// Whether every member of `self` is also in `other`.
    pub fn is_subset_of(&self, other: &ProcessList) -> bool {
        self.iter().all(|r| other.contains(r))
    }
}

impl fmt::Display for ProcessList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (n, r) in self.0.iter().enumerate() {
            if n > 0 {
                write!(f, ",")?;
            }
            write!(f, "{r}")?;
        }
        write!(f, "]")
    }
}

/// A declared process list: its id, optional name and members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pelist {
    id: PelistId,
    name: Option<Arc<str>>,
    list: ProcessList,
}

impl Pelist {
    pub(crate) fn new(id: PelistId, name: Option<Arc<str>>, list: ProcessList) -> Self {
        Self { id, name, list }
    }

    /// The world pelist of an `n`-rank group, as every context declares it.
    pub fn world(n: usize) -> Self {
        Self::new(
            PelistId::WORLD,
            Some(Arc::from(crate::context::WORLD_NAME)),
            ProcessList::world(n),
        )
    }

    /// Context-local id. Not comparable across ranks.
    pub fn id(&self) -> PelistId {
        self.id
    }

    /// Key shared by every rank that declared these members.
    pub fn key(&self) -> PelistKey {
        self.list.key()
    }

    /// Name given at declaration, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The member list.
    pub fn list(&self) -> &ProcessList {
        &self.list
    }

    /// Members as a slice.
    pub fn members(&self) -> &[Rank] {
        self.list.as_slice()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Whether `rank` is a member.
    pub fn contains(&self, rank: Rank) -> bool {
        self.list.contains(rank)
    }

    /// Position of `rank` in the list.
    pub fn position(&self, rank: Rank) -> Option<usize> {
        self.list.position(rank)
    }

    /// Root (first member).
    pub fn root(&self) -> Rank {
        self.list.root()
    }
}

impl fmt::Display for Pelist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(n) => write!(f, "pelist {} '{}' {}", self.id, n, self.list),
            None => write!(f, "pelist {} {}", self.id, self.list),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(v: &[u32]) -> Vec<Rank> {
        v.iter().copied().map(Rank).collect()
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(matches!(
            ProcessList::new(&[]),
            Err(CommError::InvalidPelist { .. })
        ));
        assert!(matches!(
            ProcessList::new(&ranks(&[1, 2, 1])),
            Err(CommError::InvalidPelist { .. })
        ));
    }

    #[test]
    fn order_is_preserved() {
        let l = ProcessList::new(&ranks(&[3, 0, 2])).unwrap();
        assert_eq!(l.root(), Rank(3));
        assert_eq!(l.position(Rank(2)), Some(2));
        assert_eq!(l.position(Rank(1)), None);
        assert_eq!(l.to_string(), "[3,0,2]");
    }

    #[test]
    fn subset_check() {
        let world = ProcessList::world(4);
        let sub = ProcessList::new(&ranks(&[2, 1])).unwrap();
        assert!(sub.is_subset_of(&world));
        assert!(!world.is_subset_of(&sub));
    }
}
