//! Strongly-typed identifiers and the [`RankList`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// World rank of one participating process.
///
/// Ranks are assigned `0..world_size` when the process group starts and
/// never change. Pelist membership is expressed in world ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub u32);

impl Rank {
    /// The rank as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Rank {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a declared process list within one context.
///
/// `PelistId(0)` is always the world pelist. Further ids are handed out
/// in local declaration order, so two ranks may hold different ids for
/// the same list. Anything that must agree across ranks uses
/// [`PelistKey`] instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PelistId(pub u32);

impl PelistId {
    /// The world pelist.
    pub const WORLD: PelistId = PelistId(0);
}

impl fmt::Display for PelistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PelistId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Rank-independent key of an ordered member list.
///
/// Computed from the members alone (64-bit FNV-1a over the count and
/// each rank), so every rank that knows a list derives the same key no
/// matter how many other lists it has declared. Message tags and
/// sequence counters are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PelistKey(pub u64);

impl PelistKey {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    /// The key of `members`, in order.
    pub fn of(members: &[Rank]) -> Self {
        let mut h = Self::OFFSET;
        let count = members.len() as u64;
        for b in count
            .to_le_bytes()
            .into_iter()
            .chain(members.iter().flat_map(|r| r.0.to_le_bytes()))
        {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        Self(h)
    }
}

impl fmt::Display for PelistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A short list of ranks.
///
/// Uses `SmallVec<[Rank; 8]>` so neighbour sets (at most eight compass
/// directions) never touch the heap.
pub type RankList = SmallVec<[Rank; 8]>;
