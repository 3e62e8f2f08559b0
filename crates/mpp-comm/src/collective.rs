//! Collectives over an explicit pelist.
//!
//! Every collective gathers at the pelist root and redistributes from
//! there, so results are identical on every member and independent of
//! arrival order. Reductions fold in pelist order.

use std::ops::Add;

use mpp_core::{CommError, Rank};

use crate::context::MppContext;
use crate::pelist::Pelist;

/// Collective kinds. Each gets its own tag slots so that members entering
/// different collectives at the same sequence number never match each
/// other's messages; they time out instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Barrier = 1,
    Broadcast = 2,
    AllGather = 3,
    Sum = 4,
    Max = 5,
    Min = 6,
    Declare = 7,
}

impl Op {
    fn gather_slot(self) -> u32 {
        (self as u32) << 1
    }

    fn release_slot(self) -> u32 {
        ((self as u32) << 1) | 1
    }
}

impl MppContext {
    /// Gather one value from every member at the root, then hand the full
    /// list (in pelist order) back to every member.
    pub(crate) fn gather_release<T>(
        &mut self,
        pelist: &Pelist,
        op: Op,
        value: T,
    ) -> Result<Vec<T>, CommError>
    where
        T: Clone + Send + 'static,
    {
        self.require_member(pelist)?;
        let tag = self.next_tag(pelist);
        let gather = tag.with_slot(op.gather_slot());
        let release = tag.with_slot(op.release_slot());
        let me = self.rank();
        let root = pelist.root();

        if me == root {
            let mut all = Vec::with_capacity(pelist.len());
            all.push(value);
            for &r in &pelist.members()[1..] {
                all.push(self.recv::<T>(r, gather)?);
            }
            for &r in &pelist.members()[1..] {
                self.send(r, release, all.clone())?;
            }
            Ok(all)
        } else {
            self.send(root, gather, value)?;
            self.recv::<Vec<T>>(root, release)
        }
    }

    /// Block until every member of `pelist` has entered the barrier.
    pub fn barrier(&mut self, pelist: &Pelist) -> Result<(), CommError> {
        self.gather_release(pelist, Op::Barrier, ()).map(|_| ())
    }

    /// Copy `value` from member `from` to every other member, in place.
    pub fn broadcast<T>(&mut self, pelist: &Pelist, from: Rank, value: &mut T) -> Result<(), CommError>
    where
        T: Clone + Send + 'static,
    {
        self.require_member(pelist)?;
        if !pelist.contains(from) {
            return Err(CommError::NotAMember {
                rank: from,
                pelist: pelist.id(),
            });
        }
        let tag = self.next_tag(pelist).with_slot(Op::Broadcast.release_slot());
        if self.rank() == from {
            for r in pelist.members().iter().copied().filter(|&r| r != from) {
                self.send(r, tag, value.clone())?;
            }
        } else {
            *value = self.recv::<T>(from, tag)?;
        }
        Ok(())
    }

    /// Every member's value, in pelist order, on every member.
    pub fn all_gather<T>(&mut self, pelist: &Pelist, value: T) -> Result<Vec<T>, CommError>
    where
        T: Clone + Send + 'static,
    {
        self.gather_release(pelist, Op::AllGather, value)
    }

    /// Sum over all members.
    pub fn sum<T>(&mut self, pelist: &Pelist, value: T) -> Result<T, CommError>
    where
        T: Copy + Send + Add<Output = T> + 'static,
    {
        self.reduce(pelist, Op::Sum, value, |a, b| a + b)
    }

    /// Maximum over all members.
    pub fn max<T>(&mut self, pelist: &Pelist, value: T) -> Result<T, CommError>
    where
        T: Copy + Send + PartialOrd + 'static,
    {
        self.reduce(pelist, Op::Max, value, |a, b| if b > a { b } else { a })
    }

    /// Minimum over all members.
    pub fn min<T>(&mut self, pelist: &Pelist, value: T) -> Result<T, CommError>
    where
        T: Copy + Send + PartialOrd + 'static,
    {
        self.reduce(pelist, Op::Min, value, |a, b| if b < a { b } else { a })
    }

    fn reduce<T, F>(&mut self, pelist: &Pelist, op: Op, value: T, f: F) -> Result<T, CommError>
    where
        T: Copy + Send + 'static,
        F: Fn(T, T) -> T,
    {
        let all = self.gather_release(pelist, op, value)?;
        let mut it = all.into_iter();
        let first = it.next().unwrap_or(value);
        Ok(it.fold(first, f))
    }
}
