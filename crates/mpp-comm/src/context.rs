//! The per-rank communication context.
//!
//! [`MppContext`] replaces the process-global state of a classic MPP
//! layer: each rank owns one, and everything that used to be implicit
//! (current pelist, declared pelists, sequence counters) lives here.

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, error, info};
use mpp_core::{CommError, PelistId, PelistKey, Rank};

use crate::collective::Op;
use crate::config::CommConfig;
use crate::local::LocalUniverse;
use crate::pelist::{Pelist, ProcessList};
use crate::tag::Tag;
use crate::transport::{downcast, Transport};

/// Name of the world pelist.
pub const WORLD_NAME: &str = "world";

/// One rank's view of the process group.
pub struct MppContext {
    transport: Box<dyn Transport>,
    pelists: IndexMap<PelistId, Pelist>,
    names: IndexMap<Arc<str>, PelistId>,
    current: PelistId,
    seqs: IndexMap<PelistKey, u64>,
}

impl MppContext {
    /// Wrap a transport endpoint. The world pelist is declared implicitly
    /// and becomes current.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        let world = Pelist::world(transport.world_size());
        info!(
            "mpp context up on rank {} of {}",
            transport.rank(),
            transport.world_size()
        );
        let mut pelists = IndexMap::new();
        pelists.insert(PelistId::WORLD, world);
        let mut names = IndexMap::new();
        names.insert(Arc::from(WORLD_NAME), PelistId::WORLD);
        Self {
            transport,
            pelists,
            names,
            current: PelistId::WORLD,
            seqs: IndexMap::new(),
        }
    }

    /// A context over a one-rank universe.
    pub fn single(config: CommConfig) -> Result<Self, CommError> {
        let mut eps = LocalUniverse::new(1, config)?.into_endpoints();
        match eps.pop() {
            Some(ep) => Ok(Self::new(Box::new(ep))),
            None => Err(CommError::InvalidPelist {
                reason: "universe produced no endpoint".into(),
            }),
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    /// World rank of this process.
    pub fn rank(&self) -> Rank {
        self.transport.rank()
    }

    /// Number of ranks in the world.
    pub fn world_size(&self) -> usize {
        self.transport.world_size()
    }

    /// Number of ranks in the current pelist.
    pub fn size(&self) -> usize {
        self.get_current_pelist().len()
    }

    /// Root of the current pelist.
    pub fn root_pe(&self) -> Rank {
        self.get_current_pelist().root()
    }

    /// The world pelist.
    pub fn world(&self) -> &Pelist {
        &self.pelists[0]
    }

    /// The current pelist.
    pub fn get_current_pelist(&self) -> &Pelist {
        self.pelists
            .get(&self.current)
            .unwrap_or_else(|| self.world())
    }

    /// Look up a declared pelist by id.
    pub fn pelist(&self, id: PelistId) -> Option<&Pelist> {
        self.pelists.get(&id)
    }

    /// Look up a declared pelist by name.
    pub fn pelist_by_name(&self, name: &str) -> Option<&Pelist> {
        self.names.get(name).and_then(|id| self.pelists.get(id))
    }

    /// Look up a declared pelist by its exact ordered member list.
    pub fn pelist_by_members(&self, members: &[Rank]) -> Option<&Pelist> {
        self.pelists.values().find(|p| p.members() == members)
    }

    /// Number of declared pelists, including the world.
    pub fn pelist_count(&self) -> usize {
        self.pelists.len()
    }

    /// Whether the group has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.transport.is_aborted()
    }

    // ── Pelist management ──────────────────────────────────────────

    /// Declare a pelist. Collective over the **current** pelist: every
    /// current member calls it with the same arguments, whether or not it
    /// belongs to `members`.
    ///
    /// Re-declaring an identical member list returns the existing pelist.
    /// The returned id is local to this context; ranks that declared
    /// other lists in between may hold a different id for the same list.
    pub fn declare_pelist(
        &mut self,
        members: &[Rank],
        name: Option<&str>,
    ) -> Result<Pelist, CommError> {
        let current = self.get_current_pelist().clone();
        self.require_member(&current)?;

        let proposal = ProcessList::new(members)?;
        for r in proposal.iter() {
            if r.index() >= self.world_size() {
                return Err(CommError::InvalidRank {
                    rank: r,
                    world_size: self.world_size(),
                });
            }
        }
        if !proposal.is_subset_of(current.list()) {
            return Err(CommError::InvalidPelist {
                reason: format!("{proposal} is not a subset of current {current}"),
            });
        }
        if let Some(n) = name {
            if let Some(existing) = self.pelist_by_name(n) {
                if existing.list() != &proposal {
                    return Err(CommError::InvalidPelist {
                        reason: format!("name '{n}' already names {existing}"),
                    });
                }
            }
        }

        let mine: (Vec<Rank>, Option<String>) =
            (proposal.as_slice().to_vec(), name.map(str::to_owned));
        let all = self.gather_release(&current, Op::Declare, mine.clone())?;
        for (pos, theirs) in all.iter().enumerate() {
            if theirs != &mine {
                let err = CommError::CollectiveMismatch {
                    operation: "declare_pelist",
                    reason: format!(
                        "rank {} proposed {:?} {:?}, rank {} proposed {:?} {:?}",
                        current.members()[pos],
                        theirs.0,
                        theirs.1,
                        self.rank(),
                        mine.0,
                        mine.1
                    ),
                };
                return Err(self.escalate(err));
            }
        }

        let id = match self.pelist_by_members(proposal.as_slice()) {
            Some(p) => p.id(),
            None => {
                let id = PelistId(self.pelists.len() as u32);
                let pl = Pelist::new(id, name.map(Arc::from), proposal);
                debug!("declared {pl} on rank {}", self.rank());
                self.pelists.insert(id, pl);
                id
            }
        };
        if let Some(n) = name {
            self.names.entry(Arc::from(n)).or_insert(id);
        }
        Ok(self.pelists[&id].clone())
    }

    /// Make a declared pelist current (`None` resets to the world), then
    /// synchronize on it with a barrier.
    pub fn set_current_pelist(&mut self, members: Option<&[Rank]>) -> Result<(), CommError> {
        self.set_current_pelist_nosync(members)?;
        let current = self.get_current_pelist().clone();
        self.barrier(&current)
    }

    /// As [`set_current_pelist`](Self::set_current_pelist) without the
    /// barrier.
    pub fn set_current_pelist_nosync(&mut self, members: Option<&[Rank]>) -> Result<(), CommError> {
        let target = match members {
            None => self.world().clone(),
            Some(m) => match self.pelist_by_members(m) {
                Some(p) => p.clone(),
                None => {
                    return Err(CommError::UndeclaredPelist {
                        members: m.to_vec(),
                    })
                }
            },
        };
        self.require_member(&target)?;
        self.current = target.id();
        Ok(())
    }

    // ── Point-to-point ─────────────────────────────────────────────

    /// Hand out the tag for the next exchange on `pelist`.
    ///
    /// Every member must call this in the same order for tags to agree.
    /// Tags and counters are keyed by the member list, not the local id.
    pub fn next_tag(&mut self, pelist: &Pelist) -> Tag {
        let key = pelist.key();
        let seq = self.seqs.entry(key).or_insert(0);
        let tag = Tag::new(key, *seq, 0);
        *seq += 1;
        tag
    }

    /// Post a typed message. Fatal failures abort the group.
    pub fn send<T: Send + 'static>(&self, dest: Rank, tag: Tag, value: T) -> Result<(), CommError> {
        self.transport
            .send(dest, tag, Box::new(value))
            .map_err(|e| self.escalate(e))
    }

    /// Wait for a typed message. Fatal failures abort the group.
    pub fn recv<T: 'static>(&mut self, src: Rank, tag: Tag) -> Result<T, CommError> {
        let r = self
            .transport
            .recv(src, tag)
            .and_then(|p| downcast::<T>(p, src));
        r.map_err(|e| self.escalate(e))
    }

    /// Abort the whole group.
    pub fn abort(&self, reason: &str) {
        error!("rank {} aborting group: {reason}", self.rank());
        self.transport.abort(reason);
    }

    /// Abort the group if `err` is fatal; pass it through either way.
    pub fn escalate(&self, err: CommError) -> CommError {
        if err.severity() == mpp_core::Severity::Fatal
            && !matches!(err, CommError::Aborted { .. })
        {
            self.abort(&err.to_string());
        }
        err
    }

    pub(crate) fn require_member(&self, pelist: &Pelist) -> Result<(), CommError> {
        if pelist.contains(self.rank()) {
            Ok(())
        } else {
            Err(CommError::NotAMember {
                rank: self.rank(),
                pelist: pelist.id(),
            })
        }
    }
}

impl std::fmt::Debug for MppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MppContext")
            .field("rank", &self.rank())
            .field("world_size", &self.world_size())
            .field("current", &self.current)
            .field("pelists", &self.pelists.len())
            .finish()
    }
}
