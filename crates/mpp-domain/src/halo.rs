//! Halo updates driven by a domain's cached exchange plan.
//!
//! An update sends every outgoing message first (sends never block),
//! stages self-fed cells, then receives. Nothing is written into the
//! field until every receive has succeeded, so a failed update leaves
//! the halo as it was.

use std::sync::Arc;

use log::trace;
use mpp_comm::{CommError, MppContext, Tag};
use mpp_core::{DomainError, DomainResult, Extent, HaloElement, HaloWidths};

use crate::direction::Directions;
use crate::domain::Domain;
use crate::field::Field;
use crate::plan::{ExchangePlan, PlanEntry};

/// What happens to values crossing a fold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FoldSign {
    /// Copy unchanged (scalars).
    #[default]
    Keep,
    /// Negate (vector components).
    Flip,
}

/// Per-call update options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Which halo regions to fill. Default: all eight.
    pub directions: Directions,
    /// Narrower widths for this call. Default: the domain's widths.
    pub halo: Option<HaloWidths>,
    /// Fold treatment. Default: [`FoldSign::Keep`].
    pub fold_sign: FoldSign,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            directions: Directions::ALL,
            halo: None,
            fold_sign: FoldSign::Keep,
        }
    }
}

impl UpdateOptions {
    /// Restrict to `directions`.
    pub fn with_directions(mut self, directions: Directions) -> Self {
        self.directions = directions;
        self
    }

    /// Fill only `halo` cells deep.
    pub fn with_halo(mut self, halo: HaloWidths) -> Self {
        self.halo = Some(halo);
        self
    }

    /// Fold treatment.
    pub fn with_fold_sign(mut self, fold_sign: FoldSign) -> Self {
        self.fold_sign = fold_sign;
        self
    }

    /// Resolve the widths for this call against the domain's own.
    pub fn validate(&self, domain_halo: &HaloWidths) -> DomainResult<HaloWidths> {
        let Some(h) = self.halo else {
            return Ok(*domain_halo);
        };
        if let Some((side, width)) = h.first_negative() {
            return Err(DomainError::InvalidHalo { side, width });
        }
        let wider = [
            ("west", h.west, domain_halo.west),
            ("east", h.east, domain_halo.east),
            ("south", h.south, domain_halo.south),
            ("north", h.north, domain_halo.north),
        ]
        .into_iter()
        .find(|&(_, want, have)| want > have);
        match wider {
            Some((side, width, _)) => Err(DomainError::InvalidHalo { side, width }),
            None => Ok(h),
        }
    }
}

/// An update whose messages are posted but not yet received.
///
/// Finish it with [`PendingUpdate::complete`] on the same field. Dropping
/// it without completing leaves messages parked on the peers' side.
#[must_use = "a pending update does nothing until completed"]
#[derive(Debug)]
pub struct PendingUpdate<T: HaloElement> {
    plan: Arc<ExchangePlan>,
    tag: Tag,
    memory: Extent,
    nz: usize,
    directions: Directions,
    widths: HaloWidths,
    flip: bool,
    local: Vec<(PlanEntry, Vec<T>)>,
}

/// Fill `field`'s halo from its neighbours.
///
/// Every rank of the domain's pelist must call this in the same order.
/// Shape and width problems are reported before any message is sent.
pub fn update_halo<T: HaloElement>(
    ctx: &mut MppContext,
    domain: &Domain,
    field: &mut Field<T>,
    opts: &UpdateOptions,
) -> DomainResult<()> {
    start_update(ctx, domain, field, opts)?.complete(ctx, field)
}

/// Update the two components of a vector field. Values crossing a fold
/// change sign in both.
pub fn update_halo_pair<T: HaloElement>(
    ctx: &mut MppContext,
    domain: &Domain,
    u: &mut Field<T>,
    v: &mut Field<T>,
    opts: &UpdateOptions,
) -> DomainResult<()> {
    let opts = opts.with_fold_sign(FoldSign::Flip);
    check_shape(domain, v)?;
    let pu = start_update(ctx, domain, u, &opts)?;
    let pv = start_update(ctx, domain, v, &opts)?;
    pu.complete(ctx, u)?;
    pv.complete(ctx, v)
}

/// Post this rank's sends and stage its self-fed cells.
pub fn start_update<T: HaloElement>(
    ctx: &mut MppContext,
    domain: &Domain,
    field: &Field<T>,
    opts: &UpdateOptions,
) -> DomainResult<PendingUpdate<T>> {
    let memory = check_shape(domain, field)?;
    let widths = opts.validate(&domain.halo())?;
    let plan = domain.shared_plan();
    let directions = opts.directions;
    let nz = field.nz();

    let tag = ctx.next_tag(domain.pelist()).with_slot(Tag::HALO);
    for peer in plan.send() {
        let selected: Vec<&PlanEntry> = peer
            .entries
            .iter()
            .filter(|e| e.selected(directions, &widths))
            .collect();
        if selected.is_empty() {
            continue;
        }
        let mut buf = Vec::with_capacity(selected.len() * nz);
        for k in 0..nz {
            buf.extend(selected.iter().map(|e| read(field, e.src, k)));
        }
        ctx.send(peer.peer, tag, buf)?;
    }

    let local = plan
        .local()
        .iter()
        .filter(|e| e.selected(directions, &widths))
        .map(|e| (*e, (0..nz).map(|k| read(field, e.src, k)).collect()))
        .collect();

    Ok(PendingUpdate {
        plan,
        tag,
        memory,
        nz,
        directions,
        widths,
        flip: opts.fold_sign == FoldSign::Flip,
        local,
    })
}

impl<T: HaloElement> PendingUpdate<T> {
    /// Receive every incoming message, then write the halo.
    pub fn complete(self, ctx: &mut MppContext, field: &mut Field<T>) -> DomainResult<()> {
        if field.extent() != self.memory || field.nz() != self.nz {
            return Err(DomainError::ShapeMismatch {
                expected: self.memory,
                actual: field.extent(),
                expected_levels: Some(self.nz),
                actual_levels: field.nz(),
            });
        }

        let mut received: Vec<(Vec<&PlanEntry>, Vec<T>)> = Vec::with_capacity(self.plan.recv().len());
        for peer in self.plan.recv() {
            let selected: Vec<&PlanEntry> = peer
                .entries
                .iter()
                .filter(|e| e.selected(self.directions, &self.widths))
                .collect();
            if selected.is_empty() {
                continue;
            }
            let buf: Vec<T> = ctx.recv(peer.peer, self.tag)?;
            if buf.len() != selected.len() * self.nz {
                let err = CommError::CollectiveMismatch {
                    operation: "update_halo",
                    reason: format!(
                        "rank {} sent {} values, expected {}",
                        peer.peer,
                        buf.len(),
                        selected.len() * self.nz
                    ),
                };
                return Err(ctx.escalate(err).into());
            }
            received.push((selected, buf));
        }

        for (e, values) in &self.local {
            for (k, &v) in values.iter().enumerate() {
                field.set(e.dst.0, e.dst.1, k, self.sign(e, v));
            }
        }
        for (entries, buf) in &received {
            let mut values = buf.iter().copied();
            for k in 0..self.nz {
                for e in entries {
                    if let Some(v) = values.next() {
                        field.set(e.dst.0, e.dst.1, k, self.sign(e, v));
                    }
                }
            }
        }
        trace!(
            "halo update seq {} done: {} local cells, {} messages",
            self.tag.seq,
            self.local.len(),
            received.len()
        );
        Ok(())
    }

    fn sign(&self, e: &PlanEntry, v: T) -> T {
        if self.flip && e.folded {
            v.negate()
        } else {
            v
        }
    }
}

fn check_shape<T: HaloElement>(domain: &Domain, field: &Field<T>) -> DomainResult<Extent> {
    let memory = domain.memory_domain()?;
    if field.extent() != memory {
        return Err(DomainError::ShapeMismatch {
            expected: memory,
            actual: field.extent(),
            expected_levels: None,
            actual_levels: field.nz(),
        });
    }
    Ok(memory)
}

/// Source cells lie in the compute domain; an override can move them out
/// of the buffer, in which case they read as zero.
fn read<T: HaloElement>(field: &Field<T>, (i, j): (i32, i32), k: usize) -> T {
    field.get(i, j, k).unwrap_or_default()
}
