//! A defined decomposition: partition, local record and cached plan.

use std::sync::Arc;

use log::{debug, warn};
use mpp_comm::{MppContext, Pelist};
use mpp_core::{
    DomainError, DomainResult, Extent, HaloElement, HaloWidths, Layout, Rank, RankList,
    XBoundary, YBoundary,
};

use crate::direction::Direction;
use crate::field::Field;
use crate::partition::{balanced_split, Partition};
use crate::plan::ExchangePlan;
use crate::spec::{DomainSpec, Mosaic};
use crate::topology::Topology;

/// What one rank owns of a domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalDomain {
    /// Division `(dx, dy)` in the layout grid.
    pub division: (usize, usize),
    /// Cells this rank computes.
    pub compute: Extent,
    /// Compute domain plus halo.
    pub data: Extent,
    /// Allocated buffer extent; at least the data domain.
    pub memory: Extent,
}

/// Ranks adjacent to a compute domain, per compass direction.
///
/// Derived from the exchange plan: a rank is a neighbour in a direction
/// if it feeds at least one halo cell there. A rank fed from its own
/// compute domain (a cyclic wrap onto itself) lists itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    by_direction: [RankList; 8],
}

impl Neighbors {
    /// Ranks feeding halo cells in direction `d`.
    pub fn get(&self, d: Direction) -> &[Rank] {
        &self.by_direction[d.index()]
    }

    /// Every `(direction, ranks)` pair with at least one rank.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &[Rank])> + '_ {
        Direction::ALL
            .into_iter()
            .map(|d| (d, self.get(d)))
            .filter(|(_, r)| !r.is_empty())
    }

    /// Distinct neighbour ranks, in first-seen order.
    pub fn all(&self) -> RankList {
        let mut out = RankList::new();
        for r in self.by_direction.iter().flatten() {
            if !out.contains(r) {
                out.push(*r);
            }
        }
        out
    }

    fn add(&mut self, d: Direction, r: Rank) {
        let list = &mut self.by_direction[d.index()];
        if !list.contains(&r) {
            list.push(r);
        }
    }
}

/// A 2-D domain decomposed over a pelist, as seen from one rank.
///
/// Every rank on the pelist holds an identical partition and its own
/// local record. Ranks off the pelist hold the partition only; their
/// per-rank queries fail with [`DomainError::NotOnPelist`].
#[derive(Clone, Debug)]
pub struct Domain {
    name: String,
    rank: Rank,
    topology: Topology,
    layout: Layout,
    pelist: Pelist,
    halo: HaloWidths,
    partition: Partition,
    local: Option<LocalDomain>,
    memory_size: Option<(i32, i32)>,
    mosaic: Option<Mosaic>,
    plan: Arc<ExchangePlan>,
}

/// Define a domain on the calling rank.
///
/// The pelist defaults to the context's current pelist. No messages are
/// exchanged: every member computes the same partition from the same
/// spec.
pub fn define_domain(ctx: &MppContext, spec: &DomainSpec) -> DomainResult<Domain> {
    let pelist = match &spec.pelist {
        Some(p) => p.clone(),
        None => ctx.get_current_pelist().clone(),
    };
    Domain::define_for(spec, pelist, ctx.rank())
}

impl Domain {
    /// Build `rank`'s view of the domain described by `spec` over
    /// `pelist`.
    ///
    /// This is the whole of [`define_domain`] minus the context lookup;
    /// it is public so one process can construct any rank's view.
    pub fn define_for(spec: &DomainSpec, pelist: Pelist, rank: Rank) -> DomainResult<Self> {
        spec.validate()?;
        let active = spec.active_divisions();
        if active != pelist.len() {
            return Err(DomainError::LayoutMismatch {
                layout: spec.layout,
                active,
                pelist_len: pelist.len(),
            });
        }

        let layout = spec.layout;
        let x_sizes = spec
            .x_extent
            .clone()
            .unwrap_or_else(|| balanced_split(spec.global.x_len(), layout.x as usize));
        let y_sizes = spec
            .y_extent
            .clone()
            .unwrap_or_else(|| balanced_split(spec.global.y_len(), layout.y as usize));

        let mut members = pelist.members().iter().copied();
        let owners: Vec<Option<Rank>> = (0..layout.ndivs())
            .map(|n| match &spec.mask {
                Some(m) if !m[n] => None,
                _ => members.next(),
            })
            .collect();

        let partition = Partition::new(spec.global, layout, x_sizes, y_sizes, owners);
        let topology = Topology {
            global: spec.global,
            x_boundary: spec.x_boundary,
            y_boundary: spec.y_boundary,
            cyclic_offset: spec.cyclic_offset,
        };

        let local = partition.division_of_rank(rank).map(|(dx, dy)| {
            let compute = partition.extent(dx, dy);
            let data = topology.data_domain(&compute, &spec.halo);
            LocalDomain {
                division: (dx, dy),
                compute,
                data,
                memory: memory_extent(&data, spec.memory_size),
            }
        });

        let plan = ExchangePlan::build(local.map(|_| rank), &topology, &partition, &spec.halo);
        debug!(
            "domain '{}': global {} layout {} on pelist {} ({} active), rank {rank} {}",
            spec.name,
            spec.global,
            layout,
            pelist.id(),
            active,
            match &local {
                Some(l) => format!("computes {}", l.compute),
                None => "owns nothing".to_string(),
            }
        );

        Ok(Self {
            name: spec.name.clone(),
            rank,
            topology,
            layout,
            pelist,
            halo: spec.halo,
            partition,
            local,
            memory_size: spec.memory_size,
            mosaic: spec.mosaic,
            plan: Arc::new(plan),
        })
    }

    // ── Global queries ─────────────────────────────────────────────

    /// Label given at definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Global extent.
    pub fn global_domain(&self) -> Extent {
        self.topology.global
    }

    /// Division layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Pelist the domain is spread over.
    pub fn pelist(&self) -> &Pelist {
        &self.pelist
    }

    /// Halo widths.
    pub fn halo(&self) -> HaloWidths {
        self.halo
    }

    /// West/east edge behaviour.
    pub fn x_boundary(&self) -> XBoundary {
        self.topology.x_boundary
    }

    /// South/north edge behaviour.
    pub fn y_boundary(&self) -> YBoundary {
        self.topology.y_boundary
    }

    /// Cyclic shifts.
    pub fn cyclic_offset(&self) -> (i32, i32) {
        self.topology.cyclic_offset
    }

    /// Every division's compute extent and owner, row-major, x fastest.
    pub fn compute_extents(&self) -> Vec<(Extent, Option<Rank>)> {
        self.partition.divisions().collect()
    }

    /// Cells per x division.
    pub fn x_extent(&self) -> &[i32] {
        self.partition.x_sizes()
    }

    /// Cells per y division.
    pub fn y_extent(&self) -> &[i32] {
        self.partition.y_sizes()
    }

    /// Rank computing global cell `(i, j)`.
    pub fn owner_of(&self, i: i32, j: i32) -> Option<Rank> {
        self.partition.owner_of(i, j)
    }

    /// Mosaic tile id; 0 for a standalone domain.
    pub fn tile_id(&self) -> u32 {
        self.mosaic.map_or(0, |m| m.tile_id)
    }

    /// Tiles in the mosaic; 1 for a standalone domain.
    pub fn tile_count(&self) -> u32 {
        self.mosaic.map_or(1, |m| m.tile_count)
    }

    /// Whether the domain is a tile of a mosaic.
    pub fn is_mosaic(&self) -> bool {
        self.mosaic.is_some()
    }

    /// Mosaic linkage as given.
    pub fn mosaic(&self) -> Option<Mosaic> {
        self.mosaic
    }

    /// The rank this view belongs to.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// `true` if the viewing rank computes part of the domain.
    pub fn is_local(&self) -> bool {
        self.local.is_some()
    }

    /// The cached exchange plan.
    pub fn plan(&self) -> &ExchangePlan {
        &self.plan
    }

    /// Global extent plus edge behaviour.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub(crate) fn shared_plan(&self) -> Arc<ExchangePlan> {
        Arc::clone(&self.plan)
    }

    // ── Local queries ──────────────────────────────────────────────

    /// The viewing rank's record.
    pub fn local(&self) -> DomainResult<&LocalDomain> {
        self.local
            .as_ref()
            .ok_or(DomainError::NotOnPelist { rank: self.rank })
    }

    /// Cells this rank computes.
    pub fn compute_domain(&self) -> DomainResult<Extent> {
        self.local().map(|l| l.compute)
    }

    /// Compute domain plus halo.
    pub fn data_domain(&self) -> DomainResult<Extent> {
        self.local().map(|l| l.data)
    }

    /// Extent a field buffer must cover.
    pub fn memory_domain(&self) -> DomainResult<Extent> {
        self.local().map(|l| l.memory)
    }

    /// Ranks feeding this rank's halo, by direction.
    pub fn neighbors(&self) -> DomainResult<Neighbors> {
        self.local()?;
        let mut n = Neighbors::default();
        for peer in self.plan.recv() {
            for e in &peer.entries {
                n.add(e.direction, peer.peer);
            }
        }
        for e in self.plan.local() {
            n.add(e.direction, self.rank);
        }
        Ok(n)
    }

    /// A zeroed field over the memory domain.
    pub fn new_field<T: HaloElement>(&self, nz: usize) -> DomainResult<Field<T>> {
        Ok(Field::new(self.memory_domain()?, nz))
    }

    // ── Overrides ──────────────────────────────────────────────────
    //
    // These bypass the partition invariant. The cached plan keeps
    // describing the original decomposition.

    /// Replace this rank's compute domain.
    pub fn set_compute_domain(&mut self, compute: Extent) -> DomainResult<()> {
        let rank = self.rank;
        let local = self.local.as_mut().ok_or(DomainError::NotOnPelist { rank })?;
        warn!(
            "domain '{}': rank {rank} compute domain overridden {} -> {compute}",
            self.name, local.compute
        );
        local.compute = compute;
        Ok(())
    }

    /// Replace this rank's data domain; the memory domain follows.
    pub fn set_data_domain(&mut self, data: Extent) -> DomainResult<()> {
        let rank = self.rank;
        let local = self.local.as_mut().ok_or(DomainError::NotOnPelist { rank })?;
        warn!(
            "domain '{}': rank {rank} data domain overridden {} -> {data}",
            self.name, local.data
        );
        local.data = data;
        local.memory = memory_extent(&data, self.memory_size);
        Ok(())
    }

    /// Replace the global extent.
    pub fn set_global_domain(&mut self, global: Extent) -> DomainResult<()> {
        if global.is_degenerate() {
            return Err(DomainError::DegenerateExtent { extent: global });
        }
        warn!(
            "domain '{}': global domain overridden {} -> {global}",
            self.name, self.topology.global
        );
        self.topology.global = global;
        Ok(())
    }
}

/// Grow `data` on its high side to at least `size` cells per axis.
fn memory_extent(data: &Extent, size: Option<(i32, i32)>) -> Extent {
    let Some((mx, my)) = size else { return *data };
    let mut m = *data;
    if mx as usize > data.x_len() {
        m.x_end = m.x_begin + mx - 1;
    }
    if my as usize > data.y_len() {
        m.y_end = m.y_begin + my - 1;
    }
    m
}
