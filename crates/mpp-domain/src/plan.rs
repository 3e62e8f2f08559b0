//! The halo exchange plan, built once when a domain is defined.
//!
//! Every rank walks every rank's halo cells in the same order and maps
//! each one to its source cell and owner. From that walk a rank keeps
//! what it receives (its own halo cells, grouped by source owner), what
//! it sends (other ranks' halo cells whose source it owns), and what it
//! copies locally (its own halo cells fed from its own compute domain).
//! Both ends of a pair see identical entry lists, so message layouts
//! agree without any negotiation.

use indexmap::IndexMap;
use log::debug;
use mpp_core::{Extent, HaloWidths, Rank};

use crate::direction::{Direction, Directions};
use crate::partition::Partition;
use crate::topology::Topology;

/// One halo cell and where it is fed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    /// Global index of the halo cell being filled.
    pub dst: (i32, i32),
    /// Global index of the compute cell that feeds it.
    pub src: (i32, i32),
    /// Position of `dst` relative to the receiver's compute domain.
    pub direction: Direction,
    /// Cells outside the receiver's compute domain along x (0 if inside).
    pub depth_x: i32,
    /// Cells outside the receiver's compute domain along y (0 if inside).
    pub depth_y: i32,
    /// Mapping crossed a fold.
    pub folded: bool,
}

impl PlanEntry {
    /// Whether the entry is selected by a direction mask and fits within
    /// the given per-side widths.
    pub fn selected(&self, dirs: Directions, halo: &HaloWidths) -> bool {
        if !dirs.contains(self.direction.flag()) {
            return false;
        }
        let (dx, dy) = direction_signs(self.direction);
        let wx = match dx {
            -1 => halo.west,
            1 => halo.east,
            _ => 0,
        };
        let wy = match dy {
            -1 => halo.south,
            1 => halo.north,
            _ => 0,
        };
        self.depth_x <= wx && self.depth_y <= wy
    }
}

fn direction_signs(d: Direction) -> (i32, i32) {
    match d {
        Direction::West => (-1, 0),
        Direction::East => (1, 0),
        Direction::South => (0, -1),
        Direction::North => (0, 1),
        Direction::SouthWest => (-1, -1),
        Direction::SouthEast => (1, -1),
        Direction::NorthWest => (-1, 1),
        Direction::NorthEast => (1, 1),
    }
}

/// Entries exchanged with one peer, in agreed order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerEntries {
    /// The other rank.
    pub peer: Rank,
    /// Entries in the receiver's walk order.
    pub entries: Vec<PlanEntry>,
}

/// One rank's cached exchange plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangePlan {
    recv: Vec<PeerEntries>,
    send: Vec<PeerEntries>,
    local: Vec<PlanEntry>,
}

impl ExchangePlan {
    /// Build the plan for `me`. An empty plan results when `me` owns no
    /// division.
    pub fn build(
        me: Option<Rank>,
        topology: &Topology,
        partition: &Partition,
        halo: &HaloWidths,
    ) -> Self {
        let Some(me) = me else {
            return Self::default();
        };
        let mut recv: IndexMap<Rank, Vec<PlanEntry>> = IndexMap::new();
        let mut send: IndexMap<Rank, Vec<PlanEntry>> = IndexMap::new();
        let mut local = Vec::new();

        for (compute, owner) in partition.divisions() {
            let Some(p) = owner else { continue };
            let data = topology.data_domain(&compute, halo);
            for (i, j) in data.iter() {
                if compute.contains(i, j) {
                    continue;
                }
                let Some(src) = topology.source_of(i, j) else {
                    continue;
                };
                let Some(q) = partition.owner_of(src.i, src.j) else {
                    continue;
                };
                if p != me && q != me {
                    continue;
                }
                let entry = entry_for(&compute, (i, j), (src.i, src.j), src.folded);
                match (p == me, q == me) {
                    (true, true) => local.push(entry),
                    (true, false) => recv.entry(q).or_default().push(entry),
                    (false, true) => send.entry(p).or_default().push(entry),
                    (false, false) => {}
                }
            }
        }

        let plan = Self {
            recv: into_peers(recv),
            send: into_peers(send),
            local,
        };
        debug!(
            "rank {me}: plan recv {} cells from {} peers, send {} cells to {} peers, {} local",
            plan.recv_count(),
            plan.recv.len(),
            plan.send_count(),
            plan.send.len(),
            plan.local.len()
        );
        plan
    }

    /// Halo cells filled by messages, grouped by source rank.
    pub fn recv(&self) -> &[PeerEntries] {
        &self.recv
    }

    /// Other ranks' halo cells this rank feeds, grouped by receiver.
    pub fn send(&self) -> &[PeerEntries] {
        &self.send
    }

    /// Halo cells fed from this rank's own compute domain.
    pub fn local(&self) -> &[PlanEntry] {
        &self.local
    }

    /// Total cells received per update.
    pub fn recv_count(&self) -> usize {
        self.recv.iter().map(|p| p.entries.len()).sum()
    }

    /// Total cells sent per update.
    pub fn send_count(&self) -> usize {
        self.send.iter().map(|p| p.entries.len()).sum()
    }

    /// Entries received from `peer`.
    pub fn recv_from(&self, peer: Rank) -> Option<&[PlanEntry]> {
        self.recv
            .iter()
            .find(|p| p.peer == peer)
            .map(|p| p.entries.as_slice())
    }

    /// Entries sent to `peer`.
    pub fn send_to(&self, peer: Rank) -> Option<&[PlanEntry]> {
        self.send
            .iter()
            .find(|p| p.peer == peer)
            .map(|p| p.entries.as_slice())
    }
}

fn entry_for(compute: &Extent, dst: (i32, i32), src: (i32, i32), folded: bool) -> PlanEntry {
    let (i, j) = dst;
    let depth_x = if i < compute.x_begin {
        compute.x_begin - i
    } else if i > compute.x_end {
        i - compute.x_end
    } else {
        0
    };
    let depth_y = if j < compute.y_begin {
        compute.y_begin - j
    } else if j > compute.y_end {
        j - compute.y_end
    } else {
        0
    };
    let dx = if i < compute.x_begin { -1 } else { i32::from(i > compute.x_end) };
    let dy = if j < compute.y_begin { -1 } else { i32::from(j > compute.y_end) };
    // dst lies outside compute, so at least one of dx, dy is non-zero.
    let direction = Direction::from_offset(dx, dy).unwrap_or(Direction::West);
    PlanEntry {
        dst,
        src,
        direction,
        depth_x,
        depth_y,
        folded,
    }
}

fn into_peers(map: IndexMap<Rank, Vec<PlanEntry>>) -> Vec<PeerEntries> {
    map.into_iter()
        .map(|(peer, entries)| PeerEntries { peer, entries })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::balanced_split;
    use mpp_core::{Layout, XBoundary, YBoundary};

    fn setup(
        global: Extent,
        layout: Layout,
        x: XBoundary,
        y: YBoundary,
    ) -> (Topology, Partition) {
        let xs = balanced_split(global.x_len(), layout.x as usize);
        let ys = balanced_split(global.y_len(), layout.y as usize);
        let owners = (0..layout.ndivs() as u32).map(|r| Some(Rank(r))).collect();
        (
            Topology {
                global,
                x_boundary: x,
                y_boundary: y,
                cyclic_offset: (0, 0),
            },
            Partition::new(global, layout, xs, ys, owners),
        )
    }

    #[test]
    fn two_ranks_exchange_one_column_each() {
        let (t, p) = setup(
            Extent::new(0, 7, 0, 3),
            Layout::new(2, 1),
            XBoundary::None,
            YBoundary::None,
        );
        let halo = HaloWidths::uniform(1);
        let p0 = ExchangePlan::build(Some(Rank(0)), &t, &p, &halo);
        let p1 = ExchangePlan::build(Some(Rank(1)), &t, &p, &halo);
        assert_eq!(p0.recv_from(Rank(1)).map(<[_]>::len), Some(4));
        assert_eq!(p0.send_to(Rank(1)), p1.recv_from(Rank(0)));
        assert_eq!(p1.send_to(Rank(0)), p0.recv_from(Rank(1)));
        assert!(p0.local().is_empty());
        let e = p0.recv_from(Rank(1)).unwrap()[0];
        assert_eq!(e.dst, (4, 0));
        assert_eq!(e.src, (4, 0));
        assert_eq!(e.direction, Direction::East);
    }

    #[test]
    fn single_cyclic_rank_is_all_local() {
        let (t, p) = setup(
            Extent::new(1, 4, 1, 3),
            Layout::new(1, 1),
            XBoundary::Cyclic,
            YBoundary::Cyclic,
        );
        let plan = ExchangePlan::build(Some(Rank(0)), &t, &p, &HaloWidths::uniform(1));
        assert!(plan.recv().is_empty());
        assert!(plan.send().is_empty());
        // (4+2) * (3+2) - 4*3 halo cells.
        assert_eq!(plan.local().len(), 18);
    }

    #[test]
    fn non_member_plan_is_empty() {
        let (t, p) = setup(
            Extent::new(1, 4, 1, 4),
            Layout::new(1, 1),
            XBoundary::None,
            YBoundary::None,
        );
        let plan = ExchangePlan::build(None, &t, &p, &HaloWidths::uniform(1));
        assert_eq!(plan, ExchangePlan::default());
    }

    #[test]
    fn selection_respects_mask_and_depth() {
        let e = PlanEntry {
            dst: (0, 0),
            src: (0, 0),
            direction: Direction::NorthEast,
            depth_x: 2,
            depth_y: 1,
            folded: false,
        };
        assert!(e.selected(Directions::ALL, &HaloWidths::uniform(2)));
        assert!(!e.selected(Directions::EDGES, &HaloWidths::uniform(2)));
        assert!(!e.selected(Directions::ALL, &HaloWidths::uniform(1)));
        assert!(e.selected(Directions::ALL, &HaloWidths::new(0, 2, 0, 1)));
    }
}
