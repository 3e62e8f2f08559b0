//! Partitioning, layout choice and plan symmetry across ranks.

use mpp_comm::Pelist;
use mpp_core::{DomainError, Extent, HaloWidths, Layout, Rank, XBoundary, YBoundary};
use mpp_domain::{define_domain, solve_layout, Domain, DomainSpec};
use mpp_test_utils::run_spmd;
use proptest::prelude::*;

#[test]
fn ten_by_ten_on_four_ranks_tiles_exactly() {
    let out = run_spmd(4, |ctx| {
        let global = Extent::new(1, 10, 1, 10);
        let layout = solve_layout(&global, ctx.world_size() as i32).unwrap();
        let d = define_domain(ctx, &DomainSpec::new(global, layout)).unwrap();
        d.compute_domain().unwrap()
    })
    .unwrap();

    assert_eq!(
        out,
        vec![
            Extent::new(1, 5, 1, 5),
            Extent::new(6, 10, 1, 5),
            Extent::new(1, 5, 6, 10),
            Extent::new(6, 10, 6, 10),
        ]
    );
    let mut seen = [[0u8; 10]; 10];
    for e in &out {
        for (i, j) in e.iter() {
            seen[(j - 1) as usize][(i - 1) as usize] += 1;
        }
    }
    assert!(seen.iter().flatten().all(|&c| c == 1));
}

#[test]
fn square_grid_gets_square_layout() {
    assert_eq!(
        solve_layout(&Extent::new(1, 100, 1, 100), 4).unwrap(),
        Layout::new(2, 2)
    );
}

#[test]
fn pelist_size_must_match_active_divisions() {
    let out = run_spmd(3, |ctx| {
        let spec = DomainSpec::new(Extent::new(1, 10, 1, 10), Layout::new(2, 2));
        define_domain(ctx, &spec).unwrap_err()
    })
    .unwrap();
    for err in out {
        assert!(matches!(
            err,
            DomainError::LayoutMismatch {
                active: 4,
                pelist_len: 3,
                ..
            }
        ));
    }
}

#[test]
fn explicit_extents_are_honoured() {
    let spec = DomainSpec::new(Extent::new(0, 9, 0, 5), Layout::new(3, 1))
        .with_extents(vec![2, 5, 3], vec![6]);
    let d = Domain::define_for(&spec, Pelist::world(3), Rank(1)).unwrap();
    assert_eq!(d.compute_domain().unwrap(), Extent::new(2, 6, 0, 5));
    assert_eq!(d.owner_of(9, 0), Some(Rank(2)));
}

fn boundary(n: usize) -> (XBoundary, YBoundary) {
    let xs = [XBoundary::None, XBoundary::Cyclic, XBoundary::FoldWest, XBoundary::FoldEast];
    let ys = [YBoundary::None, YBoundary::Cyclic, YBoundary::FoldSouth, YBoundary::FoldNorth];
    (xs[n % 4], ys[n / 4])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_division_tiles_the_global_extent(
        nx in 2i32..30, ny in 2i32..30, lx in 1u32..5, ly in 1u32..5,
    ) {
        prop_assume!(lx as i32 <= nx && ly as i32 <= ny);
        let spec = DomainSpec::new(Extent::new(1, nx, 1, ny), Layout::new(lx, ly));
        let n = (lx * ly) as usize;
        let mut cells = 0usize;
        for r in 0..n as u32 {
            let d = Domain::define_for(&spec, Pelist::world(n), Rank(r)).unwrap();
            let c = d.compute_domain().unwrap();
            for (i, j) in c.iter() {
                prop_assert_eq!(d.owner_of(i, j), Some(Rank(r)));
            }
            cells += c.area();
        }
        prop_assert_eq!(cells, (nx * ny) as usize);
    }

    #[test]
    fn send_lists_mirror_receive_lists(
        nx in 4i32..20, ny in 4i32..20, lx in 1u32..4, ly in 1u32..4,
        halo in 0i32..3, b in 0usize..16, off in -2i32..3,
    ) {
        prop_assume!(lx as i32 * 2 <= nx && ly as i32 * 2 <= ny);
        let (xb, yb) = boundary(b);
        let spec = DomainSpec::new(Extent::new(1, nx, 1, ny), Layout::new(lx, ly))
            .with_halo(HaloWidths::uniform(halo))
            .with_boundaries(xb, yb)
            .with_cyclic_offset(off, 0);
        let n = (lx * ly) as usize;
        let views: Vec<Domain> = (0..n as u32)
            .map(|r| Domain::define_for(&spec, Pelist::world(n), Rank(r)).unwrap())
            .collect();
        for a in &views {
            for peer in a.plan().send() {
                let b = &views[peer.peer.index()];
                prop_assert_eq!(Some(peer.entries.as_slice()), b.plan().recv_from(a.rank()));
            }
            for peer in a.plan().recv() {
                let b = &views[peer.peer.index()];
                prop_assert_eq!(Some(peer.entries.as_slice()), b.plan().send_to(a.rank()));
            }
        }
    }
}
