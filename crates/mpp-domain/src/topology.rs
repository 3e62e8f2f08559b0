//! Global boundary mapping: which interior cell feeds a halo cell.
//!
//! A halo cell inside the global extent is its own source. Beyond a
//! cyclic edge it wraps modulo the axis length, shifted along the other
//! axis by the cyclic offset. Beyond a fold it is reflected across the
//! edge and the index along the edge is reversed. Beyond a hard edge it
//! has no source.

use mpp_core::{Extent, HaloWidths, XBoundary, YBoundary};

/// Where a halo cell's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Source {
    /// Global x index of the source cell.
    pub i: i32,
    /// Global y index of the source cell.
    pub j: i32,
    /// The mapping crossed a fold; vector components change sign.
    pub folded: bool,
}

/// Global extent plus edge behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Global extent.
    pub global: Extent,
    /// West/east behaviour.
    pub x_boundary: XBoundary,
    /// South/north behaviour.
    pub y_boundary: YBoundary,
    /// `(shift of j across an x edge, shift of i across a y edge)`.
    pub cyclic_offset: (i32, i32),
}

impl Topology {
    /// Compute extent grown by `halo`, clipped at every global edge that
    /// does not extend past itself.
    pub fn data_domain(&self, compute: &Extent, halo: &HaloWidths) -> Extent {
        let g = &self.global;
        let mut d = compute.expand(halo);
        if !self.x_boundary.extends_west() {
            d.x_begin = d.x_begin.max(g.x_begin);
        }
        if !self.x_boundary.extends_east() {
            d.x_end = d.x_end.min(g.x_end);
        }
        if !self.y_boundary.extends_south() {
            d.y_begin = d.y_begin.max(g.y_begin);
        }
        if !self.y_boundary.extends_north() {
            d.y_end = d.y_end.min(g.y_end);
        }
        d
    }

    /// Source of global cell `(i, j)`, or `None` if nothing feeds it.
    ///
    /// The x edges are resolved first, then the y edges; a corner beyond
    /// a hard x edge therefore has no source whatever the y behaviour.
    pub fn source_of(&self, i: i32, j: i32) -> Option<Source> {
        let g = &self.global;
        let nx = g.x_len() as i32;
        let ny = g.y_len() as i32;
        let (mut si, mut sj, mut folded) = (i, j, false);

        if si < g.x_begin || si > g.x_end {
            match self.x_boundary {
                XBoundary::Cyclic => {
                    let laps = (si - g.x_begin).div_euclid(nx);
                    si = g.x_begin + (si - g.x_begin).rem_euclid(nx);
                    sj += laps * self.cyclic_offset.0;
                }
                XBoundary::FoldWest if si < g.x_begin => {
                    si = 2 * g.x_begin - 1 - si;
                    sj = g.y_begin + g.y_end - sj;
                    folded = true;
                }
                XBoundary::FoldEast if si > g.x_end => {
                    si = 2 * g.x_end + 1 - si;
                    sj = g.y_begin + g.y_end - sj;
                    folded = true;
                }
                _ => return None,
            }
        }

        if sj < g.y_begin || sj > g.y_end {
            match self.y_boundary {
                YBoundary::Cyclic => {
                    let laps = (sj - g.y_begin).div_euclid(ny);
                    sj = g.y_begin + (sj - g.y_begin).rem_euclid(ny);
                    si += laps * self.cyclic_offset.1;
                    if self.x_boundary == XBoundary::Cyclic {
                        si = g.x_begin + (si - g.x_begin).rem_euclid(nx);
                    }
                }
                YBoundary::FoldSouth if sj < g.y_begin => {
                    sj = 2 * g.y_begin - 1 - sj;
                    si = g.x_begin + g.x_end - si;
                    folded = !folded;
                }
                YBoundary::FoldNorth if sj > g.y_end => {
                    sj = 2 * g.y_end + 1 - sj;
                    si = g.x_begin + g.x_end - si;
                    folded = !folded;
                }
                _ => return None,
            }
        }

        if g.contains(si, sj) {
            Some(Source {
                i: si,
                j: sj,
                folded,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn topo(x: XBoundary, y: YBoundary) -> Topology {
        Topology {
            global: Extent::new(1, 8, 1, 6),
            x_boundary: x,
            y_boundary: y,
            cyclic_offset: (0, 0),
        }
    }

    #[test]
    fn interior_is_its_own_source() {
        let t = topo(XBoundary::None, YBoundary::None);
        assert_eq!(
            t.source_of(3, 4),
            Some(Source {
                i: 3,
                j: 4,
                folded: false
            })
        );
        assert_eq!(t.source_of(0, 4), None);
    }

    #[test]
    fn cyclic_wraps_both_ways() {
        let t = topo(XBoundary::Cyclic, YBoundary::Cyclic);
        assert_eq!(t.source_of(0, 1).map(|s| (s.i, s.j)), Some((8, 1)));
        assert_eq!(t.source_of(9, 1).map(|s| (s.i, s.j)), Some((1, 1)));
        assert_eq!(t.source_of(9, 7).map(|s| (s.i, s.j)), Some((1, 1)));
        assert_eq!(t.source_of(0, 0).map(|s| (s.i, s.j)), Some((8, 6)));
    }

    #[test]
    fn cyclic_offset_shifts_other_axis() {
        let mut t = topo(XBoundary::Cyclic, YBoundary::None);
        t.cyclic_offset = (2, 0);
        // One lap east: j shifts by +2.
        assert_eq!(t.source_of(9, 1).map(|s| (s.i, s.j)), Some((1, 3)));
        // One lap west: j shifts by -2.
        assert_eq!(t.source_of(0, 4).map(|s| (s.i, s.j)), Some((8, 2)));
        // Shift lands beyond a hard y edge: no source.
        assert_eq!(t.source_of(9, 6), None);
    }

    #[test]
    fn fold_north_reverses_x() {
        let t = topo(XBoundary::None, YBoundary::FoldNorth);
        let s = t.source_of(2, 7).unwrap();
        assert_eq!((s.i, s.j, s.folded), (7, 6, true));
        let s = t.source_of(8, 8).unwrap();
        assert_eq!((s.i, s.j), (1, 5));
        assert_eq!(t.source_of(2, 0), None, "south stays a hard edge");
    }

    #[test]
    fn fold_south_west_east() {
        let t = topo(XBoundary::FoldWest, YBoundary::FoldSouth);
        let s = t.source_of(3, 0).unwrap();
        assert_eq!((s.i, s.j, s.folded), (6, 1, true));
        let s = t.source_of(0, 2).unwrap();
        assert_eq!((s.i, s.j, s.folded), (1, 5, true));
        let t = topo(XBoundary::FoldEast, YBoundary::None);
        let s = t.source_of(10, 1).unwrap();
        assert_eq!((s.i, s.j), (7, 6));
    }

    #[test]
    fn data_domain_clips_only_hard_edges() {
        let t = topo(XBoundary::Cyclic, YBoundary::FoldNorth);
        let compute = Extent::new(1, 4, 1, 6);
        let d = t.data_domain(&compute, &HaloWidths::uniform(2));
        assert_eq!(d, Extent::new(-1, 6, 1, 8));
    }

    proptest! {
        #[test]
        fn sources_lie_inside_global(
            i in -6i32..15, j in -6i32..13,
            xb in 0usize..4, yb in 0usize..4,
            off in -3i32..3,
        ) {
            let xs = [XBoundary::None, XBoundary::Cyclic, XBoundary::FoldWest, XBoundary::FoldEast];
            let ys = [YBoundary::None, YBoundary::Cyclic, YBoundary::FoldSouth, YBoundary::FoldNorth];
            let mut t = topo(xs[xb], ys[yb]);
            t.cyclic_offset = (off, 0);
            if let Some(s) = t.source_of(i, j) {
                prop_assert!(t.global.contains(s.i, s.j));
            }
        }

        #[test]
        fn fold_north_is_an_involution_on_reflected_rows(i in 1i32..=8, d in 1i32..=3) {
            let t = topo(XBoundary::None, YBoundary::FoldNorth);
            let s = t.source_of(i, 6 + d).unwrap();
            prop_assert_eq!(s.j, 7 - d);
            prop_assert_eq!(s.i, 9 - i);
            prop_assert!(s.folded);
        }
    }
}
