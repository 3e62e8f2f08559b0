//! Splitting a global extent into per-division compute extents.

use mpp_core::{Extent, Layout, Rank};

/// Split `n` cells into `k` near-equal runs; the first `n % k` runs get
/// one extra cell.
pub fn balanced_split(n: usize, k: usize) -> Vec<i32> {
    if k == 0 {
        return Vec::new();
    }
    let base = n / k;
    let rem = n % k;
    (0..k).map(|i| (base + usize::from(i < rem)) as i32).collect()
}

/// The division grid of a domain: per-axis run lengths and the rank (if
/// any) that owns each division.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    global: Extent,
    layout: Layout,
    x_sizes: Vec<i32>,
    y_sizes: Vec<i32>,
    x_starts: Vec<i32>,
    y_starts: Vec<i32>,
    owners: Vec<Option<Rank>>,
}

impl Partition {
    /// Build from validated inputs. `owners` is row-major over the
    /// layout, x fastest, and must have `layout.ndivs()` entries.
    pub(crate) fn new(
        global: Extent,
        layout: Layout,
        x_sizes: Vec<i32>,
        y_sizes: Vec<i32>,
        owners: Vec<Option<Rank>>,
    ) -> Self {
        let x_starts = starts(global.x_begin, &x_sizes);
        let y_starts = starts(global.y_begin, &y_sizes);
        Self {
            global,
            layout,
            x_sizes,
            y_sizes,
            x_starts,
            y_starts,
            owners,
        }
    }

    /// Division layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Cells per x division.
    pub fn x_sizes(&self) -> &[i32] {
        &self.x_sizes
    }

    /// Cells per y division.
    pub fn y_sizes(&self) -> &[i32] {
        &self.y_sizes
    }

    /// Compute extent of division `(dx, dy)`.
    pub fn extent(&self, dx: usize, dy: usize) -> Extent {
        let xb = self.x_starts[dx];
        let yb = self.y_starts[dy];
        Extent::new(xb, xb + self.x_sizes[dx] - 1, yb, yb + self.y_sizes[dy] - 1)
    }

    /// Owner of division `(dx, dy)`; `None` if masked.
    pub fn owner(&self, dx: usize, dy: usize) -> Option<Rank> {
        self.owners[dy * self.layout.x as usize + dx]
    }

    /// Division containing global cell `(i, j)`.
    pub fn division_of(&self, i: i32, j: i32) -> Option<(usize, usize)> {
        if !self.global.contains(i, j) {
            return None;
        }
        Some((locate(&self.x_starts, i), locate(&self.y_starts, j)))
    }

    /// Owner of global cell `(i, j)`; `None` outside the global extent or
    /// inside a masked division.
    pub fn owner_of(&self, i: i32, j: i32) -> Option<Rank> {
        let (dx, dy) = self.division_of(i, j)?;
        self.owner(dx, dy)
    }

    /// Division owned by `rank`.
    pub fn division_of_rank(&self, rank: Rank) -> Option<(usize, usize)> {
        let n = self.owners.iter().position(|&o| o == Some(rank))?;
        let lx = self.layout.x as usize;
        Some((n % lx, n / lx))
    }

    /// Every division as `(extent, owner)`, row-major, x fastest.
    pub fn divisions(&self) -> impl Iterator<Item = (Extent, Option<Rank>)> + '_ {
        let lx = self.layout.x as usize;
        (0..self.owners.len()).map(move |n| {
            let (dx, dy) = (n % lx, n / lx);
            (self.extent(dx, dy), self.owner(dx, dy))
        })
    }

    /// Number of active (owned) divisions.
    pub fn active(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }
}

fn starts(begin: i32, sizes: &[i32]) -> Vec<i32> {
    let mut at = begin;
    sizes
        .iter()
        .map(|&s| {
            let b = at;
            at += s;
            b
        })
        .collect()
}

/// Index of the run containing `v`, given ascending run starts with
/// `starts[0] <= v`.
fn locate(starts: &[i32], v: i32) -> usize {
    starts.partition_point(|&s| s <= v).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn simple(global: Extent, layout: Layout) -> Partition {
        let xs = balanced_split(global.x_len(), layout.x as usize);
        let ys = balanced_split(global.y_len(), layout.y as usize);
        let owners = (0..layout.ndivs() as u32).map(|r| Some(Rank(r))).collect();
        Partition::new(global, layout, xs, ys, owners)
    }

    #[test]
    fn remainder_goes_to_first_divisions() {
        assert_eq!(balanced_split(10, 3), vec![4, 3, 3]);
        assert_eq!(balanced_split(11, 4), vec![3, 3, 3, 2]);
        assert_eq!(balanced_split(4, 4), vec![1, 1, 1, 1]);
    }

    #[test]
    fn extents_are_row_major_x_fastest() {
        let p = simple(Extent::new(1, 10, 1, 10), Layout::new(2, 2));
        let divs: Vec<_> = p.divisions().collect();
        assert_eq!(divs[0], (Extent::new(1, 5, 1, 5), Some(Rank(0))));
        assert_eq!(divs[1], (Extent::new(6, 10, 1, 5), Some(Rank(1))));
        assert_eq!(divs[2], (Extent::new(1, 5, 6, 10), Some(Rank(2))));
        assert_eq!(divs[3], (Extent::new(6, 10, 6, 10), Some(Rank(3))));
    }

    #[test]
    fn owner_lookup() {
        let p = simple(Extent::new(0, 9, 0, 9), Layout::new(2, 2));
        assert_eq!(p.owner_of(0, 0), Some(Rank(0)));
        assert_eq!(p.owner_of(5, 4), Some(Rank(1)));
        assert_eq!(p.owner_of(4, 5), Some(Rank(2)));
        assert_eq!(p.owner_of(10, 0), None);
        assert_eq!(p.division_of_rank(Rank(3)), Some((1, 1)));
    }

    proptest! {
        #[test]
        fn divisions_tile_global_exactly(
            nx in 1i32..40, ny in 1i32..40,
            lx in 1u32..6, ly in 1u32..6,
            x0 in -5i32..5, y0 in -5i32..5,
        ) {
            prop_assume!(lx as i32 <= nx && ly as i32 <= ny);
            let global = Extent::new(x0, x0 + nx - 1, y0, y0 + ny - 1);
            let p = simple(global, Layout::new(lx, ly));
            let mut seen = vec![0u8; global.area()];
            for (e, owner) in p.divisions() {
                prop_assert!(!e.is_degenerate());
                for (i, j) in e.iter() {
                    let off = global.offset_of(i, j);
                    prop_assert!(off.is_some());
                    seen[off.unwrap_or(0)] += 1;
                    prop_assert_eq!(p.owner_of(i, j), owner);
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1));
        }
    }
}
