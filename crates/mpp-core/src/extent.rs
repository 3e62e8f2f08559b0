//! Index extents, processor layouts and halo widths.

use std::fmt;

/// An inclusive rectangle of global grid indices.
///
/// Mirrors the `(is, ie, js, je)` quadruple used throughout the
/// decomposition layer: `x_begin..=x_end` by `y_begin..=y_end`. An extent
/// whose end precedes its begin on either axis is degenerate and has
/// zero area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    /// First x index (inclusive).
    pub x_begin: i32,
    /// Last x index (inclusive).
    pub x_end: i32,
    /// First y index (inclusive).
    pub y_begin: i32,
    /// Last y index (inclusive).
    pub y_end: i32,
}

impl Extent {
    /// Create an extent from inclusive bounds.
    pub const fn new(x_begin: i32, x_end: i32, y_begin: i32, y_end: i32) -> Self {
        Self {
            x_begin,
            x_end,
            y_begin,
            y_end,
        }
    }

    /// Build from the `[is, ie, js, je]` array form used at the C boundary.
    pub const fn from_array(a: [i32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    /// The `[is, ie, js, je]` array form.
    pub const fn to_array(self) -> [i32; 4] {
        [self.x_begin, self.x_end, self.y_begin, self.y_end]
    }

    /// Number of cells along x (zero if degenerate).
    pub fn x_len(&self) -> usize {
        axis_len(self.x_begin, self.x_end)
    }

    /// Number of cells along y (zero if degenerate).
    pub fn y_len(&self) -> usize {
        axis_len(self.y_begin, self.y_end)
    }

    /// Total number of cells.
    pub fn area(&self) -> usize {
        self.x_len() * self.y_len()
    }

    /// `true` if the extent has zero cells on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.x_end < self.x_begin || self.y_end < self.y_begin
    }

    /// Whether global index `(i, j)` lies inside this extent.
    pub fn contains(&self, i: i32, j: i32) -> bool {
        i >= self.x_begin && i <= self.x_end && j >= self.y_begin && j <= self.y_end
    }

    /// Whether `other` lies entirely inside this extent.
    pub fn contains_extent(&self, other: &Extent) -> bool {
        other.is_degenerate()
            || (self.contains(other.x_begin, other.y_begin)
                && self.contains(other.x_end, other.y_end))
    }

    /// Intersection of two extents, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Extent) -> Option<Extent> {
        let out = Extent::new(
            self.x_begin.max(other.x_begin),
            self.x_end.min(other.x_end),
            self.y_begin.max(other.y_begin),
            self.y_end.min(other.y_end),
        );
        if out.is_degenerate() {
            None
        } else {
            Some(out)
        }
    }

    /// Grow the extent outward by the given halo widths, saturating at
    /// the `i32` range.
    pub fn expand(&self, halo: &HaloWidths) -> Extent {
        Extent::new(
            self.x_begin.saturating_sub(halo.west),
            self.x_end.saturating_add(halo.east),
            self.y_begin.saturating_sub(halo.south),
            self.y_end.saturating_add(halo.north),
        )
    }

    /// Row-major (x fastest) offset of `(i, j)` within this extent.
    ///
    /// Returns `None` if the index lies outside.
    pub fn offset_of(&self, i: i32, j: i32) -> Option<usize> {
        if !self.contains(i, j) {
            return None;
        }
        let di = (i - self.x_begin) as usize;
        let dj = (j - self.y_begin) as usize;
        Some(dj * self.x_len() + di)
    }

    /// Iterate every `(i, j)` in row-major order (x fastest).
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (xb, xe) = (self.x_begin, self.x_end);
        (self.y_begin..=self.y_end).flat_map(move |j| (xb..=xe).map(move |i| (i, j)))
    }
}

fn axis_len(begin: i32, end: i32) -> usize {
    if end < begin {
        0
    } else {
        (end as i64 - begin as i64 + 1) as usize
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}, {}:{}]",
            self.x_begin, self.x_end, self.y_begin, self.y_end
        )
    }
}

/// A 2-D processor grid: `x` divisions along x times `y` along y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Divisions along x.
    pub x: u32,
    /// Divisions along y.
    pub y: u32,
}

impl Layout {
    /// Create a layout.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Total number of divisions, `x * y`.
    pub fn ndivs(&self) -> usize {
        self.x as usize * self.y as usize
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Halo (ghost cell) widths on each side of a compute domain.
///
/// Widths are signed so that invalid input coming across the C boundary
/// can be represented and rejected with a typed error rather than
/// silently wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HaloWidths {
    /// Cells on the west (low x) side.
    pub west: i32,
    /// Cells on the east (high x) side.
    pub east: i32,
    /// Cells on the south (low y) side.
    pub south: i32,
    /// Cells on the north (high y) side.
    pub north: i32,
}

impl HaloWidths {
    /// Explicit per-side widths.
    pub const fn new(west: i32, east: i32, south: i32, north: i32) -> Self {
        Self {
            west,
            east,
            south,
            north,
        }
    }

    /// The same width on all four sides.
    pub const fn uniform(w: i32) -> Self {
        Self::new(w, w, w, w)
    }

    /// Separate x (west/east) and y (south/north) widths.
    pub const fn xy(x: i32, y: i32) -> Self {
        Self::new(x, x, y, y)
    }

    /// The first negative side, as `(side_name, width)`.
    pub fn first_negative(&self) -> Option<(&'static str, i32)> {
        [
            ("west", self.west),
            ("east", self.east),
            ("south", self.south),
            ("north", self.north),
        ]
        .into_iter()
        .find(|&(_, w)| w < 0)
    }

    /// The first side wider than its axis: `nx` cells for west/east,
    /// `ny` for south/north.
    pub fn first_wider_than(&self, nx: usize, ny: usize) -> Option<(&'static str, i32)> {
        [
            ("west", self.west, nx),
            ("east", self.east, nx),
            ("south", self.south, ny),
            ("north", self.north, ny),
        ]
        .into_iter()
        .find(|&(_, w, n)| usize::try_from(w).is_ok_and(|w| w > n))
        .map(|(side, w, _)| (side, w))
    }

    /// `true` if every side of `self` is no wider than `other`.
    pub fn fits_within(&self, other: &HaloWidths) -> bool {
        self.west <= other.west
            && self.east <= other.east
            && self.south <= other.south
            && self.north <= other.north
    }
}

impl fmt::Display for HaloWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "w={} e={} s={} n={}",
            self.west, self.east, self.south, self.north
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lengths_are_inclusive() {
        let e = Extent::new(0, 9, 0, 4);
        assert_eq!(e.x_len(), 10);
        assert_eq!(e.y_len(), 5);
        assert_eq!(e.area(), 50);
        assert!(!e.is_degenerate());
    }

    #[test]
    fn degenerate_extent_has_zero_area() {
        let e = Extent::new(5, 4, 0, 3);
        assert!(e.is_degenerate());
        assert_eq!(e.x_len(), 0);
        assert_eq!(e.area(), 0);
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = Extent::new(0, 4, 0, 4);
        let b = Extent::new(5, 9, 0, 4);
        assert_eq!(a.intersect(&b), None);
        assert_eq!(
            a.intersect(&Extent::new(3, 9, 2, 2)),
            Some(Extent::new(3, 4, 2, 2))
        );
    }

    #[test]
    fn expand_applies_each_side() {
        let e = Extent::new(10, 19, 0, 9).expand(&HaloWidths::new(1, 2, 3, 4));
        assert_eq!(e, Extent::new(9, 21, -3, 13));
    }

    #[test]
    fn offset_is_x_fastest() {
        let e = Extent::new(2, 4, 10, 11);
        assert_eq!(e.offset_of(2, 10), Some(0));
        assert_eq!(e.offset_of(4, 10), Some(2));
        assert_eq!(e.offset_of(2, 11), Some(3));
        assert_eq!(e.offset_of(5, 10), None);
    }

    #[test]
    fn first_negative_reports_side() {
        assert_eq!(HaloWidths::uniform(2).first_negative(), None);
        assert_eq!(
            HaloWidths::new(1, 1, -2, 1).first_negative(),
            Some(("south", -2))
        );
    }

    #[test]
    fn array_form_round_trips() {
        let e = Extent::new(1, 2, 3, 4);
        assert_eq!(Extent::from_array(e.to_array()), e);
    }

    proptest! {
        #[test]
        fn iter_visits_area_cells_in_offset_order(
            xb in -20i32..20, xl in 1i32..12,
            yb in -20i32..20, yl in 1i32..12,
        ) {
            let e = Extent::new(xb, xb + xl - 1, yb, yb + yl - 1);
            let cells: Vec<_> = e.iter().collect();
            prop_assert_eq!(cells.len(), e.area());
            for (n, (i, j)) in cells.into_iter().enumerate() {
                prop_assert_eq!(e.offset_of(i, j), Some(n));
            }
        }
    }
}
