//! Global boundary topology for each axis of a domain.
//!
//! These flags control which cells are considered adjacent across the
//! edges of the global extent. `None` is a hard edge: halo cells beyond
//! it have no source and are never written by a halo update.

/// Topology of the x (west/east) edges of the global grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum XBoundary {
    /// Hard edge; data domains are clipped at the global boundary.
    #[default]
    None,
    /// Periodic in x: the east edge is adjacent to the west edge.
    Cyclic,
    /// The west edge folds onto itself with y reversed.
    FoldWest,
    /// The east edge folds onto itself with y reversed.
    FoldEast,
}

impl XBoundary {
    /// Whether the west edge carries a halo beyond the global extent.
    pub fn extends_west(self) -> bool {
        matches!(self, Self::Cyclic | Self::FoldWest)
    }

    /// Whether the east edge carries a halo beyond the global extent.
    pub fn extends_east(self) -> bool {
        matches!(self, Self::Cyclic | Self::FoldEast)
    }
}

/// Topology of the y (south/north) edges of the global grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum YBoundary {
    /// Hard edge; data domains are clipped at the global boundary.
    #[default]
    None,
    /// Periodic in y: the north edge is adjacent to the south edge.
    Cyclic,
    /// The south edge folds onto itself with x reversed.
    FoldSouth,
    /// The north edge folds onto itself with x reversed (tripolar grids).
    FoldNorth,
}

impl YBoundary {
    /// Whether the south edge carries a halo beyond the global extent.
    pub fn extends_south(self) -> bool {
        matches!(self, Self::Cyclic | Self::FoldSouth)
    }

    /// Whether the north edge carries a halo beyond the global extent.
    pub fn extends_north(self) -> bool {
        matches!(self, Self::Cyclic | Self::FoldNorth)
    }
}
