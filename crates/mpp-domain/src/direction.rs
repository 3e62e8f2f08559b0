//! Compass directions around a compute domain.

use std::fmt;

use bitflags::bitflags;

/// Where a halo cell lies relative to the compute domain that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Low x, same y band.
    West,
    /// High x, same y band.
    East,
    /// Low y, same x band.
    South,
    /// High y, same x band.
    North,
    /// Low x, low y.
    SouthWest,
    /// High x, low y.
    SouthEast,
    /// Low x, high y.
    NorthWest,
    /// High x, high y.
    NorthEast,
}

impl Direction {
    /// All eight directions in a fixed order.
    pub const ALL: [Direction; 8] = [
        Self::West,
        Self::East,
        Self::South,
        Self::North,
        Self::SouthWest,
        Self::SouthEast,
        Self::NorthWest,
        Self::NorthEast,
    ];

    /// Classify a cell by its offset sign from the compute domain:
    /// `dx`, `dy` in `{-1, 0, 1}`. `(0, 0)` is inside and has no direction.
    pub fn from_offset(dx: i32, dy: i32) -> Option<Direction> {
        match (dx.signum(), dy.signum()) {
            (-1, 0) => Some(Self::West),
            (1, 0) => Some(Self::East),
            (0, -1) => Some(Self::South),
            (0, 1) => Some(Self::North),
            (-1, -1) => Some(Self::SouthWest),
            (1, -1) => Some(Self::SouthEast),
            (-1, 1) => Some(Self::NorthWest),
            (1, 1) => Some(Self::NorthEast),
            _ => None,
        }
    }

    /// Index into [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The matching single-bit mask.
    pub fn flag(self) -> Directions {
        match self {
            Self::West => Directions::WEST,
            Self::East => Directions::EAST,
            Self::South => Directions::SOUTH,
            Self::North => Directions::NORTH,
            Self::SouthWest => Directions::SOUTH_WEST,
            Self::SouthEast => Directions::SOUTH_EAST,
            Self::NorthWest => Directions::NORTH_WEST,
            Self::NorthEast => Directions::NORTH_EAST,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::West => "W",
            Self::East => "E",
            Self::South => "S",
            Self::North => "N",
            Self::SouthWest => "SW",
            Self::SouthEast => "SE",
            Self::NorthWest => "NW",
            Self::NorthEast => "NE",
        };
        f.write_str(s)
    }
}

bitflags! {
    /// Which parts of the halo an update should fill.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        /// West edge strip.
        const WEST = 1 << 0;
        /// East edge strip.
        const EAST = 1 << 1;
        /// South edge strip.
        const SOUTH = 1 << 2;
        /// North edge strip.
        const NORTH = 1 << 3;
        /// South-west corner.
        const SOUTH_WEST = 1 << 4;
        /// South-east corner.
        const SOUTH_EAST = 1 << 5;
        /// North-west corner.
        const NORTH_WEST = 1 << 6;
        /// North-east corner.
        const NORTH_EAST = 1 << 7;

        /// West and east strips only.
        const X_ONLY = Self::WEST.bits() | Self::EAST.bits();
        /// South and north strips only.
        const Y_ONLY = Self::SOUTH.bits() | Self::NORTH.bits();
        /// The four edge strips, no corners.
        const EDGES = Self::X_ONLY.bits() | Self::Y_ONLY.bits();
        /// The four corners.
        const CORNERS = Self::SOUTH_WEST.bits()
            | Self::SOUTH_EAST.bits()
            | Self::NORTH_WEST.bits()
            | Self::NORTH_EAST.bits();
        /// Everything.
        const ALL = Self::EDGES.bits() | Self::CORNERS.bits();
    }
}

impl Default for Directions {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_classify() {
        assert_eq!(Direction::from_offset(-3, 0), Some(Direction::West));
        assert_eq!(Direction::from_offset(2, 5), Some(Direction::NorthEast));
        assert_eq!(Direction::from_offset(0, 0), None);
    }

    #[test]
    fn index_matches_all_order() {
        for (n, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), n);
        }
    }

    #[test]
    fn flags_partition_all() {
        let mut acc = Directions::empty();
        for d in Direction::ALL {
            assert!(!acc.intersects(d.flag()));
            acc |= d.flag();
        }
        assert_eq!(acc, Directions::ALL);
        assert_eq!(Directions::default(), Directions::ALL);
        assert!(!Directions::X_ONLY.contains(Direction::NorthEast.flag()));
    }
}
