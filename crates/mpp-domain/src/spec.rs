//! Domain definition parameters.

use mpp_comm::Pelist;
use mpp_core::{
    DomainError, DomainResult, Extent, HaloWidths, Layout, XBoundary, YBoundary,
};

/// Membership of a domain in a multi-tile mosaic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mosaic {
    /// This tile's id, `0..tile_count`.
    pub tile_id: u32,
    /// Number of tiles in the mosaic.
    pub tile_count: u32,
    /// Whether the tiles together cover the whole mosaic.
    pub complete: bool,
}

/// Everything needed to define a [`Domain`](crate::Domain).
///
/// Build with [`DomainSpec::new`] and the `with_*` methods. Fields left
/// unset take the documented defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainSpec {
    /// Global index extent. Required.
    pub global: Extent,
    /// Division layout. Required.
    pub layout: Layout,
    /// Pelist the domain is spread over. Default: the current pelist.
    pub pelist: Option<Pelist>,
    /// Halo widths. Default: zero on every side.
    pub halo: HaloWidths,
    /// West/east edges. Default: hard.
    pub x_boundary: XBoundary,
    /// South/north edges. Default: hard.
    pub y_boundary: YBoundary,
    /// Per-division activity, row-major over the layout, x fastest;
    /// `false` divisions own nothing. Default: all active.
    pub mask: Option<Vec<bool>>,
    /// Cells per x division. Default: even split.
    pub x_extent: Option<Vec<i32>>,
    /// Cells per y division. Default: even split.
    pub y_extent: Option<Vec<i32>>,
    /// Minimum buffer size per axis. Default: the data domain size.
    pub memory_size: Option<(i32, i32)>,
    /// Mosaic linkage. Default: a standalone tile.
    pub mosaic: Option<Mosaic>,
    /// `(j shift across an x edge, i shift across a y edge)` for cyclic
    /// boundaries. Default: `(0, 0)`.
    pub cyclic_offset: (i32, i32),
    /// Label used in log lines. Default: `"domain"`.
    pub name: String,
}

impl DomainSpec {
    /// A spec with the given global extent and layout and all defaults.
    pub fn new(global: Extent, layout: Layout) -> Self {
        Self {
            global,
            layout,
            pelist: None,
            halo: HaloWidths::default(),
            x_boundary: XBoundary::None,
            y_boundary: YBoundary::None,
            mask: None,
            x_extent: None,
            y_extent: None,
            memory_size: None,
            mosaic: None,
            cyclic_offset: (0, 0),
            name: String::from("domain"),
        }
    }

    /// Spread over `pelist` instead of the current one.
    pub fn with_pelist(mut self, pelist: Pelist) -> Self {
        self.pelist = Some(pelist);
        self
    }

    /// Set halo widths.
    pub fn with_halo(mut self, halo: HaloWidths) -> Self {
        self.halo = halo;
        self
    }

    /// Set both boundary behaviours.
    pub fn with_boundaries(mut self, x: XBoundary, y: YBoundary) -> Self {
        self.x_boundary = x;
        self.y_boundary = y;
        self
    }

    /// Mask out divisions.
    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Explicit per-division sizes.
    pub fn with_extents(mut self, x: Vec<i32>, y: Vec<i32>) -> Self {
        self.x_extent = Some(x);
        self.y_extent = Some(y);
        self
    }

    /// Minimum buffer size per axis.
    pub fn with_memory_size(mut self, x: i32, y: i32) -> Self {
        self.memory_size = Some((x, y));
        self
    }

    /// Mosaic linkage.
    pub fn with_mosaic(mut self, mosaic: Mosaic) -> Self {
        self.mosaic = Some(mosaic);
        self
    }

    /// Cyclic shifts.
    pub fn with_cyclic_offset(mut self, along_x: i32, along_y: i32) -> Self {
        self.cyclic_offset = (along_x, along_y);
        self
    }

    /// Label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of divisions the mask leaves active.
    pub fn active_divisions(&self) -> usize {
        match &self.mask {
            Some(m) => m.iter().filter(|&&a| a).count(),
            None => self.layout.ndivs(),
        }
    }

    /// Check everything that does not depend on the pelist.
    ///
    /// Checks run in a fixed order and the first failure is reported:
    /// extent, halo, layout, explicit extents, mask, then mosaic and
    /// memory size.
    pub fn validate(&self) -> DomainResult<()> {
        if self.global.is_degenerate() {
            return Err(DomainError::DegenerateExtent {
                extent: self.global,
            });
        }
        if let Some((side, width)) = self.halo.first_negative() {
            return Err(DomainError::InvalidHalo { side, width });
        }
        let (nx, ny) = (self.global.x_len(), self.global.y_len());
        // A halo may wrap a cyclic axis at most once.
        if let Some((side, width)) = self.halo.first_wider_than(nx, ny) {
            return Err(DomainError::InvalidHalo { side, width });
        }

        let l = self.layout;
        if l.x == 0 || l.y == 0 {
            return Err(DomainError::InvalidLayout {
                reason: format!("layout {l} has no divisions"),
            });
        }
        if l.x as usize > nx || l.y as usize > ny {
            return Err(DomainError::InvalidLayout {
                reason: format!("layout {l} has more divisions than {} cells", self.global),
            });
        }

        check_extent("x", self.x_extent.as_deref(), l.x as usize, nx)?;
        check_extent("y", self.y_extent.as_deref(), l.y as usize, ny)?;

        if let Some(m) = &self.mask {
            if m.len() != l.ndivs() {
                return Err(DomainError::InvalidMask {
                    reason: format!(
                        "mask has {} entries, layout {l} has {} divisions",
                        m.len(),
                        l.ndivs()
                    ),
                });
            }
        }

        if let Some(mo) = &self.mosaic {
            if mo.tile_count == 0 || mo.tile_id >= mo.tile_count {
                return Err(DomainError::InvalidLayout {
                    reason: format!("tile {} of {} is out of range", mo.tile_id, mo.tile_count),
                });
            }
        }
        if let Some((mx, my)) = self.memory_size {
            if mx < 0 || my < 0 {
                return Err(DomainError::InvalidExtents {
                    reason: format!("memory size ({mx}, {my}) is negative"),
                });
            }
        }
        Ok(())
    }
}

fn check_extent(axis: &str, sizes: Option<&[i32]>, divs: usize, cells: usize) -> DomainResult<()> {
    let Some(sizes) = sizes else { return Ok(()) };
    if sizes.len() != divs {
        return Err(DomainError::InvalidExtents {
            reason: format!("{axis} extent has {} entries for {divs} divisions", sizes.len()),
        });
    }
    if let Some(bad) = sizes.iter().find(|&&s| s <= 0) {
        return Err(DomainError::InvalidExtents {
            reason: format!("{axis} extent entry {bad} is not positive"),
        });
    }
    let sum: i64 = sizes.iter().map(|&s| s as i64).sum();
    if sum != cells as i64 {
        return Err(DomainError::InvalidExtents {
            reason: format!("{axis} extent sums to {sum}, global has {cells} cells"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DomainSpec {
        DomainSpec::new(Extent::new(1, 10, 1, 10), Layout::new(2, 2))
    }

    #[test]
    fn defaults_validate() {
        let s = base();
        assert!(s.validate().is_ok());
        assert_eq!(s.name, "domain");
        assert_eq!(s.active_divisions(), 4);
    }

    #[test]
    fn first_failure_wins() {
        // Degenerate extent and negative halo: extent reported.
        let s = DomainSpec::new(Extent::new(1, 0, 1, 10), Layout::new(2, 2))
            .with_halo(HaloWidths::uniform(-1));
        assert!(matches!(
            s.validate(),
            Err(DomainError::DegenerateExtent { .. })
        ));
        let s = base()
            .with_halo(HaloWidths::new(1, 1, 1, -2))
            .with_mask(vec![true]);
        assert_eq!(
            s.validate(),
            Err(DomainError::InvalidHalo {
                side: "north",
                width: -2
            })
        );
    }

    #[test]
    fn halo_wider_than_axis_rejected() {
        let s = base().with_halo(HaloWidths::new(10, 10, 10, 10));
        assert!(s.validate().is_ok());
        let s = base()
            .with_halo(HaloWidths::new(1, 1, 1_000_000, 1))
            .with_boundaries(XBoundary::Cyclic, YBoundary::FoldNorth);
        assert_eq!(
            s.validate(),
            Err(DomainError::InvalidHalo {
                side: "south",
                width: 1_000_000
            })
        );
        let s = DomainSpec::new(Extent::new(1, 12, 1, 4), Layout::new(1, 1))
            .with_halo(HaloWidths::xy(12, 5));
        assert_eq!(
            s.validate(),
            Err(DomainError::InvalidHalo {
                side: "south",
                width: 5
            })
        );
    }

    #[test]
    fn layout_larger_than_grid_rejected() {
        let s = DomainSpec::new(Extent::new(1, 3, 1, 3), Layout::new(4, 1));
        assert!(matches!(s.validate(), Err(DomainError::InvalidLayout { .. })));
        let s = DomainSpec::new(Extent::new(1, 3, 1, 3), Layout::new(0, 1));
        assert!(matches!(s.validate(), Err(DomainError::InvalidLayout { .. })));
    }

    #[test]
    fn explicit_extents_checked() {
        let s = base().with_extents(vec![3, 7], vec![5, 5]);
        assert!(s.validate().is_ok());
        let s = base().with_extents(vec![3, 6], vec![5, 5]);
        assert!(matches!(s.validate(), Err(DomainError::InvalidExtents { .. })));
        let s = base().with_extents(vec![10, 0], vec![5, 5]);
        assert!(matches!(s.validate(), Err(DomainError::InvalidExtents { .. })));
        let s = base().with_extents(vec![10], vec![5, 5]);
        assert!(matches!(s.validate(), Err(DomainError::InvalidExtents { .. })));
    }

    #[test]
    fn mask_shape_checked() {
        let s = base().with_mask(vec![true, false, true]);
        assert!(matches!(s.validate(), Err(DomainError::InvalidMask { .. })));
        let s = base().with_mask(vec![true, false, true, true]);
        assert!(s.validate().is_ok());
        assert_eq!(s.active_divisions(), 3);
    }

    #[test]
    fn mosaic_range_checked() {
        let s = base().with_mosaic(Mosaic {
            tile_id: 6,
            tile_count: 6,
            complete: true,
        });
        assert!(s.validate().is_err());
    }
}
