//! Fine/coarse nest linkage.
//!
//! A nest places a refined domain over a window of a coarse one. Only
//! the geometry is recorded; no data moves when a nest is defined.

use log::debug;
use mpp_core::{DomainError, DomainResult, Extent};

use crate::domain::Domain;
use crate::registry::DomainId;

/// The coarse cells a nest covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoarseWindow {
    /// First coarse x index.
    pub istart: i32,
    /// Coarse cells along x.
    pub icount: i32,
    /// First coarse y index.
    pub jstart: i32,
    /// Coarse cells along y.
    pub jcount: i32,
}

impl CoarseWindow {
    /// The window as an extent on the coarse grid.
    pub fn extent(&self) -> Extent {
        Extent::new(
            self.istart,
            self.istart + self.icount - 1,
            self.jstart,
            self.jstart + self.jcount - 1,
        )
    }
}

/// Parameters of a nest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestSpec {
    /// The refined domain.
    pub fine: DomainId,
    /// The domain it sits in.
    pub coarse: DomainId,
    /// Mosaic tile of the fine domain.
    pub tile_fine: u32,
    /// Mosaic tile of the coarse domain.
    pub tile_coarse: u32,
    /// Coarse cells covered.
    pub window: CoarseWindow,
    /// Fine cells per coarse cell, `(x, y)`.
    pub refine: (i32, i32),
    /// Extra coarse cells around the window for interpolation stencils.
    pub extra_halo: i32,
    /// Ranks running each nest tile.
    pub npes_nest_tile: Vec<u32>,
}

impl NestSpec {
    /// Check the parameters that do not depend on either domain.
    pub fn validate(&self) -> DomainResult<()> {
        let w = &self.window;
        let problem = if self.refine.0 < 1 || self.refine.1 < 1 {
            Some(format!("refine ratio {:?} must be at least 1", self.refine))
        } else if w.icount < 1 || w.jcount < 1 {
            Some(format!(
                "window counts ({}, {}) must be at least 1",
                w.icount, w.jcount
            ))
        } else if self.extra_halo < 0 {
            Some(format!("extra halo {} is negative", self.extra_halo))
        } else if self.npes_nest_tile.contains(&0) {
            Some("a nest tile has no ranks".to_string())
        } else {
            None
        };
        match problem {
            Some(reason) => Err(DomainError::InvalidNest { reason }),
            None => Ok(()),
        }
    }
}

/// A defined nest: both global extents and the window between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestDomain {
    spec: NestSpec,
    fine_global: Extent,
    coarse_global: Extent,
}

impl NestDomain {
    /// Link `fine` into `coarse`.
    ///
    /// The refined window must fit in the fine domain and the window
    /// itself must lie inside the coarse domain.
    pub fn new(fine: &Domain, coarse: &Domain, spec: NestSpec) -> DomainResult<Self> {
        spec.validate()?;
        let fg = fine.global_domain();
        let cg = coarse.global_domain();
        let w = spec.window;
        let (rx, ry) = spec.refine;

        fits("x", w.icount as i64 * rx as i64, fg.x_len() as i64)?;
        fits("y", w.jcount as i64 * ry as i64, fg.y_len() as i64)?;
        inside("x", w.istart, w.icount, cg.x_begin, cg.x_end)?;
        inside("y", w.jstart, w.jcount, cg.y_begin, cg.y_end)?;

        debug!(
            "nest '{}' in '{}': coarse window {} refined {rx}x{ry}",
            fine.name(),
            coarse.name(),
            w.extent()
        );
        Ok(Self {
            spec,
            fine_global: fg,
            coarse_global: cg,
        })
    }

    /// The parameters given at definition.
    pub fn spec(&self) -> &NestSpec {
        &self.spec
    }

    /// The fine domain's handle.
    pub fn fine(&self) -> DomainId {
        self.spec.fine
    }

    /// The coarse domain's handle.
    pub fn coarse(&self) -> DomainId {
        self.spec.coarse
    }

    /// Coarse cells covered.
    pub fn window(&self) -> Extent {
        self.spec.window.extent()
    }

    /// Coarse cell containing fine cell `(i, j)`.
    ///
    /// Fine cells past the refined window map past the window's edge.
    pub fn fine_to_coarse(&self, i: i32, j: i32) -> (i32, i32) {
        let w = &self.spec.window;
        let (rx, ry) = self.spec.refine;
        (
            w.istart + (i - self.fine_global.x_begin).div_euclid(rx),
            w.jstart + (j - self.fine_global.y_begin).div_euclid(ry),
        )
    }

    /// Fine cells inside coarse cell `(ic, jc)`.
    pub fn coarse_to_fine(&self, ic: i32, jc: i32) -> Extent {
        let w = &self.spec.window;
        let (rx, ry) = self.spec.refine;
        let xb = self.fine_global.x_begin + (ic - w.istart) * rx;
        let yb = self.fine_global.y_begin + (jc - w.jstart) * ry;
        Extent::new(xb, xb + rx - 1, yb, yb + ry - 1)
    }

    /// Coarse cells needed to interpolate onto `fine`: the covering
    /// coarse extent grown by the extra halo and clipped to the coarse
    /// grid.
    pub fn coarse_bounds_for(&self, fine: &Extent) -> Option<Extent> {
        if fine.is_degenerate() {
            return None;
        }
        let (xb, yb) = self.fine_to_coarse(fine.x_begin, fine.y_begin);
        let (xe, ye) = self.fine_to_coarse(fine.x_end, fine.y_end);
        let h = self.spec.extra_halo;
        Extent::new(xb - h, xe + h, yb - h, ye + h).intersect(&self.coarse_global)
    }
}

fn fits(axis: &'static str, required: i64, available: i64) -> DomainResult<()> {
    if required > available {
        return Err(DomainError::NestExtentMismatch {
            axis,
            required,
            available,
        });
    }
    Ok(())
}

fn inside(axis: &'static str, start: i32, count: i32, lo: i32, hi: i32) -> DomainResult<()> {
    let end = start as i64 + count as i64 - 1;
    if (start as i64) < lo as i64 || end > hi as i64 {
        // Span from the lower of the two starts to the higher of the two
        // ends, against the coarse axis length.
        let required = end.max(hi as i64) - (start as i64).min(lo as i64) + 1;
        return Err(DomainError::NestExtentMismatch {
            axis,
            required,
            available: hi as i64 - lo as i64 + 1,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::DomainSpec;
    use mpp_arena::Arena;
    use mpp_comm::Pelist;
    use mpp_core::{Layout, Rank};

    fn domain(nx: i32, ny: i32) -> Domain {
        let s = DomainSpec::new(Extent::new(1, nx, 1, ny), Layout::new(1, 1));
        Domain::define_for(&s, Pelist::world(1), Rank(0)).unwrap()
    }

    fn ids() -> (DomainId, DomainId) {
        let mut a: Arena<Domain> = Arena::new();
        (a.insert(domain(2, 2)), a.insert(domain(2, 2)))
    }

    fn spec(window: CoarseWindow, refine: (i32, i32)) -> NestSpec {
        let (fine, coarse) = ids();
        NestSpec {
            fine,
            coarse,
            tile_fine: 1,
            tile_coarse: 0,
            window,
            refine,
            extra_halo: 1,
            npes_nest_tile: vec![1, 1],
        }
    }

    fn window(istart: i32, icount: i32, jstart: i32, jcount: i32) -> CoarseWindow {
        CoarseWindow {
            istart,
            icount,
            jstart,
            jcount,
        }
    }

    #[test]
    fn mapping_round_trips_cells() {
        let n = NestDomain::new(&domain(30, 20), &domain(40, 40), spec(window(11, 10, 21, 5), (3, 4)))
            .unwrap();
        assert_eq!(n.fine_to_coarse(1, 1), (11, 21));
        assert_eq!(n.fine_to_coarse(3, 4), (11, 21));
        assert_eq!(n.fine_to_coarse(4, 5), (12, 22));
        assert_eq!(n.coarse_to_fine(12, 22), Extent::new(4, 6, 5, 8));
        assert_eq!(n.window(), Extent::new(11, 20, 21, 25));
    }

    #[test]
    fn coarse_bounds_include_extra_halo_and_clip() {
        let n = NestDomain::new(&domain(30, 20), &domain(40, 40), spec(window(1, 10, 21, 5), (3, 4)))
            .unwrap();
        let b = n.coarse_bounds_for(&Extent::new(1, 6, 5, 8)).unwrap();
        // Covers coarse (1..2, 22..22); grown by 1 and clipped at x = 1.
        assert_eq!(b, Extent::new(1, 3, 21, 23));
    }

    #[test]
    fn too_small_fine_domain_rejected() {
        let err = NestDomain::new(&domain(29, 20), &domain(40, 40), spec(window(1, 10, 1, 5), (3, 4)))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::NestExtentMismatch {
                axis: "x",
                required: 30,
                available: 29
            }
        );
    }

    #[test]
    fn window_outside_coarse_rejected() {
        let err = NestDomain::new(&domain(30, 20), &domain(40, 40), spec(window(35, 10, 1, 5), (3, 4)))
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::NestExtentMismatch { axis: "x", available: 40, .. }
        ));
    }

    #[test]
    fn malformed_specs_rejected_first() {
        let mut s = spec(window(1, 0, 1, 5), (3, 4));
        assert!(matches!(s.validate(), Err(DomainError::InvalidNest { .. })));
        s.window.icount = 10;
        s.refine = (0, 4);
        assert!(matches!(s.validate(), Err(DomainError::InvalidNest { .. })));
        s.refine = (3, 4);
        s.npes_nest_tile = vec![2, 0];
        assert!(matches!(s.validate(), Err(DomainError::InvalidNest { .. })));
        s.npes_nest_tile.clear();
        s.extra_halo = -1;
        // Invalid spec wins over a fine domain that is too small.
        assert!(matches!(
            NestDomain::new(&domain(1, 1), &domain(40, 40), s),
            Err(DomainError::InvalidNest { .. })
        ));
    }
}
