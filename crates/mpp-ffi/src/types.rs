//! C-compatible enums, flag constants and argument structs.

use std::ffi::c_char;

use mpp_core::{Severity, XBoundary, YBoundary};

/// Error severity reported by `mpp_last_error`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MppSeverity {
    /// Informational.
    Note = 0,
    /// Local argument error; the call may be retried.
    Warning = 1,
    /// The process group is unusable.
    Fatal = 2,
}

impl From<Severity> for MppSeverity {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Note => MppSeverity::Note,
            Severity::Warning => MppSeverity::Warning,
            Severity::Fatal => MppSeverity::Fatal,
        }
    }
}

/// Topology of the west/east edges.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MppXBoundary {
    /// Hard edge.
    None = 0,
    /// Periodic.
    Cyclic = 1,
    /// West edge folds onto itself.
    FoldWest = 2,
    /// East edge folds onto itself.
    FoldEast = 3,
}

/// Topology of the south/north edges.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MppYBoundary {
    /// Hard edge.
    None = 0,
    /// Periodic.
    Cyclic = 1,
    /// South edge folds onto itself.
    FoldSouth = 2,
    /// North edge folds onto itself (tripolar).
    FoldNorth = 3,
}

pub(crate) fn x_boundary(code: i32) -> Option<XBoundary> {
    match code {
        c if c == MppXBoundary::None as i32 => Some(XBoundary::None),
        c if c == MppXBoundary::Cyclic as i32 => Some(XBoundary::Cyclic),
        c if c == MppXBoundary::FoldWest as i32 => Some(XBoundary::FoldWest),
        c if c == MppXBoundary::FoldEast as i32 => Some(XBoundary::FoldEast),
        _ => None,
    }
}

pub(crate) fn y_boundary(code: i32) -> Option<YBoundary> {
    match code {
        c if c == MppYBoundary::None as i32 => Some(YBoundary::None),
        c if c == MppYBoundary::Cyclic as i32 => Some(YBoundary::Cyclic),
        c if c == MppYBoundary::FoldSouth as i32 => Some(YBoundary::FoldSouth),
        c if c == MppYBoundary::FoldNorth as i32 => Some(YBoundary::FoldNorth),
        _ => None,
    }
}

// ── Direction flags for MppUpdateOptions::directions ───────────────

/// West edge strip.
pub const MPP_WEST: u32 = 1;
/// East edge strip.
pub const MPP_EAST: u32 = 2;
/// South edge strip.
pub const MPP_SOUTH: u32 = 4;
/// North edge strip.
pub const MPP_NORTH: u32 = 8;
/// South-west corner.
pub const MPP_SOUTH_WEST: u32 = 16;
/// South-east corner.
pub const MPP_SOUTH_EAST: u32 = 32;
/// North-west corner.
pub const MPP_NORTH_WEST: u32 = 64;
/// North-east corner.
pub const MPP_NORTH_EAST: u32 = 128;
/// Every halo region.
pub const MPP_ALL_DIRECTIONS: u32 = 255;

// ── Argument structs ───────────────────────────────────────────────

/// Arguments to `mpp_define_domains`.
///
/// Extents are `[is, ie, js, je]`, halo widths `[west, east, south, north]`.
/// Every pointer may be null, meaning "not given".
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct MppDomainSpec {
    /// Global index extent.
    pub global: [i32; 4],
    /// Divisions along x and y.
    pub layout: [i32; 2],
    /// Halo widths.
    pub halo: [i32; 4],
    /// An `MppXBoundary` code.
    pub x_boundary: i32,
    /// An `MppYBoundary` code.
    pub y_boundary: i32,
    /// Index shift applied when crossing the x and y cyclic edges.
    pub cyclic_offset: [i32; 2],
    /// Minimum memory domain size; `[0, 0]` for none.
    pub memory_size: [i32; 2],
    /// `layout[0] * layout[1]` flags, x fastest; 0 marks a masked division.
    pub mask: *const u8,
    /// `layout[0]` division widths along x.
    pub x_extent: *const i32,
    /// `layout[1]` division widths along y.
    pub y_extent: *const i32,
    /// Members of a declared pelist; null for the current pelist.
    pub pelist: *const i32,
    /// Length of `pelist`.
    pub pelist_len: usize,
    /// This domain's mosaic tile id.
    pub tile_id: u32,
    /// Tiles in the mosaic; 0 when the domain is not part of one.
    pub tile_count: u32,
    /// Nonzero if the mosaic tiles cover the whole mosaic.
    pub mosaic_complete: u8,
    /// NUL-terminated name, or null.
    pub name: *const c_char,
}

/// Per-call options for `mpp_update_domains_*`. A null pointer means
/// all directions, the domain's halo widths and no sign flip.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MppUpdateOptions {
    /// `MPP_*` direction flags; 0 means all.
    pub directions: u32,
    /// Nonzero to use `halo` instead of the domain's widths.
    pub use_halo: u8,
    /// Narrower widths for this call.
    pub halo: [i32; 4],
    /// Nonzero to negate values crossing a fold.
    pub flip_fold_sign: u8,
}

/// Arguments to `mpp_define_nest_domains`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct MppNestSpec {
    /// Handle of the fine domain.
    pub fine: u64,
    /// Handle of the coarse domain.
    pub coarse: u64,
    /// Mosaic tile of the fine domain.
    pub tile_fine: u32,
    /// Mosaic tile of the coarse domain.
    pub tile_coarse: u32,
    /// Coarse window: `[istart, icount, jstart, jcount]`.
    pub window: [i32; 4],
    /// Fine cells per coarse cell along x and y.
    pub refine: [i32; 2],
    /// Extra coarse cells around the window.
    pub extra_halo: i32,
    /// Ranks per nest tile.
    pub npes_nest_tile: *const u32,
    /// Length of `npes_nest_tile`.
    pub n_tiles: usize,
}
