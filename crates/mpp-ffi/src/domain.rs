//! Layout solving, domain definition, queries and overrides.

use mpp_core::{CommError, DomainError, DomainResult, Extent, HaloWidths, Layout};
use mpp_domain::{solve_layout, Domain, DomainId, DomainSpec, Mosaic};

use crate::context::{read_ranks, with_state, FfiState};
use crate::error::{finish, Failure};
use crate::ptr;
use crate::types::{self, MppDomainSpec};

/// Choose a layout for `ndivs` divisions of `global` (`[is, ie, js, je]`)
/// and write `[x, y]` into `layout_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_define_layout(global: *const i32, ndivs: i32, layout_out: *mut i32) -> i32 {
    ffi_guard!({
        finish((|| {
            // SAFETY: global points to four i32s per caller contract.
            let global = unsafe { ptr::read_extent(global, "global")? };
            let layout = solve_layout(&global, ndivs)?;
            // SAFETY: layout_out points to two i32s per caller contract.
            let out = unsafe { ptr::slice_mut(layout_out, 2, "layout_out")? };
            out[0] = layout.x as i32;
            out[1] = layout.y as i32;
            Ok(())
        })())
    })
}

/// Translate the C argument block.
///
/// # Safety
///
/// Every non-null pointer in `raw` must point to as many values as its
/// documentation states.
#[allow(unsafe_code)]
unsafe fn build_spec(st: &FfiState, raw: &MppDomainSpec) -> Result<DomainSpec, Failure> {
    let (lx, ly) = match (u32::try_from(raw.layout[0]), u32::try_from(raw.layout[1])) {
        (Ok(x), Ok(y)) => (x, y),
        _ => {
            return Err(DomainError::InvalidLayout {
                reason: format!("negative layout {:?}", raw.layout),
            }
            .into())
        }
    };
    let layout = Layout::new(lx, ly);
    let x_boundary = types::x_boundary(raw.x_boundary)
        .ok_or_else(|| Failure::arg(format!("unknown x boundary code {}", raw.x_boundary)))?;
    let y_boundary = types::y_boundary(raw.y_boundary)
        .ok_or_else(|| Failure::arg(format!("unknown y boundary code {}", raw.y_boundary)))?;
    let [west, east, south, north] = raw.halo;

    let mut spec = DomainSpec::new(Extent::from_array(raw.global), layout)
        .with_halo(HaloWidths::new(west, east, south, north))
        .with_boundaries(x_boundary, y_boundary)
        .with_cyclic_offset(raw.cyclic_offset[0], raw.cyclic_offset[1]);

    if !raw.mask.is_null() {
        // SAFETY: mask points to ndivs bytes per caller contract.
        let mask = unsafe { ptr::slice(raw.mask, layout.ndivs(), "mask")? };
        spec = spec.with_mask(mask.iter().map(|&m| m != 0).collect());
    }
    if !raw.x_extent.is_null() {
        // SAFETY: x_extent points to layout.x values per caller contract.
        let xs = unsafe { ptr::slice(raw.x_extent, lx as usize, "x_extent")? };
        spec.x_extent = Some(xs.to_vec());
    }
    if !raw.y_extent.is_null() {
        // SAFETY: y_extent points to layout.y values per caller contract.
        let ys = unsafe { ptr::slice(raw.y_extent, ly as usize, "y_extent")? };
        spec.y_extent = Some(ys.to_vec());
    }
    if raw.memory_size != [0, 0] {
        spec = spec.with_memory_size(raw.memory_size[0], raw.memory_size[1]);
    }
    if raw.tile_count > 0 {
        spec = spec.with_mosaic(Mosaic {
            tile_id: raw.tile_id,
            tile_count: raw.tile_count,
            complete: raw.mosaic_complete != 0,
        });
    }
    if !raw.pelist.is_null() {
        // SAFETY: pelist points to pelist_len values per caller contract.
        let members = unsafe { read_ranks(raw.pelist, raw.pelist_len, "pelist")? };
        let pelist = st
            .ctx
            .pelist_by_members(&members)
            .ok_or_else(|| CommError::UndeclaredPelist {
                members: members.clone(),
            })?;
        spec = spec.with_pelist(pelist.clone());
    }
    // SAFETY: name is null or NUL-terminated per caller contract.
    if let Some(name) = unsafe { ptr::opt_str(raw.name, "name")? } {
        spec = spec.with_name(name);
    }
    Ok(spec)
}

/// Define a domain and write its handle into `domain_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_define_domains(spec: *const MppDomainSpec, domain_out: *mut u64) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            if spec.is_null() {
                return Err(Failure::arg("spec is null"));
            }
            if domain_out.is_null() {
                return Err(Failure::arg("domain_out is null"));
            }
            // SAFETY: spec is non-null and valid per caller contract.
            let raw = unsafe { &*spec };
            // SAFETY: pointers inside spec are valid per caller contract.
            let spec = unsafe { build_spec(st, raw)? };
            let id = st.registry.define_domain(&st.ctx, &spec)?;
            // SAFETY: domain_out is non-null and valid per caller contract.
            unsafe { ptr::write(domain_out, id.to_raw(), "domain_out") }
        }))
    })
}

/// Destroy a domain. Its handle becomes stale.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_domain_destroy(domain: u64) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            st.registry.destroy_domain(DomainId::from_raw(domain))?;
            Ok(())
        }))
    })
}

// ── Queries ────────────────────────────────────────────────────────

#[allow(unsafe_code)]
fn get_extent(domain: u64, out: *mut i32, query: impl FnOnce(&Domain) -> DomainResult<Extent>) -> i32 {
    finish(with_state(|st| {
        let d = st.registry.domain(DomainId::from_raw(domain))?;
        let e = query(d)?;
        // SAFETY: out points to four i32s per caller contract.
        unsafe { ptr::write_extent(out, e, "out") }
    }))
}

/// Write this rank's compute domain `[is, ie, js, je]` into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_get_compute_domain(domain: u64, out: *mut i32) -> i32 {
    ffi_guard!({ get_extent(domain, out, Domain::compute_domain) })
}

/// Write this rank's data domain into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_get_data_domain(domain: u64, out: *mut i32) -> i32 {
    ffi_guard!({ get_extent(domain, out, Domain::data_domain) })
}

/// Write the global domain into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_get_global_domain(domain: u64, out: *mut i32) -> i32 {
    ffi_guard!({ get_extent(domain, out, |d| Ok(d.global_domain())) })
}

/// Write this rank's memory domain into `out`. Field buffers passed to
/// `mpp_update_domains_*` must cover exactly this extent.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_get_memory_domain(domain: u64, out: *mut i32) -> i32 {
    ffi_guard!({ get_extent(domain, out, Domain::memory_domain) })
}

// ── Overrides ──────────────────────────────────────────────────────

#[allow(unsafe_code)]
fn set_extent(
    domain: u64,
    extent: *const i32,
    apply: impl FnOnce(&mut Domain, Extent) -> DomainResult<()>,
) -> i32 {
    finish(with_state(|st| {
        // SAFETY: extent points to four i32s per caller contract.
        let e = unsafe { ptr::read_extent(extent, "extent")? };
        let d = st.registry.domain_mut(DomainId::from_raw(domain))?;
        apply(d, e)?;
        Ok(())
    }))
}

/// Override this rank's compute domain. The exchange plan is not rebuilt.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_set_compute_domain(domain: u64, extent: *const i32) -> i32 {
    ffi_guard!({ set_extent(domain, extent, Domain::set_compute_domain) })
}

/// Override this rank's data domain; the memory domain follows it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_set_data_domain(domain: u64, extent: *const i32) -> i32 {
    ffi_guard!({ set_extent(domain, extent, Domain::set_data_domain) })
}
