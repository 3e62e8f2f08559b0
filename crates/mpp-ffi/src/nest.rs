//! Nest definition and teardown.

use mpp_domain::{CoarseWindow, DomainId, NestId, NestSpec};

use crate::context::with_state;
use crate::error::{finish, Failure};
use crate::ptr;
use crate::types::MppNestSpec;

/// Link a fine domain to a window of a coarse one and write the nest
/// handle into `nest_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_define_nest_domains(spec: *const MppNestSpec, nest_out: *mut u64) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            // SAFETY: spec is null or valid per caller contract.
            let raw = unsafe { spec.as_ref() }.ok_or_else(|| Failure::arg("spec is null"))?;
            if nest_out.is_null() {
                return Err(Failure::arg("nest_out is null"));
            }
            // SAFETY: npes_nest_tile points to n_tiles values per caller contract.
            let tiles = unsafe { ptr::slice(raw.npes_nest_tile, raw.n_tiles, "npes_nest_tile")? };
            let [istart, icount, jstart, jcount] = raw.window;
            let nest = NestSpec {
                fine: DomainId::from_raw(raw.fine),
                coarse: DomainId::from_raw(raw.coarse),
                tile_fine: raw.tile_fine,
                tile_coarse: raw.tile_coarse,
                window: CoarseWindow {
                    istart,
                    icount,
                    jstart,
                    jcount,
                },
                refine: (raw.refine[0], raw.refine[1]),
                extra_halo: raw.extra_halo,
                npes_nest_tile: tiles.to_vec(),
            };
            let id = st.registry.define_nest_domain(nest)?;
            // SAFETY: nest_out is non-null and valid per caller contract.
            unsafe { ptr::write(nest_out, id.to_raw(), "nest_out") }
        }))
    })
}

/// Destroy a nest. Its handle becomes stale; the linked domains stay.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_nest_domain_destroy(nest: u64) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            st.registry.destroy_nest_domain(NestId::from_raw(nest))?;
            Ok(())
        }))
    })
}
