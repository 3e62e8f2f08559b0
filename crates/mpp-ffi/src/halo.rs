//! Halo updates on caller-owned buffers.
//!
//! The buffer must cover the domain's memory domain times `nz` levels,
//! `i` fastest then `j` then `k`. It is copied into a [`Field`], updated,
//! and copied back; a failed update leaves it untouched.

use mpp_core::{HaloElement, HaloWidths};
use mpp_domain::{update_halo, DomainId, Directions, Field, FoldSign, UpdateOptions};

use crate::context::with_state;
use crate::error::{finish, Failure};
use crate::ptr;
use crate::types::MppUpdateOptions;

fn options(raw: Option<&MppUpdateOptions>) -> Result<UpdateOptions, Failure> {
    let Some(raw) = raw else {
        return Ok(UpdateOptions::default());
    };
    let directions = match raw.directions {
        0 => Directions::ALL,
        bits => u8::try_from(bits)
            .ok()
            .and_then(Directions::from_bits)
            .ok_or_else(|| Failure::arg(format!("unknown direction flags {bits:#x}")))?,
    };
    let mut opts = UpdateOptions::default().with_directions(directions);
    if raw.use_halo != 0 {
        let [w, e, s, n] = raw.halo;
        opts = opts.with_halo(HaloWidths::new(w, e, s, n));
    }
    if raw.flip_fold_sign != 0 {
        opts = opts.with_fold_sign(FoldSign::Flip);
    }
    Ok(opts)
}

/// Shared body of the typed update symbols.
///
/// # Safety
///
/// `buf` must point to `len` values of `T`; `opts` must be null or valid.
#[allow(unsafe_code)]
unsafe fn update_buffer<T: HaloElement>(
    domain: u64,
    buf: *mut T,
    len: usize,
    nz: usize,
    opts: *const MppUpdateOptions,
) -> Result<(), Failure> {
    // SAFETY: opts is null or valid per caller contract.
    let opts = options(unsafe { opts.as_ref() })?;
    with_state(|st| {
        let d = st.registry.domain(DomainId::from_raw(domain))?;
        let memory = d.memory_domain()?;
        // SAFETY: buf points to len values per caller contract.
        let data = unsafe { ptr::slice_mut(buf, len, "buf")? };
        let mut field = Field::from_vec(memory, nz, data.to_vec())?;
        update_halo(&mut st.ctx, d, &mut field, &opts)?;
        data.copy_from_slice(field.as_slice());
        Ok(())
    })
}

/// Fill the halo of a single-precision field.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_update_domains_r4(
    domain: u64,
    buf: *mut f32,
    len: usize,
    nz: usize,
    opts: *const MppUpdateOptions,
) -> i32 {
    // SAFETY: forwarded caller contract.
    ffi_guard!({ finish(unsafe { update_buffer(domain, buf, len, nz, opts) }) })
}

/// Fill the halo of a double-precision field.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_update_domains_r8(
    domain: u64,
    buf: *mut f64,
    len: usize,
    nz: usize,
    opts: *const MppUpdateOptions,
) -> i32 {
    // SAFETY: forwarded caller contract.
    ffi_guard!({ finish(unsafe { update_buffer(domain, buf, len, nz, opts) }) })
}

/// Fill the halo of a 32-bit integer field.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_update_domains_i32(
    domain: u64,
    buf: *mut i32,
    len: usize,
    nz: usize,
    opts: *const MppUpdateOptions,
) -> i32 {
    // SAFETY: forwarded caller contract.
    ffi_guard!({ finish(unsafe { update_buffer(domain, buf, len, nz, opts) }) })
}
