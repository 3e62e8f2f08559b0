//! Raw pointer reads and writes shared by the call table.

use std::ffi::{c_char, CStr};

use mpp_core::Extent;

use crate::error::Failure;

/// Borrow `n` values at `p`. A zero count accepts a null pointer.
///
/// # Safety
///
/// If `n > 0` and `p` is non-null, `p` must point to `n` initialized
/// values that outlive the returned slice.
#[allow(unsafe_code)]
pub(crate) unsafe fn slice<'a, T>(p: *const T, n: usize, what: &str) -> Result<&'a [T], Failure> {
    if n == 0 {
        return Ok(&[]);
    }
    if p.is_null() {
        return Err(Failure::arg(format!("{what} is null")));
    }
    // SAFETY: p points to n valid values per caller contract.
    Ok(unsafe { std::slice::from_raw_parts(p, n) })
}

/// Mutably borrow `n` values at `p`.
///
/// # Safety
///
/// As [`slice`], and nothing else may access the memory meanwhile.
#[allow(unsafe_code)]
pub(crate) unsafe fn slice_mut<'a, T>(
    p: *mut T,
    n: usize,
    what: &str,
) -> Result<&'a mut [T], Failure> {
    if n == 0 {
        return Ok(&mut []);
    }
    if p.is_null() {
        return Err(Failure::arg(format!("{what} is null")));
    }
    // SAFETY: p points to n valid values per caller contract.
    Ok(unsafe { std::slice::from_raw_parts_mut(p, n) })
}

/// Store `value` at `out`.
///
/// # Safety
///
/// `out` must be null or valid for a write of `T`.
#[allow(unsafe_code)]
pub(crate) unsafe fn write<T>(out: *mut T, value: T, what: &str) -> Result<(), Failure> {
    if out.is_null() {
        return Err(Failure::arg(format!("{what} is null")));
    }
    // SAFETY: out is valid per caller contract.
    unsafe { out.write(value) };
    Ok(())
}

/// Read an `[is, ie, js, je]` quadruple.
///
/// # Safety
///
/// `p` must be null or point to four `i32`s.
#[allow(unsafe_code)]
pub(crate) unsafe fn read_extent(p: *const i32, what: &str) -> Result<Extent, Failure> {
    // SAFETY: forwarded caller contract.
    let s = unsafe { slice(p, 4, what)? };
    Ok(Extent::new(s[0], s[1], s[2], s[3]))
}

/// Write an `[is, ie, js, je]` quadruple.
///
/// # Safety
///
/// `out` must be null or valid for four `i32` writes.
#[allow(unsafe_code)]
pub(crate) unsafe fn write_extent(out: *mut i32, e: Extent, what: &str) -> Result<(), Failure> {
    // SAFETY: forwarded caller contract.
    let s = unsafe { slice_mut(out, 4, what)? };
    s.copy_from_slice(&e.to_array());
    Ok(())
}

/// Borrow an optional NUL-terminated UTF-8 string.
///
/// # Safety
///
/// `p` must be null or point to a NUL-terminated string.
#[allow(unsafe_code)]
pub(crate) unsafe fn opt_str<'a>(p: *const c_char, what: &str) -> Result<Option<&'a str>, Failure> {
    if p.is_null() {
        return Ok(None);
    }
    // SAFETY: p is NUL-terminated per caller contract.
    let c = unsafe { CStr::from_ptr(p) };
    c.to_str()
        .map(Some)
        .map_err(|_| Failure::arg(format!("{what} is not valid UTF-8")))
}
