//! C FFI bindings for the mpp domain decomposition layer.
//!
//! Exposes a fixed C-compatible function table over a single-rank
//! context. Every function returns an `i32` status (`0` on success,
//! negative [`MppStatus`] codes on failure) and records a message and
//! severity retrievable with [`mpp_last_error`]. Domains and nests cross
//! the boundary as `u64` handles. The header is generated into
//! `include/mpp.h` by the build script.
//!
//! This is the only crate in the workspace that may contain `unsafe`
//! code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, turning a panic into [`MppStatus::Panicked`].
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(payload) => $crate::error::record_panic(payload.as_ref()),
        }
    };
}

/// Lock a mutex inside a function returning `Result<_, Failure>`.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return Err($crate::error::Failure::poisoned()),
        }
    };
}

mod ptr;

pub mod context;
pub mod domain;
pub mod error;
pub mod halo;
pub mod nest;
pub mod status;
pub mod types;

pub use context::{
    mpp_calendar, mpp_declare_pelist, mpp_end, mpp_get_current_pelist, mpp_init, mpp_npes,
    mpp_pe, mpp_root_pe, mpp_set_current_pelist,
};
pub use domain::{
    mpp_define_domains, mpp_define_layout, mpp_domain_destroy, mpp_get_compute_domain,
    mpp_get_data_domain, mpp_get_global_domain, mpp_get_memory_domain, mpp_set_compute_domain,
    mpp_set_data_domain,
};
pub use error::mpp_last_error;
pub use halo::{mpp_update_domains_i32, mpp_update_domains_r4, mpp_update_domains_r8};
pub use nest::{mpp_define_nest_domains, mpp_nest_domain_destroy};
pub use status::MppStatus;
pub use types::{MppDomainSpec, MppNestSpec, MppSeverity, MppUpdateOptions, MppXBoundary, MppYBoundary};

/// Serializes unit tests that touch the process-wide library state.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
