//! Library lifecycle, rank queries and pelist management.
//!
//! The library state is one single-rank [`MppContext`] plus a
//! [`DomainRegistry`], behind a process-wide mutex. Calls made before
//! `mpp_init` or after `mpp_end` return `NotInitialized`.

use std::ffi::c_char;
use std::sync::Mutex;

use log::info;
use mpp_comm::{CommConfig, MppContext};
use mpp_config::InitConfig;
use mpp_core::Rank;
use mpp_domain::DomainRegistry;

use crate::error::{finish, Failure};
use crate::ptr;
use crate::status::MppStatus;

pub(crate) struct FfiState {
    pub(crate) ctx: MppContext,
    pub(crate) registry: DomainRegistry,
    pub(crate) init: InitConfig,
}

static STATE: Mutex<Option<FfiState>> = Mutex::new(None);

/// Run `f` on the initialized library state.
pub(crate) fn with_state<R>(f: impl FnOnce(&mut FfiState) -> Result<R, Failure>) -> Result<R, Failure> {
    let mut guard = ffi_lock!(STATE);
    match guard.as_mut() {
        Some(state) => f(state),
        None => Err(Failure::with_status(
            MppStatus::NotInitialized,
            "mpp_init has not been called",
        )),
    }
}

/// Read `n` ranks from a C array.
///
/// # Safety
///
/// `p` must be null or point to `n` `i32`s.
#[allow(unsafe_code)]
pub(crate) unsafe fn read_ranks(p: *const i32, n: usize, what: &str) -> Result<Vec<Rank>, Failure> {
    // SAFETY: forwarded caller contract.
    let raw = unsafe { ptr::slice(p, n, what)? };
    raw.iter()
        .map(|&r| {
            u32::try_from(r)
                .map(Rank)
                .map_err(|_| Failure::arg(format!("{what} holds negative rank {r}")))
        })
        .collect()
}

// ── Lifecycle ──────────────────────────────────────────────────────

/// Initialize the library.
///
/// `config_yaml` is null or NUL-terminated YAML for the init settings
/// (`alt_input_nml_path`, `comm_handle`, `calendar`). Returns
/// `AlreadyInitialized` if called twice without `mpp_end`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_init(config_yaml: *const c_char) -> i32 {
    ffi_guard!({
        finish((|| {
            // SAFETY: config_yaml is null or NUL-terminated per caller contract.
            let text = unsafe { ptr::opt_str(config_yaml, "config_yaml")? };
            let init = match text {
                Some(t) => InitConfig::from_yaml_str(t)?,
                None => InitConfig::default(),
            };
            init.validate()?;

            let mut guard = ffi_lock!(STATE);
            if guard.is_some() {
                return Err(Failure::with_status(
                    MppStatus::AlreadyInitialized,
                    "mpp_init called twice",
                ));
            }
            let ctx = MppContext::single(CommConfig::default())?;
            info!("mpp initialized, calendar {}", init.calendar);
            *guard = Some(FfiState {
                ctx,
                registry: DomainRegistry::new(),
                init,
            });
            Ok(())
        })())
    })
}

/// Shut the library down, releasing every domain and nest.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_end() -> i32 {
    ffi_guard!({
        finish((|| {
            let mut guard = ffi_lock!(STATE);
            match guard.take() {
                Some(state) => {
                    info!(
                        "mpp shut down with {} domains and {} nests live",
                        state.registry.domain_count(),
                        state.registry.nest_count()
                    );
                    Ok(())
                }
                None => Err(Failure::with_status(
                    MppStatus::NotInitialized,
                    "mpp_end without mpp_init",
                )),
            }
        })())
    })
}

/// Write the calendar code chosen at init into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_calendar(out: *mut i32) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            // SAFETY: out is valid per caller contract.
            unsafe { ptr::write(out, st.init.calendar as i32, "out") }
        }))
    })
}

// ── Rank queries ───────────────────────────────────────────────────

/// Write this process's rank into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_pe(out: *mut i32) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            // SAFETY: out is valid per caller contract.
            unsafe { ptr::write(out, st.ctx.rank().0 as i32, "out") }
        }))
    })
}

/// Write the size of the current pelist into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_npes(out: *mut i32) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            // SAFETY: out is valid per caller contract.
            unsafe { ptr::write(out, st.ctx.size() as i32, "out") }
        }))
    })
}

/// Write the root rank of the current pelist into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_root_pe(out: *mut i32) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            // SAFETY: out is valid per caller contract.
            unsafe { ptr::write(out, st.ctx.root_pe().0 as i32, "out") }
        }))
    })
}

// ── Pelists ────────────────────────────────────────────────────────

/// Declare a pelist of `n` ranks, optionally named.
///
/// Redeclaring the same members returns the existing id. `id_out` may be
/// null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_declare_pelist(
    ranks: *const i32,
    n: usize,
    name: *const c_char,
    id_out: *mut u32,
) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            // SAFETY: ranks points to n values per caller contract.
            let members = unsafe { read_ranks(ranks, n, "ranks")? };
            // SAFETY: name is null or NUL-terminated per caller contract.
            let name = unsafe { ptr::opt_str(name, "name")? };
            let pelist = st.ctx.declare_pelist(&members, name)?;
            if !id_out.is_null() {
                // SAFETY: id_out is valid per caller contract.
                unsafe { ptr::write(id_out, pelist.id().0, "id_out")? };
            }
            Ok(())
        }))
    })
}

/// Make a declared pelist current. Null `ranks` resets to the world.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_set_current_pelist(ranks: *const i32, n: usize) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            if ranks.is_null() {
                st.ctx.set_current_pelist(None)?;
                return Ok(());
            }
            // SAFETY: ranks points to n values per caller contract.
            let members = unsafe { read_ranks(ranks, n, "ranks")? };
            st.ctx.set_current_pelist(Some(&members))?;
            Ok(())
        }))
    })
}

/// Copy the current pelist's members into `buf`.
///
/// `n_out` always receives the member count. Returns `BufferTooSmall`
/// (writing nothing to `buf`) if `cap` is less than that; pass `cap` 0
/// to query the size.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_get_current_pelist(buf: *mut i32, cap: usize, n_out: *mut usize) -> i32 {
    ffi_guard!({
        finish(with_state(|st| {
            let members = st.ctx.get_current_pelist().members();
            // SAFETY: n_out is valid per caller contract.
            unsafe { ptr::write(n_out, members.len(), "n_out")? };
            if cap < members.len() {
                return Err(Failure::with_status(
                    MppStatus::BufferTooSmall,
                    format!("pelist has {} members, buffer holds {cap}", members.len()),
                ));
            }
            // SAFETY: buf points to cap values per caller contract.
            let out = unsafe { ptr::slice_mut(buf, members.len(), "buf")? };
            for (o, r) in out.iter_mut().zip(members) {
                *o = r.0 as i32;
            }
            Ok(())
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn fresh() -> std::sync::MutexGuard<'static, ()> {
        let lock = crate::test_lock();
        let _ = mpp_end();
        lock
    }

    #[test]
    fn calls_before_init_are_rejected() {
        let _l = fresh();
        let mut pe = -1;
        assert_eq!(mpp_pe(&mut pe), MppStatus::NotInitialized as i32);
        assert_eq!(mpp_end(), MppStatus::NotInitialized as i32);
    }

    #[test]
    fn init_twice_is_rejected() {
        let _l = fresh();
        assert_eq!(mpp_init(std::ptr::null()), 0);
        assert_eq!(mpp_init(std::ptr::null()), MppStatus::AlreadyInitialized as i32);
        assert_eq!(mpp_end(), 0);
    }

    #[test]
    fn single_rank_queries() {
        let _l = fresh();
        assert_eq!(mpp_init(std::ptr::null()), 0);
        let (mut pe, mut npes, mut root) = (-1, -1, -1);
        assert_eq!(mpp_pe(&mut pe), 0);
        assert_eq!(mpp_npes(&mut npes), 0);
        assert_eq!(mpp_root_pe(&mut root), 0);
        assert_eq!((pe, npes, root), (0, 1, 0));
        assert_eq!(mpp_pe(std::ptr::null_mut()), MppStatus::InvalidArgument as i32);
        assert_eq!(mpp_end(), 0);
    }

    #[test]
    fn init_reads_yaml_settings() {
        let _l = fresh();
        let yaml = CString::new("calendar: julian\n").unwrap();
        assert_eq!(mpp_init(yaml.as_ptr()), 0);
        let mut cal = 0;
        assert_eq!(mpp_calendar(&mut cal), 0);
        assert_eq!(cal, 2);
        assert_eq!(mpp_end(), 0);

        let bad = CString::new("calender: julian\n").unwrap();
        assert_eq!(mpp_init(bad.as_ptr()), MppStatus::ConfigError as i32);
        let mut pe = 0;
        assert_eq!(mpp_pe(&mut pe), MppStatus::NotInitialized as i32);
    }

    #[test]
    fn pelist_declare_set_get() {
        let _l = fresh();
        assert_eq!(mpp_init(std::ptr::null()), 0);
        let ranks = [0i32];
        let name = CString::new("solo").unwrap();
        let mut id = u32::MAX;
        assert_eq!(mpp_declare_pelist(ranks.as_ptr(), 1, name.as_ptr(), &mut id), 0);
        assert_eq!(id, 0, "the lone rank's list is the world");
        assert_eq!(mpp_set_current_pelist(ranks.as_ptr(), 1), 0);

        let mut n = 0usize;
        assert_eq!(
            mpp_get_current_pelist(std::ptr::null_mut(), 0, &mut n),
            MppStatus::BufferTooSmall as i32
        );
        assert_eq!(n, 1);
        let mut buf = [-1i32; 4];
        assert_eq!(mpp_get_current_pelist(buf.as_mut_ptr(), 4, &mut n), 0);
        assert_eq!(buf[0], 0);

        let outsider = [3i32];
        assert_eq!(
            mpp_set_current_pelist(outsider.as_ptr(), 1),
            MppStatus::UndeclaredPelist as i32
        );
        let negative = [-1i32];
        assert_eq!(
            mpp_declare_pelist(negative.as_ptr(), 1, std::ptr::null(), std::ptr::null_mut()),
            MppStatus::InvalidArgument as i32
        );
        assert_eq!(mpp_set_current_pelist(std::ptr::null(), 0), 0);
        assert_eq!(mpp_end(), 0);
    }
}
