//! Thread-local last-error reporting.
//!
//! Every failing call records a message and a severity for the calling
//! thread before returning its status code. `mpp_last_error` copies the
//! most recent record out. Successful calls leave it untouched.

use std::any::Any;
use std::cell::RefCell;
use std::ffi::c_char;

use log::error;
use mpp_config::ConfigError;
use mpp_core::{CommError, DomainError, Severity};

use crate::status::MppStatus;
use crate::types::MppSeverity;

struct LastError {
    message: String,
    severity: Severity,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// A failure on its way to the C caller.
#[derive(Debug)]
pub(crate) struct Failure {
    status: MppStatus,
    message: String,
    severity: Severity,
}

impl Failure {
    /// A bad argument: null pointer, bad enum code, negative count.
    pub(crate) fn arg(message: impl Into<String>) -> Self {
        Self {
            status: MppStatus::InvalidArgument,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub(crate) fn with_status(status: MppStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub(crate) fn poisoned() -> Self {
        Self {
            status: MppStatus::InternalError,
            message: "library state is poisoned by an earlier panic".into(),
            severity: Severity::Fatal,
        }
    }

    /// Record on this thread and hand back the status code.
    pub(crate) fn report(self) -> i32 {
        let code = self.status as i32;
        set(self.message, self.severity);
        code
    }
}

impl From<DomainError> for Failure {
    fn from(e: DomainError) -> Self {
        Self {
            status: MppStatus::from(&e),
            severity: e.severity(),
            message: e.to_string(),
        }
    }
}

impl From<CommError> for Failure {
    fn from(e: CommError) -> Self {
        Self {
            status: MppStatus::from(&e),
            severity: e.severity(),
            message: e.to_string(),
        }
    }
}

impl From<ConfigError> for Failure {
    fn from(e: ConfigError) -> Self {
        Self {
            status: MppStatus::from(&e),
            severity: e.severity(),
            message: e.to_string(),
        }
    }
}

/// Collapse a call result into its status code.
pub(crate) fn finish(result: Result<(), Failure>) -> i32 {
    match result {
        Ok(()) => MppStatus::Ok as i32,
        Err(f) => f.report(),
    }
}

fn set(message: String, severity: Severity) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = Some(LastError { message, severity });
    });
}

/// Record a caught panic as a fatal error.
pub(crate) fn record_panic(payload: &(dyn Any + Send)) -> i32 {
    let what = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    error!("panic caught at the C boundary: {what}");
    set(format!("panic: {what}"), Severity::Fatal);
    MppStatus::Panicked as i32
}

/// Copy the calling thread's last error into `buf`.
///
/// At most `len - 1` bytes of the message are written, followed by a NUL.
/// `buf` may be null when `len` is 0. `severity_out`, if non-null,
/// receives the severity (`NOTE` when no error has been recorded, in
/// which case the message is empty).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn mpp_last_error(buf: *mut c_char, len: usize, severity_out: *mut i32) -> i32 {
    ffi_guard!({
        if buf.is_null() && len > 0 {
            return MppStatus::InvalidArgument as i32;
        }
        LAST_ERROR.with(|cell| {
            let last = cell.borrow();
            let (message, severity) = match last.as_ref() {
                Some(e) => (e.message.as_str(), MppSeverity::from(e.severity)),
                None => ("", MppSeverity::Note),
            };
            if !severity_out.is_null() {
                // SAFETY: severity_out is valid per caller contract.
                unsafe { *severity_out = severity as i32 };
            }
            if len > 0 {
                let bytes = message.as_bytes();
                let copy_len = bytes.len().min(len - 1);
                // SAFETY: buf points to len valid bytes.
                unsafe {
                    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, copy_len);
                    *buf.add(copy_len) = 0;
                }
            }
            MppStatus::Ok as i32
        })
    })
}
