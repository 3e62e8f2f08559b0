//! Run a closure on N simulated ranks.

use std::thread;

use mpp_core::CommError;

use crate::config::CommConfig;
use crate::context::MppContext;
use crate::local::{AbortHandle, LocalUniverse};
use crate::transport::Transport;

/// Aborts the universe if its rank thread unwinds, so peers blocked on
/// it fail fast instead of waiting out the timeout.
struct AbortOnPanic(AbortHandle);

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort("a rank panicked");
        }
    }
}

/// Spawn one thread per rank, each running `f` on its own
/// [`MppContext`], and return the results in rank order.
///
/// A panicking rank aborts the group, and the panic is resumed on the
/// caller once every rank has finished.
pub fn launch<F, R>(npes: usize, config: CommConfig, f: F) -> Result<Vec<R>, CommError>
where
    F: Fn(&mut MppContext) -> R + Sync,
    R: Send,
{
    let universe = LocalUniverse::new(npes, config)?;
    let group = universe.abort_handle();
    let f = &f;
    let joined = thread::scope(|s| {
        let mut handles = Vec::with_capacity(npes);
        for ep in universe.into_endpoints() {
            let name = format!("mpp-rank-{}", ep.rank());
            let guard = AbortOnPanic(ep.abort_handle());
            let spawned = thread::Builder::new().name(name).spawn_scoped(s, move || {
                let _guard = guard;
                let mut ctx = MppContext::new(Box::new(ep));
                f(&mut ctx)
            });
            match spawned {
                Ok(h) => handles.push(h),
                Err(e) => {
                    let reason = format!("failed to spawn rank thread: {e}");
                    group.abort(&reason);
                    return Err(CommError::Aborted { reason });
                }
            }
        }
        Ok(handles.into_iter().map(|h| h.join()).collect::<Vec<_>>())
    })?;

    let mut out = Vec::with_capacity(npes);
    for r in joined {
        match r {
            Ok(v) => out.push(v),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
    Ok(out)
}
