//! Test utilities for mpp development.
//!
//! [`run_spmd`] runs a closure on N simulated ranks with a short receive
//! timeout, so tests that provoke a hang fail in well under a second.
//! The [`fixtures`] module builds fields whose interior values encode
//! their own global index, which makes halo contents checkable against
//! the boundary mapping.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::time::Duration;

use mpp_comm::{launch, CommConfig, CommError, MppContext};

/// Transport settings for tests: 2 s receive timeout, 1 ms polling.
pub fn test_config() -> CommConfig {
    CommConfig {
        collective_timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(1),
    }
}

/// Transport settings for tests that expect a timeout.
pub fn short_timeout_config() -> CommConfig {
    CommConfig {
        collective_timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(2),
    }
}

/// Run `f` on `npes` ranks with [`test_config`]; results in rank order.
pub fn run_spmd<F, R>(npes: usize, f: F) -> Result<Vec<R>, CommError>
where
    F: Fn(&mut MppContext) -> R + Sync,
    R: Send,
{
    init_logging();
    launch(npes, test_config(), f)
}

/// Install `env_logger` once per test binary. Respects `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
