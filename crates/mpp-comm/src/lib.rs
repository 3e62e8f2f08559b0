//! Process lists, the transport seam and collectives for mpp.
//!
//! Every participating process is a *rank*. Ranks cooperate through an
//! [`MppContext`], which owns a [`Transport`] endpoint plus the set of
//! declared process lists ("pelists") and the current one.
//!
//! ```text
//!   launch(npes, config, f)
//!        |
//!        +-- thread rank 0 --> MppContext { LocalTransport, pelists }
//!        +-- thread rank 1 --> MppContext { LocalTransport, pelists }
//!        ...                        |
//!                                   +-- crossbeam unbounded inbox per rank
//!                                   +-- shared abort flag
//! ```
//!
//! All collectives take an explicit [`Pelist`] and must be entered by
//! every member of it in the same order. A member that skips one is
//! detected as a [`CommError::Timeout`] on its peers, which then abort
//! the whole group.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collective;
pub mod config;
pub mod context;
pub mod launch;
pub mod local;
pub mod pelist;
pub mod tag;
pub mod transport;

pub use config::CommConfig;
pub use context::MppContext;
pub use launch::launch;
pub use local::{AbortHandle, LocalTransport, LocalUniverse};
pub use mpp_core::CommError;
pub use pelist::{Pelist, ProcessList};
pub use tag::Tag;
pub use transport::{Payload, Transport};
