//! Domain decomposition and halo exchange for mpp.
//!
//! A [`Domain`] splits a 2-D global index extent into rectangular
//! compute domains, one per rank of a pelist, and records the halo each
//! rank keeps around its compute domain. When the domain is defined,
//! every rank also builds an [`ExchangePlan`] saying which halo cells it
//! receives from whom and which of its own cells it sends where;
//! [`update_halo`] replays that plan.
//!
//! ```text
//!   DomainSpec --validate--> Partition --> LocalDomain (compute/data/memory)
//!                                 |
//!                   Topology --> ExchangePlan (recv / send / local)
//!                                 |
//!            update_halo: send all -> stage local -> recv all -> write
//! ```
//!
//! Nests ([`NestDomain`]) link a refined domain to a window of a coarse
//! one. [`DomainRegistry`] keeps domains and nests behind stale-safe
//! handles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod domain;
pub mod field;
pub mod halo;
pub mod layout;
pub mod nest;
pub mod partition;
pub mod plan;
pub mod registry;
pub mod spec;
pub mod topology;

pub use direction::{Direction, Directions};
pub use domain::{define_domain, Domain, LocalDomain, Neighbors};
pub use field::Field;
pub use halo::{start_update, update_halo, update_halo_pair, FoldSign, PendingUpdate, UpdateOptions};
pub use layout::solve_layout;
pub use nest::{CoarseWindow, NestDomain, NestSpec};
pub use partition::{balanced_split, Partition};
pub use plan::{ExchangePlan, PeerEntries, PlanEntry};
pub use registry::{DomainId, DomainRegistry, NestId};
pub use spec::{DomainSpec, Mosaic};
pub use topology::{Source, Topology};
