//! mpp: structured-grid domain decomposition and halo exchange.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the mpp sub-crates. For most users, adding `mpp` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use mpp::prelude::*;
//!
//! // Two simulated ranks share a 10x6 grid that is periodic in x.
//! let edges = launch(2, CommConfig::default(), |ctx| {
//!     let global = Extent::new(1, 10, 1, 6);
//!     let spec = DomainSpec::new(global, Layout::new(2, 1))
//!         .with_halo(HaloWidths::uniform(1))
//!         .with_boundaries(XBoundary::Cyclic, YBoundary::None);
//!     let domain = define_domain(ctx, &spec).unwrap();
//!
//!     let mut field: Field<f64> = domain.new_field(1).unwrap();
//!     let compute = domain.compute_domain().unwrap();
//!     for (i, j) in compute.iter() {
//!         field.set(i, j, 0, f64::from(i));
//!     }
//!     update_halo(ctx, &domain, &mut field, &UpdateOptions::default()).unwrap();
//!
//!     // The west halo column now holds the western neighbour's edge.
//!     field.get(compute.x_begin - 1, compute.y_begin, 0).unwrap()
//! })
//! .unwrap();
//! assert_eq!(edges, vec![10.0, 5.0]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `mpp-core` | Extents, layouts, halo widths, boundary flags, errors |
//! | [`arena`] | `mpp-arena` | Generational arena and typed handles |
//! | [`comm`] | `mpp-comm` | Pelists, transport, collectives, SPMD launch |
//! | [`domain`] | `mpp-domain` | Layout solver, domains, halo exchange, nests |
//! | [`config`] | `mpp-config` | Field table, diag table, init settings |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types and errors (`mpp-core`).
///
/// Contains [`types::Extent`], [`types::Layout`], [`types::HaloWidths`],
/// the boundary flags and the error taxonomy with [`types::Severity`].
pub use mpp_core as types;

/// Generational arena and typed handles (`mpp-arena`).
pub use mpp_arena as arena;

/// Process lists, transport and collectives (`mpp-comm`).
///
/// [`comm::MppContext`] is the per-rank handle; [`comm::launch`] runs a
/// closure on N in-process ranks.
pub use mpp_comm as comm;

/// Decomposition, halo exchange and nesting (`mpp-domain`).
///
/// Define domains with [`domain::define_domain`] or through a
/// [`domain::DomainRegistry`], then fill halos with
/// [`domain::update_halo`].
pub use mpp_domain as domain;

/// YAML configuration tables (`mpp-config`).
pub use mpp_config as config;

/// Common imports for typical mpp usage.
///
/// ```rust
/// use mpp::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mpp_core::{
        Extent, HaloElement, HaloWidths, Layout, PelistId, PelistKey, Rank, XBoundary, YBoundary,
    };

    // Errors
    pub use mpp_core::{CommError, DomainError, DomainResult, Severity};

    // Communication
    pub use mpp_comm::{launch, CommConfig, MppContext, Pelist};

    // Domains and halos
    pub use mpp_domain::{
        define_domain, solve_layout, update_halo, update_halo_pair, Direction, Directions,
        Domain, DomainId, DomainRegistry, DomainSpec, Field, FoldSign, NestSpec, UpdateOptions,
    };

    // Configuration
    pub use mpp_config::{ConfigError, InitConfig};
}
