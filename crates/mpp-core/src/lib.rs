//! Core types for the mpp structured-grid decomposition layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: ranks,
//! index extents, layouts, halo widths, boundary topology flags, the
//! closed set of exchangeable element types, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod element;
pub mod error;
pub mod extent;
pub mod id;

pub use boundary::{XBoundary, YBoundary};
pub use element::HaloElement;
pub use error::{CommError, DomainError, DomainResult, Severity};
pub use extent::{Extent, HaloWidths, Layout};
pub use id::{PelistId, PelistKey, Rank, RankList};
