//! Error types for the mpp decomposition layer.
//!
//! Organized by subsystem: communication (pelists, transport,
//! collectives) and domains (layout, topology, shape, handles). Each
//! error carries a [`Severity`] so the C boundary can report the
//! NOTE/WARNING/FATAL code the native call table expects.

use std::error::Error;
use std::fmt;

use crate::extent::{Extent, Layout};
use crate::id::{PelistId, PelistKey, Rank};

/// How bad an error is, from the point of view of the process group.
///
/// Values are ABI-stable and cross the C boundary unchanged.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational; nothing failed.
    Note = 0,
    /// Detected locally before any communication. The caller may fix the
    /// input and retry.
    Warning = 1,
    /// Detected during or after a collective. The process group is no
    /// longer usable and must be torn down.
    Fatal = 2,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => write!(f, "NOTE"),
            Self::Warning => write!(f, "WARNING"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Errors from process lists, the transport, and collectives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A pelist proposal is empty, has duplicates, or is not a subset of
    /// the current pelist.
    InvalidPelist {
        /// Description of the problem.
        reason: String,
    },
    /// The calling rank is not a member of the pelist it used.
    NotAMember {
        /// The calling rank.
        rank: Rank,
        /// The pelist it is missing from.
        pelist: PelistId,
    },
    /// `set_current_pelist` named members that were never declared.
    UndeclaredPelist {
        /// The requested member list.
        members: Vec<Rank>,
    },
    /// A rank outside `0..world_size` was named.
    InvalidRank {
        /// The offending rank.
        rank: Rank,
        /// Size of the world pelist.
        world_size: usize,
    },
    /// A blocking receive saw no matching message within the configured
    /// timeout. In a correct SPMD program this means some rank skipped
    /// a collective, which is a contract violation.
    Timeout {
        /// The rank we were waiting on.
        waiting_on: Rank,
        /// Key of the pelist the exchange ran on.
        pelist: PelistKey,
        /// Exchange sequence number on that pelist.
        seq: u64,
    },
    /// The process group was aborted by some rank after a fatal error.
    Aborted {
        /// The reason given by the aborting rank.
        reason: String,
    },
    /// A peer's endpoint has gone away.
    Disconnected {
        /// The vanished peer.
        peer: Rank,
    },
    /// A message arrived with a payload of the wrong type.
    PayloadType {
        /// The sender.
        from: Rank,
        /// The type the receiver expected.
        expected: &'static str,
    },
    /// Ranks entered the same collective with different arguments.
    CollectiveMismatch {
        /// The collective operation.
        operation: &'static str,
        /// Description of the disagreement.
        reason: String,
    },
    /// Transport settings are unusable (zero timeout or poll interval).
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl CommError {
    /// Severity of this error.
    ///
    /// Argument errors caught before any message is sent are recoverable
    /// (`Warning`); anything observed on the wire is `Fatal`.
    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidPelist { .. }
            | Self::NotAMember { .. }
            | Self::UndeclaredPelist { .. }
            | Self::InvalidRank { .. }
            | Self::InvalidConfig { .. } => Severity::Warning,
            Self::Timeout { .. }
            | Self::Aborted { .. }
            | Self::Disconnected { .. }
            | Self::PayloadType { .. }
            | Self::CollectiveMismatch { .. } => Severity::Fatal,
        }
    }
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPelist { reason } => write!(f, "invalid pelist: {reason}"),
            Self::NotAMember { rank, pelist } => {
                write!(f, "rank {rank} is not a member of pelist {pelist}")
            }
            Self::UndeclaredPelist { members } => {
                write!(f, "pelist {members:?} has not been declared")
            }
            Self::InvalidRank { rank, world_size } => {
                write!(f, "rank {rank} outside world of size {world_size}")
            }
            Self::Timeout {
                waiting_on,
                pelist,
                seq,
            } => write!(
                f,
                "timed out waiting on rank {waiting_on} (pelist {pelist}, seq {seq}); \
                 a participant likely skipped a collective"
            ),
            Self::Aborted { reason } => write!(f, "process group aborted: {reason}"),
            Self::Disconnected { peer } => write!(f, "rank {peer} disconnected"),
            Self::PayloadType { from, expected } => {
                write!(f, "message from rank {from} is not a {expected}")
            }
            Self::CollectiveMismatch { operation, reason } => {
                write!(f, "{operation}: ranks disagree: {reason}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid comm config: {reason}"),
        }
    }
}

impl Error for CommError {}

/// Errors from domain definition, queries and halo updates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// A layout cannot be solved or used: non-positive division count,
    /// zero-area extent, or more divisions than cells on an axis.
    InvalidLayout {
        /// Description of the problem.
        reason: String,
    },
    /// The layout's active divisions do not match the pelist size.
    LayoutMismatch {
        /// The requested layout.
        layout: Layout,
        /// Number of active (unmasked) divisions.
        active: usize,
        /// Length of the pelist the domain was built on.
        pelist_len: usize,
    },
    /// A halo width is negative, or a per-call width exceeds the
    /// domain's own.
    InvalidHalo {
        /// Which side.
        side: &'static str,
        /// The offending width.
        width: i32,
    },
    /// The global extent has zero or negative size on some axis.
    DegenerateExtent {
        /// The offending extent.
        extent: Extent,
    },
    /// Explicit per-division extents are malformed.
    InvalidExtents {
        /// Description of the problem.
        reason: String,
    },
    /// The mask map does not match the layout.
    InvalidMask {
        /// Description of the problem.
        reason: String,
    },
    /// A field buffer does not cover the domain's memory extent.
    ShapeMismatch {
        /// Extent the domain expects.
        expected: Extent,
        /// Extent of the buffer supplied.
        actual: Extent,
        /// Levels expected (`None` when any level count is accepted).
        expected_levels: Option<usize>,
        /// Levels in the buffer supplied.
        actual_levels: usize,
    },
    /// A domain or nest handle is unknown or stale.
    UninitializedDomain {
        /// Raw handle value, for diagnostics.
        handle: u64,
    },
    /// A per-rank query was made on a rank outside the domain's pelist.
    NotOnPelist {
        /// The calling rank.
        rank: Rank,
    },
    /// A nest window does not fit the fine or coarse domain.
    NestExtentMismatch {
        /// `"x"` or `"y"`.
        axis: &'static str,
        /// Cells the window requires.
        required: i64,
        /// Cells available.
        available: i64,
    },
    /// A nest definition is malformed.
    InvalidNest {
        /// Description of the problem.
        reason: String,
    },
    /// A transport or collective error surfaced during a domain operation.
    Comm(CommError),
}

impl DomainError {
    /// Severity of this error.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Comm(e) => e.severity(),
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLayout { reason } => write!(f, "invalid layout: {reason}"),
            Self::LayoutMismatch {
                layout,
                active,
                pelist_len,
            } => write!(
                f,
                "layout {layout} has {active} active divisions but pelist has {pelist_len} ranks"
            ),
            Self::InvalidHalo { side, width } => {
                write!(f, "invalid {side} halo width {width}")
            }
            Self::DegenerateExtent { extent } => {
                write!(f, "global extent {extent} has no cells")
            }
            Self::InvalidExtents { reason } => write!(f, "invalid extents: {reason}"),
            Self::InvalidMask { reason } => write!(f, "invalid mask: {reason}"),
            Self::ShapeMismatch {
                expected,
                actual,
                expected_levels,
                actual_levels,
            } => {
                write!(f, "field covers {actual} x {actual_levels} levels, expected {expected}")?;
                if let Some(levels) = expected_levels {
                    write!(f, " x {levels} levels")?;
                }
                Ok(())
            }
            Self::UninitializedDomain { handle } => {
                write!(f, "domain handle {handle:#x} is not defined")
            }
            Self::NotOnPelist { rank } => {
                write!(f, "rank {rank} is not on this domain's pelist")
            }
            Self::NestExtentMismatch {
                axis,
                required,
                available,
            } => write!(
                f,
                "nest window needs {required} cells along {axis}, only {available} available"
            ),
            Self::InvalidNest { reason } => write!(f, "invalid nest: {reason}"),
            Self::Comm(e) => write!(f, "communication: {e}"),
        }
    }
}

impl Error for DomainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for DomainError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_errors_are_warnings() {
        let e = DomainError::InvalidHalo {
            side: "west",
            width: -1,
        };
        assert_eq!(e.severity(), Severity::Warning);
        let e = DomainError::from(CommError::InvalidPelist {
            reason: "empty".into(),
        });
        assert_eq!(e.severity(), Severity::Warning);
    }

    #[test]
    fn wire_errors_are_fatal() {
        let e = DomainError::from(CommError::Timeout {
            waiting_on: Rank(3),
            pelist: PelistKey(0),
            seq: 7,
        });
        assert_eq!(e.severity(), Severity::Fatal);
        assert!(e.source().is_some());
    }

    #[test]
    fn severity_codes_are_stable() {
        assert_eq!(Severity::Note as i32, 0);
        assert_eq!(Severity::Warning as i32, 1);
        assert_eq!(Severity::Fatal as i32, 2);
    }

    #[test]
    fn shape_mismatch_mentions_levels() {
        let e = DomainError::ShapeMismatch {
            expected: Extent::new(0, 3, 0, 3),
            actual: Extent::new(0, 2, 0, 3),
            expected_levels: Some(2),
            actual_levels: 1,
        };
        let msg = e.to_string();
        assert!(msg.contains("[0:2, 0:3]"), "{msg}");
        assert!(msg.contains("2 levels"), "{msg}");
    }
}
