//! C-compatible status codes.
//!
//! [`MppStatus`] is a `repr(i32)` enum covering every failure the layer
//! can report. Conversions from the Rust error types (`DomainError`,
//! `CommError`, `ConfigError`) are provided.

use mpp_config::ConfigError;
use mpp_core::{CommError, DomainError};

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MppStatus {
    /// Success.
    Ok = 0,
    /// Domain or nest handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -2,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -3,
    /// `mpp_init` has not been called, or `mpp_end` already ran.
    NotInitialized = -4,
    /// `mpp_init` was called twice.
    AlreadyInitialized = -5,
    /// Layout cannot be solved or used.
    InvalidLayout = -10,
    /// Active divisions do not match the pelist size.
    LayoutMismatch = -11,
    /// A halo width is negative or wider than the domain's.
    InvalidHalo = -12,
    /// The global extent has zero area.
    DegenerateExtent = -13,
    /// Explicit per-division extents are malformed.
    InvalidExtents = -14,
    /// The mask does not match the layout.
    InvalidMask = -15,
    /// A field buffer does not match the memory domain.
    ShapeMismatch = -16,
    /// The calling rank is not on the domain's pelist.
    NotOnPelist = -17,
    /// A nest window does not fit the fine or coarse domain.
    NestExtentMismatch = -18,
    /// A nest definition is malformed.
    InvalidNest = -19,
    /// Malformed pelist proposal.
    InvalidPelist = -20,
    /// The caller is not a member of the pelist it used.
    NotAMember = -21,
    /// `mpp_set_current_pelist` named an undeclared pelist.
    UndeclaredPelist = -22,
    /// A rank outside the world was named.
    InvalidRank = -23,
    /// A collective did not complete in time.
    Timeout = -24,
    /// The process group was aborted.
    Aborted = -25,
    /// A peer endpoint vanished.
    Disconnected = -26,
    /// A message carried the wrong payload type.
    PayloadType = -27,
    /// Ranks entered a collective with different arguments.
    CollectiveMismatch = -28,
    /// Transport settings are unusable.
    CommConfig = -29,
    /// Configuration file or text is invalid.
    ConfigError = -30,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -31,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&CommError> for MppStatus {
    fn from(e: &CommError) -> Self {
        match e {
            CommError::InvalidPelist { .. } => MppStatus::InvalidPelist,
            CommError::NotAMember { .. } => MppStatus::NotAMember,
            CommError::UndeclaredPelist { .. } => MppStatus::UndeclaredPelist,
            CommError::InvalidRank { .. } => MppStatus::InvalidRank,
            CommError::Timeout { .. } => MppStatus::Timeout,
            CommError::Aborted { .. } => MppStatus::Aborted,
            CommError::Disconnected { .. } => MppStatus::Disconnected,
            CommError::PayloadType { .. } => MppStatus::PayloadType,
            CommError::CollectiveMismatch { .. } => MppStatus::CollectiveMismatch,
            CommError::InvalidConfig { .. } => MppStatus::CommConfig,
        }
    }
}

impl From<&DomainError> for MppStatus {
    fn from(e: &DomainError) -> Self {
        match e {
            DomainError::InvalidLayout { .. } => MppStatus::InvalidLayout,
            DomainError::LayoutMismatch { .. } => MppStatus::LayoutMismatch,
            DomainError::InvalidHalo { .. } => MppStatus::InvalidHalo,
            DomainError::DegenerateExtent { .. } => MppStatus::DegenerateExtent,
            DomainError::InvalidExtents { .. } => MppStatus::InvalidExtents,
            DomainError::InvalidMask { .. } => MppStatus::InvalidMask,
            DomainError::ShapeMismatch { .. } => MppStatus::ShapeMismatch,
            DomainError::UninitializedDomain { .. } => MppStatus::InvalidHandle,
            DomainError::NotOnPelist { .. } => MppStatus::NotOnPelist,
            DomainError::NestExtentMismatch { .. } => MppStatus::NestExtentMismatch,
            DomainError::InvalidNest { .. } => MppStatus::InvalidNest,
            DomainError::Comm(c) => MppStatus::from(c),
        }
    }
}

impl From<&ConfigError> for MppStatus {
    fn from(_e: &ConfigError) -> Self {
        MppStatus::ConfigError
    }
}
