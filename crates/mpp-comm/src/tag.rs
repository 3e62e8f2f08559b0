//! Message tags.

use std::fmt;

use mpp_core::PelistKey;

/// Identifies one message of one exchange.
///
/// A receive matches on the exact `(source, tag)` pair. `pelist` is the
/// member-derived [`PelistKey`], which every rank computes identically.
/// `seq` comes from the per-pelist counter in
/// [`MppContext`](crate::MppContext), so two exchanges on the same pelist
/// never share a tag; `slot` tells apart the phases and kinds of message
/// within one exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Key of the pelist the exchange runs on.
    pub pelist: PelistKey,
    /// Exchange sequence number on that pelist.
    pub seq: u64,
    /// Message kind within the exchange.
    pub slot: u32,
}

impl Tag {
    /// Slot used by point-to-point halo traffic.
    pub const HALO: u32 = 0x100;

    /// Create a tag.
    pub const fn new(pelist: PelistKey, seq: u64, slot: u32) -> Self {
        Self { pelist, seq, slot }
    }

    /// The same exchange, different slot.
    pub const fn with_slot(self, slot: u32) -> Self {
        Self::new(self.pelist, self.seq, slot)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{:#x}", self.pelist, self.seq, self.slot)
    }
}
