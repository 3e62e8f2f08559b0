//! Typed generational handles.
//!
//! A [`Handle<T>`] names one slot of an [`Arena<T>`](crate::Arena) at one
//! generation. The type parameter keeps a domain handle from being used
//! to look up a nest domain; it carries no data.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Opaque reference to a value stored in an [`Arena<T>`](crate::Arena).
///
/// Encoded for the C boundary as a `u64`: upper 32 bits slot index,
/// lower 32 bits generation.
#[must_use]
pub struct Handle<T> {
    slot: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(slot: u32, generation: u32) -> Self {
        Self {
            slot,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index within the arena.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation the slot had when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Encode as a raw `u64` for the C boundary.
    pub fn to_raw(self) -> u64 {
        ((self.slot as u64) << 32) | (self.generation as u64)
    }

    /// Decode a raw `u64`. Any value decodes; validity is checked on lookup.
    pub fn from_raw(raw: u64) -> Self {
        Self::new((raw >> 32) as u32, raw as u32)
    }
}

// Manual impls: derives would add a spurious `T: Trait` bound.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_raw().hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(slot={}, gen={})", self.slot, self.generation)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.to_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        let h: Handle<u8> = Handle::new(7, 42);
        let back = Handle::<u8>::from_raw(h.to_raw());
        assert_eq!(back, h);
        assert_eq!(back.slot(), 7);
        assert_eq!(back.generation(), 42);
    }

    #[test]
    fn encoding_places_slot_high() {
        let h: Handle<u8> = Handle::new(1, 2);
        assert_eq!(h.to_raw(), (1u64 << 32) | 2);
    }
}
