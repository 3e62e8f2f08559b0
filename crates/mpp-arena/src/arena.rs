//! Slot+generation storage.

use crate::handle::Handle;

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// A slot+generation table mapping [`Handle<T>`]s to owned values.
///
/// Reuses slots via a free list. Generation counters increment on
/// removal, making stale handles detectable.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Insert a value and return its handle.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.live += 1;
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            Handle::new(slot_idx, slot.generation)
        } else {
            let slot_idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(value),
            });
            Handle::new(slot_idx, 0)
        }
    }

    /// Shared access to the value behind a handle.
    ///
    /// Returns `None` if the handle is stale or was never issued.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.slot() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.data.as_ref()
    }

    /// Mutable access to the value behind a handle.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.slot() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.data.as_mut()
    }

    /// Whether the handle currently resolves.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Remove the value behind a handle, returning it.
    ///
    /// Bumps the slot's generation. A slot whose generation wraps back to
    /// zero is retired rather than recycled, so a handle from the first
    /// epoch can never resolve again. Double-remove returns `None`.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.slot() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.data.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(handle.slot());
        }
        self.live -= 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.live
    }

    /// `true` if no values are live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate live `(handle, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.data
                .as_ref()
                .map(|v| (Handle::new(idx as u32, slot.generation), v))
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .field("free", &self.free_list.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_get_round_trip() {
        let mut arena = Arena::new();
        let h = arena.insert(42i32);
        assert_eq!(arena.get(h), Some(&42));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn get_mut_modifies_value() {
        let mut arena = Arena::new();
        let h = arena.insert(10i32);
        if let Some(v) = arena.get_mut(h) {
            *v = 20;
        }
        assert_eq!(arena.get(h), Some(&20));
    }

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let mut arena = Arena::new();
        let h1 = arena.insert("first");
        assert_eq!(arena.remove(h1), Some("first"));
        let h2 = arena.insert("second");
        assert_eq!(h1.slot(), h2.slot());
        assert_ne!(h1.generation(), h2.generation());
        assert_eq!(arena.get(h1), None);
        assert_eq!(arena.get(h2), Some(&"second"));
    }

    #[test]
    fn double_remove_returns_none() {
        let mut arena = Arena::new();
        let h = arena.insert(1u8);
        assert_eq!(arena.remove(h), Some(1));
        assert_eq!(arena.remove(h), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn unknown_raw_handle_is_none() {
        let arena: Arena<i32> = Arena::new();
        assert_eq!(arena.get(Handle::from_raw(999 << 32)), None);
    }

    #[test]
    fn generation_exhaustion_retires_slot() {
        let mut arena = Arena::new();
        let h = arena.insert(1i32);
        arena.remove(h);

        arena.slots[0].generation = u32::MAX;
        let h_last = arena.insert(2i32);
        assert_eq!(h_last.generation(), u32::MAX);

        arena.remove(h_last);
        assert_eq!(arena.slots[0].generation, 0);
        assert!(!arena.free_list.contains(&0));

        let stale = Handle::<i32>::from_raw(0);
        assert_eq!(arena.get(stale), None);
        let fresh = arena.insert(3i32);
        assert_ne!(fresh.slot(), 0, "retired slot must not be reused");
    }

    #[test]
    fn iter_skips_removed() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');
        let c = arena.insert('c');
        arena.remove(b);
        let seen: Vec<_> = arena.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(seen, vec![(a, 'a'), (c, 'c')]);
    }

    proptest! {
        #[test]
        fn live_count_tracks_operations(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
            let mut arena = Arena::new();
            let mut handles = Vec::new();
            for (n, insert) in ops.into_iter().enumerate() {
                if insert || handles.is_empty() {
                    handles.push(arena.insert(n));
                } else {
                    let h = handles.swap_remove(n % handles.len());
                    prop_assert!(arena.remove(h).is_some());
                    prop_assert!(arena.get(h).is_none());
                }
                prop_assert_eq!(arena.len(), handles.len());
            }
            for h in handles {
                prop_assert!(arena.contains(h));
            }
        }
    }
}
