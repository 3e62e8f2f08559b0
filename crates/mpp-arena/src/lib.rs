//! Generational slot arena for mpp registries.
//!
//! Domains and nest domains are referenced by opaque handles rather than
//! references, so they can cross the C boundary and outlive borrow
//! scopes. A handle is `(slot, generation)`: removing a value bumps the
//! slot's generation, so a stale handle resolves to `None` instead of
//! silently aliasing whatever later reuses the slot.
//!
//! ```text
//! Arena<T>
//! ├── Slot<T> × n   (generation + Option<T>)
//! └── free list     (slots whose generation has not wrapped)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod handle;

pub use arena::Arena;
pub use handle::Handle;
