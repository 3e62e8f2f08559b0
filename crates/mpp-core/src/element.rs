//! The closed set of element types a halo update can move.

use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
}

/// A numeric element that can live in a decomposed field.
///
/// Sealed: implemented for `f32`, `f64` and `i32` only, matching the
/// single, double and C-int variants of the native call table. Generic
/// code over `T: HaloElement` is resolved at compile time, so there is
/// no runtime dtype dispatch.
pub trait HaloElement:
    sealed::Sealed + Copy + Default + PartialEq + Debug + Send + Sync + 'static
{
    /// Short type code (`"r4"`, `"r8"`, `"i32"`), used in log lines and
    /// exported symbol names.
    const CODE: &'static str;

    /// Arithmetic negation, applied to values crossing a fold when the
    /// update asks for a sign flip.
    fn negate(self) -> Self;

    /// Lossy conversion from `i32`, used by fixtures and fill values.
    fn from_i32(v: i32) -> Self;
}

impl HaloElement for f32 {
    const CODE: &'static str = "r4";

    fn negate(self) -> Self {
        -self
    }

    fn from_i32(v: i32) -> Self {
        v as f32
    }
}

impl HaloElement for f64 {
    const CODE: &'static str = "r8";

    fn negate(self) -> Self {
        -self
    }

    fn from_i32(v: i32) -> Self {
        v as f64
    }
}

impl HaloElement for i32 {
    const CODE: &'static str = "i32";

    fn negate(self) -> Self {
        self.wrapping_neg()
    }

    fn from_i32(v: i32) -> Self {
        v
    }
}
