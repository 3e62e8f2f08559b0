//! Dense per-rank field buffers indexed by global coordinates.

use mpp_core::{DomainError, DomainResult, Extent, HaloElement};

/// A rank's slab of a 3-D field: an `Extent` in x/y times `nz` levels.
///
/// Storage is `i` fastest, then `j`, then `k`. Indices are global, so a
/// buffer over `[5:9, 1:4]` is addressed with `i` in `5..=9`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T: HaloElement> {
    extent: Extent,
    nz: usize,
    data: Vec<T>,
}

impl<T: HaloElement> Field<T> {
    /// A zero-filled field.
    pub fn new(extent: Extent, nz: usize) -> Self {
        Self::filled(extent, nz, T::default())
    }

    /// A field with every element set to `value`.
    pub fn filled(extent: Extent, nz: usize, value: T) -> Self {
        Self {
            extent,
            nz,
            data: vec![value; extent.area() * nz],
        }
    }

    /// A field whose element at `(i, j, k)` is `f(i, j, k)`.
    pub fn from_fn(extent: Extent, nz: usize, mut f: impl FnMut(i32, i32, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(extent.area() * nz);
        for k in 0..nz {
            for (i, j) in extent.iter() {
                data.push(f(i, j, k));
            }
        }
        Self { extent, nz, data }
    }

    /// Wrap an existing buffer. Fails if its length does not match.
    pub fn from_vec(extent: Extent, nz: usize, data: Vec<T>) -> DomainResult<Self> {
        if data.len() != extent.area() * nz {
            return Err(DomainError::ShapeMismatch {
                expected: extent,
                actual: extent,
                expected_levels: Some(nz),
                actual_levels: data.len().checked_div(extent.area()).unwrap_or(0),
            });
        }
        Ok(Self { extent, nz, data })
    }

    /// Horizontal extent covered.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Number of vertical levels.
    pub fn nz(&self) -> usize {
        self.nz
    }

    fn offset(&self, i: i32, j: i32, k: usize) -> Option<usize> {
        if k >= self.nz {
            return None;
        }
        let o = self.extent.offset_of(i, j)?;
        Some(k * self.extent.area() + o)
    }

    /// Element at `(i, j, k)`, or `None` outside the buffer.
    pub fn get(&self, i: i32, j: i32, k: usize) -> Option<T> {
        self.offset(i, j, k).map(|o| self.data[o])
    }

    /// Overwrite the element at `(i, j, k)`. Returns `false` outside the
    /// buffer.
    pub fn set(&mut self, i: i32, j: i32, k: usize, value: T) -> bool {
        match self.offset(i, j, k) {
            Some(o) => {
                self.data[o] = value;
                true
            }
            None => false,
        }
    }

    /// Raw storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw storage, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Give back the storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_i_fastest() {
        let e = Extent::new(5, 7, 1, 2);
        let f = Field::<i32>::from_fn(e, 2, |i, j, k| i * 100 + j * 10 + k as i32);
        assert_eq!(&f.as_slice()[..4], &[510, 610, 710, 520]);
        assert_eq!(f.as_slice()[6], 511);
        assert_eq!(f.get(6, 2, 1), Some(621));
        assert_eq!(f.get(4, 2, 0), None);
        assert_eq!(f.get(5, 1, 2), None);
    }

    #[test]
    fn set_inside_and_outside() {
        let mut f = Field::<f64>::new(Extent::new(0, 1, 0, 1), 1);
        assert!(f.set(1, 1, 0, 2.5));
        assert!(!f.set(2, 1, 0, 2.5));
        assert_eq!(f.get(1, 1, 0), Some(2.5));
        assert_eq!(f.as_slice().iter().filter(|&&v| v == 0.0).count(), 3);
    }

    #[test]
    fn from_vec_checks_length() {
        let e = Extent::new(0, 2, 0, 2);
        assert!(Field::from_vec(e, 1, vec![0f32; 9]).is_ok());
        let err = Field::from_vec(e, 2, vec![0f32; 9]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ShapeMismatch {
                expected_levels: Some(2),
                actual_levels: 1,
                ..
            }
        ));
    }
}
