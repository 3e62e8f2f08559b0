//! Field fixtures keyed on global indices.

use mpp_core::{Extent, HaloElement};
use mpp_domain::{Domain, Field};

/// Value parked in halo cells before an update.
pub const SENTINEL: i32 = -999_999;

/// A distinct value per `(i, j, k)` for small grids (|i|, |j| < 1000,
/// k < 10). Exact in `f32`.
pub fn encode<T: HaloElement>(i: i32, j: i32, k: usize) -> T {
    T::from_i32((i * 1000 + j) * 10 + k as i32)
}

/// A field over `domain`'s memory extent with encoded compute cells and
/// [`SENTINEL`] everywhere else.
pub fn seeded_field<T: HaloElement>(domain: &Domain, nz: usize) -> Field<T> {
    let compute = domain.compute_domain().unwrap_or(Extent::new(0, -1, 0, -1));
    let memory = domain.memory_domain().unwrap_or(Extent::new(0, -1, 0, -1));
    Field::from_fn(memory, nz, |i, j, k| {
        if compute.contains(i, j) {
            encode(i, j, k)
        } else {
            T::from_i32(SENTINEL)
        }
    })
}

/// What cell `(i, j, k)` of a seeded field holds after a full update.
pub fn expected_after_update<T: HaloElement>(domain: &Domain, i: i32, j: i32, k: usize, flip: bool) -> T {
    let (Ok(compute), Ok(data)) = (domain.compute_domain(), domain.data_domain()) else {
        return T::from_i32(SENTINEL);
    };
    if compute.contains(i, j) {
        return encode(i, j, k);
    }
    if !data.contains(i, j) {
        return T::from_i32(SENTINEL);
    }
    match domain.topology().source_of(i, j) {
        Some(s) if domain.owner_of(s.i, s.j).is_some() => {
            let v: T = encode(s.i, s.j, k);
            if flip && s.folded {
                v.negate()
            } else {
                v
            }
        }
        _ => T::from_i32(SENTINEL),
    }
}

/// Panic with the first cell whose value differs from
/// [`expected_after_update`].
pub fn assert_halo_filled<T: HaloElement>(domain: &Domain, field: &Field<T>, flip: bool) {
    for k in 0..field.nz() {
        for (i, j) in field.extent().iter() {
            let want = expected_after_update::<T>(domain, i, j, k, flip);
            let got = field.get(i, j, k);
            assert_eq!(
                got,
                Some(want),
                "rank {} cell ({i}, {j}, {k})",
                domain.rank()
            );
        }
    }
}
