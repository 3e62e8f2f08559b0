//! Benchmark profiles and utilities for the mpp decomposition layer.
//!
//! Provides pre-built [`DomainSpec`] profiles and deterministic field
//! contents:
//!
//! - [`reference_spec`]: a 360x180 tripolar grid (cyclic in x, folded
//!   at the north edge) with a two-cell halo
//! - [`stress_spec`]: 1440x1080 on the same topology
//! - [`random_field`]: seeded field contents via `ChaCha8Rng`

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mpp_core::{DomainResult, Extent, HaloElement, HaloWidths, XBoundary, YBoundary};
use mpp_domain::{solve_layout, Domain, DomainSpec, Field};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn tripolar(nx: i32, ny: i32, npes: usize) -> DomainResult<DomainSpec> {
    let global = Extent::new(1, nx, 1, ny);
    let layout = solve_layout(&global, npes as i32)?;
    Ok(DomainSpec::new(global, layout)
        .with_halo(HaloWidths::uniform(2))
        .with_boundaries(XBoundary::Cyclic, YBoundary::FoldNorth)
        .with_name("tripolar"))
}

/// Reference profile: 360x180 (64.8K cells) split over `npes` ranks.
pub fn reference_spec(npes: usize) -> DomainResult<DomainSpec> {
    tripolar(360, 180, npes)
}

/// Stress profile: 1440x1080 (~1.5M cells) split over `npes` ranks.
pub fn stress_spec(npes: usize) -> DomainResult<DomainSpec> {
    tripolar(1440, 1080, npes)
}

/// A field over `domain`'s memory extent filled from a seeded RNG.
///
/// Values are small integers so every element type represents them
/// exactly.
pub fn random_field<T: HaloElement>(domain: &Domain, nz: usize, seed: u64) -> DomainResult<Field<T>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let memory = domain.memory_domain()?;
    Ok(Field::from_fn(memory, nz, |_, _, _| {
        T::from_i32((rng.next_u32() % 10_000) as i32)
    }))
}
