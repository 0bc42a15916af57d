//! Hashing for range filters.
//!
//! Range filters cannot use an arbitrary hash: a query interval must map to a
//! small, predictable set of hashed intervals. [`UniverseHasher`] is a cyclic
//! shift of `x mod r` whose offset is re-drawn every `r` keys, which keeps
//! intervals contiguous (modulo one wraparound) inside each block while staying
//! 2-independent across blocks.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── universe.rs    - UniverseHasher and the Mersenne modulus
//! └── mod.rs         - This file (public API)
//! ```
//!
//! # Random Source
//!
//! Coefficients come from an explicit [`rand::Rng`] passed at construction.
//! [`default_rng`] seeds a [`StdRng`] from system entropy; [`seeded_rng`]
//! gives reproducible filters for tests and benchmarks.

pub mod universe;

pub use universe::{UniverseHasher, MERSENNE_61};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source seeded from operating system entropy.
#[must_use]
pub fn default_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Deterministic random source for reproducible construction.
///
/// # Examples
///
/// ```
/// use rangecraft::hash::{seeded_rng, UniverseHasher};
///
/// let a = UniverseHasher::new(1 << 20, &mut seeded_rng(5)).unwrap();
/// let b = UniverseHasher::new(1 << 20, &mut seeded_rng(5)).unwrap();
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
