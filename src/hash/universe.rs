//! Universe-reduction hash.
//!
//! Maps 64-bit keys into a reduced universe `[0, r)` with
//!
//! ```text
//! h(x) = (((a × ⌊x / r⌋ + b) mod p) + x) mod r,    p = 2^61 − 1
//! ```
//!
//! The inner term depends only on the *block* `⌊x / r⌋`, so inside a block the
//! hash is a cyclic shift of `x mod r`: consecutive keys stay consecutive,
//! modulo a single wraparound at `r`. Different blocks receive independent
//! pseudo-random offsets, which makes the family 2-independent and bounds the
//! probability that a key lands in a queried interval of length `l` by `l / r`.

use crate::error::{RangeCraftError, Result};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mersenne prime `2^61 − 1` used as the modulus of the block offset.
pub const MERSENNE_61: u64 = (1u64 << 61) - 1;

/// Randomized 2-independent hash into `[0, r)`.
///
/// Coefficients are drawn from a caller-supplied random source, so two
/// hashers built from the same seeded generator are identical.
///
/// # Examples
///
/// ```
/// use rangecraft::hash::UniverseHasher;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let h = UniverseHasher::new(1_000, &mut rng).unwrap();
/// assert!(h.hash(123_456_789) < 1_000);
///
/// // inside one block the hash is a cyclic shift
/// let x = 5_000;
/// assert_eq!(h.hash(x + 1), (h.hash(x) + 1) % 1_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UniverseHasher {
    a: u64,
    b: u64,
    r: u64,
}

impl UniverseHasher {
    /// Draw a hasher for a reduced universe of size `universe`.
    ///
    /// `a` and `b` are drawn uniformly from `[1, p)` and reduced modulo `r`;
    /// `a` is redrawn until the reduction is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::InvalidParameters`] if `universe == 0`.
    pub fn new<R: Rng + ?Sized>(universe: u64, rng: &mut R) -> Result<Self> {
        if universe == 0 {
            return Err(RangeCraftError::invalid_parameters(
                "reduced universe must be at least 1",
            ));
        }
        if universe == 1 {
            // every key maps to 0; no non-zero residue exists
            return Ok(Self { a: 1, b: 0, r: 1 });
        }

        let a = loop {
            let a = rng.gen_range(1..MERSENNE_61) % universe;
            if a != 0 {
                break a;
            }
        };
        let b = rng.gen_range(1..MERSENNE_61) % universe;

        Ok(Self { a, b, r: universe })
    }

    /// Rebuild a hasher from stored coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::InvalidParameters`] if `universe == 0` or a
    /// coefficient lies outside `[0, p)`.
    pub fn from_parts(a: u64, b: u64, universe: u64) -> Result<Self> {
        if universe == 0 {
            return Err(RangeCraftError::invalid_parameters(
                "reduced universe must be at least 1",
            ));
        }
        if a >= MERSENNE_61 || b >= MERSENNE_61 {
            return Err(RangeCraftError::invalid_parameters(format!(
                "hash coefficients ({}, {}) must be below 2^61 - 1",
                a, b
            )));
        }
        Ok(Self { a, b, r: universe })
    }

    /// Hash `x` into `[0, r)`.
    ///
    /// Computed in 128-bit arithmetic, so no key in `u64` can overflow.
    #[inline]
    #[must_use]
    pub fn hash(&self, x: u64) -> u64 {
        let p = u128::from(MERSENNE_61);
        let offset = (u128::from(self.a) * u128::from(x / self.r) + u128::from(self.b)) % p;
        ((offset + u128::from(x)) % u128::from(self.r)) as u64
    }

    /// Index of the block holding `x`. Keys in one block share a hash offset.
    #[inline]
    #[must_use]
    pub const fn block(&self, x: u64) -> u64 {
        x / self.r
    }

    /// Largest key in the block holding `x`, saturating at `u64::MAX`.
    #[inline]
    #[must_use]
    pub const fn block_end(&self, x: u64) -> u64 {
        (x - x % self.r).saturating_add(self.r - 1)
    }

    /// Multiplicative coefficient.
    #[must_use]
    pub const fn a(&self) -> u64 {
        self.a
    }

    /// Additive coefficient.
    #[must_use]
    pub const fn b(&self) -> u64 {
        self.b
    }

    /// Size of the reduced universe.
    #[must_use]
    pub const fn universe(&self) -> u64 {
        self.r
    }
}
