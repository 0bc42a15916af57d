//! Builder for Grafite filters.
//!
//! ```text
//! Initial ──.false_positive_rate()──▶ WithRate ──.max_range_len()──▶ Complete
//!    │                                                                  ▲
//!    ├──.bits_per_key()─────────────────────────────────────────────────┤
//!    └──.reduced_universe()─────────────────────────────────────────────┘
//! ```
//!
//! Optional knobs are available in every state.
//!
//! # Examples
//!
//! ```
//! use rangecraft::builder::GrafiteFilterBuilder;
//! use rangecraft::store::{DuplicatePolicy, SortedVecStore};
//!
//! let keys: Vec<u64> = (0..5_000u64).map(|i| i * 1_000_003).collect();
//! let filter = GrafiteFilterBuilder::new()
//!     .store::<SortedVecStore>()
//!     .bits_per_key(14.0)
//!     .seed(7)
//!     .duplicates(DuplicatePolicy::Collapse)
//!     .build(&keys)
//!     .unwrap();
//! assert_eq!(filter.len(), 5_000);
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use rangecraft::builder::GrafiteFilterBuilder;
//!
//! let result = GrafiteFilterBuilder::new()
//!     .false_positive_rate(1.5)  // Invalid!
//!     .max_range_len(16)
//!     .build(&[1, 2, 3]);
//! assert!(result.is_err());
//! ```

use super::validation;
use super::{Complete, Initial, WithRate};
use crate::error::{RangeCraftError, Result};
use crate::filters::grafite::{BuildOptions, Sizing};
use crate::filters::GrafiteFilter;
use crate::hash::{default_rng, seeded_rng};
use crate::store::{DuplicatePolicy, EliasFanoStore, RangeEmptiness};
use rand::rngs::StdRng;
use std::marker::PhantomData;

/// Builder for [`GrafiteFilter`] with type-state guarantees.
///
/// # Type Parameters
///
/// - `State`: current builder state (`Initial`, `WithRate`, `Complete`)
/// - `S`: store backend (defaults to [`EliasFanoStore`])
pub struct GrafiteFilterBuilder<State, S = EliasFanoStore> {
    fp_rate: Option<f64>,
    sizing: Option<Sizing>,
    rng: Option<StdRng>,
    options: BuildOptions,
    _state: PhantomData<State>,
    _store: PhantomData<S>,
}

impl GrafiteFilterBuilder<Initial, EliasFanoStore> {
    /// Create a builder for an Elias-Fano backed filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fp_rate: None,
            sizing: None,
            rng: None,
            options: BuildOptions::default(),
            _state: PhantomData,
            _store: PhantomData,
        }
    }
}

impl Default for GrafiteFilterBuilder<Initial, EliasFanoStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, S> GrafiteFilterBuilder<State, S> {
    fn transition<Next>(self) -> GrafiteFilterBuilder<Next, S> {
        GrafiteFilterBuilder {
            fp_rate: self.fp_rate,
            sizing: self.sizing,
            rng: self.rng,
            options: self.options,
            _state: PhantomData,
            _store: PhantomData,
        }
    }

    /// Seed the coefficient generator for a reproducible filter.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(seeded_rng(seed));
        self
    }

    /// Draw coefficients from `rng`.
    #[must_use]
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// How to treat keys that hash to the same reduced value.
    ///
    /// Defaults to [`DuplicatePolicy::Keep`].
    #[must_use]
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.options.duplicates = policy;
        self
    }

    /// Sort hashed keys on the rayon pool.
    ///
    /// Without the `rayon` feature the flag is accepted and ignored.
    #[must_use]
    pub fn parallel_sort(mut self, enabled: bool) -> Self {
        self.options.parallel_sort = enabled;
        self
    }
}

impl<S> GrafiteFilterBuilder<Initial, S> {
    /// Switch the store backend.
    #[must_use]
    pub fn store<T: RangeEmptiness>(self) -> GrafiteFilterBuilder<Initial, T> {
        GrafiteFilterBuilder {
            fp_rate: self.fp_rate,
            sizing: self.sizing,
            rng: self.rng,
            options: self.options,
            _state: PhantomData,
            _store: PhantomData,
        }
    }

    /// Target false positive rate; the range length comes next.
    #[must_use]
    pub fn false_positive_rate(mut self, fp_rate: f64) -> GrafiteFilterBuilder<WithRate, S> {
        self.fp_rate = Some(fp_rate);
        self.transition()
    }

    /// Size the reduced universe from a space budget.
    #[must_use]
    pub fn bits_per_key(mut self, bpk: f64) -> GrafiteFilterBuilder<Complete, S> {
        self.sizing = Some(Sizing::BitsPerKey(bpk));
        self.transition()
    }

    /// Use an explicit reduced universe of size `universe`.
    #[must_use]
    pub fn reduced_universe(mut self, universe: u64) -> GrafiteFilterBuilder<Complete, S> {
        self.sizing = Some(Sizing::Universe(universe));
        self.transition()
    }
}

impl<S> GrafiteFilterBuilder<WithRate, S> {
    /// Longest query range the false positive target must hold for.
    #[must_use]
    pub fn max_range_len(mut self, max_range_len: u64) -> GrafiteFilterBuilder<Complete, S> {
        let fp_rate = self.fp_rate.unwrap_or(f64::NAN);
        self.sizing = Some(Sizing::FalsePositiveRate {
            fp_rate,
            max_range_len,
        });
        self.transition()
    }
}

impl<S: RangeEmptiness> GrafiteFilterBuilder<Complete, S> {
    fn validated_sizing(&self) -> Result<Sizing> {
        let sizing = self
            .sizing
            .ok_or_else(|| RangeCraftError::internal_error("complete builder without sizing"))?;
        match sizing {
            Sizing::FalsePositiveRate {
                fp_rate,
                max_range_len,
            } => {
                validation::validate_fp_rate(fp_rate)?;
                validation::validate_range_len(max_range_len)?;
            }
            Sizing::BitsPerKey(bpk) => validation::validate_bits_per_key(bpk)?,
            Sizing::Universe(r) => validation::validate_universe(r)?,
        }
        Ok(sizing)
    }

    /// Build the filter over `keys`, sorted or not.
    ///
    /// # Errors
    ///
    /// - Parameter errors for invalid sizing values
    /// - [`RangeCraftError::SizingInfeasible`] if the largest key is below `r`
    pub fn build(self, keys: &[u64]) -> Result<GrafiteFilter<S>> {
        let sizing = self.validated_sizing()?;
        let mut rng = self.rng.unwrap_or_else(default_rng);
        GrafiteFilter::build(keys, sizing, &mut rng, self.options)
    }

    /// Build the filter and report the parameters it was built with.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangecraft::builder::GrafiteFilterBuilder;
    ///
    /// let keys: Vec<u64> = (1..=1_000u64).map(|i| i << 24).collect();
    /// let (filter, meta) = GrafiteFilterBuilder::new()
    ///     .bits_per_key(10.0)
    ///     .build_with_metadata(&keys)
    ///     .unwrap();
    /// assert_eq!(meta.reduced_universe, 256_000);
    /// assert_eq!(meta.size_in_bytes, filter.size_in_bytes());
    /// ```
    pub fn build_with_metadata(self, keys: &[u64]) -> Result<(GrafiteFilter<S>, FilterMetadata)> {
        let filter = self.build(keys)?;
        let metadata = FilterMetadata {
            n_items: filter.len(),
            reduced_universe: filter.reduced_universe(),
            size_in_bytes: filter.size_in_bytes(),
            bits_per_key: filter.bits_per_key(),
            store: S::NAME,
        };
        Ok((filter, metadata))
    }
}

/// Parameters of a constructed filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMetadata {
    /// Number of input keys
    pub n_items: usize,
    /// Size `r` of the reduced universe
    pub reduced_universe: u64,
    /// Bytes occupied by the filter
    pub size_in_bytes: usize,
    /// Space per key in bits
    pub bits_per_key: f64,
    /// Store backend name
    pub store: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortedVecStore;

    fn keys() -> Vec<u64> {
        (1..=3_000u64).map(|i| i * 65_537).collect()
    }

    #[test]
    fn test_seeded_builds_are_identical() {
        let a = GrafiteFilterBuilder::new().bits_per_key(12.0).seed(99).build(&keys()).unwrap();
        let b = GrafiteFilterBuilder::new().seed(99).bits_per_key(12.0).build(&keys()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rate_and_range_len() {
        let f = GrafiteFilterBuilder::new()
            .false_positive_rate(0.05)
            .max_range_len(100)
            .seed(1)
            .build(&keys())
            .unwrap();
        assert_eq!(f.reduced_universe(), 6_000_000);
        assert!((f.expected_fpr(100) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters() {
        let err = GrafiteFilterBuilder::new()
            .false_positive_rate(0.0)
            .max_range_len(10)
            .build(&keys())
            .unwrap_err();
        assert!(matches!(err, RangeCraftError::FalsePositiveRateOutOfBounds { .. }));

        let err = GrafiteFilterBuilder::new()
            .false_positive_rate(0.1)
            .max_range_len(0)
            .build(&keys())
            .unwrap_err();
        assert!(matches!(err, RangeCraftError::InvalidParameters { .. }));

        assert!(GrafiteFilterBuilder::new().reduced_universe(0).build(&keys()).is_err());
        assert!(GrafiteFilterBuilder::new().bits_per_key(f64::NAN).build(&[]).is_err());
    }

    #[test]
    fn test_empty_keys_give_empty_filter() {
        let f = GrafiteFilterBuilder::new().bits_per_key(10.0).build(&[]).unwrap();
        assert!(f.is_empty());
        assert!(!f.query_range(0, 100));
    }

    #[test]
    fn test_store_and_options() {
        let f = GrafiteFilterBuilder::new()
            .store::<SortedVecStore>()
            .reduced_universe(1)
            .duplicates(DuplicatePolicy::Collapse)
            .parallel_sort(true)
            .seed(3)
            .build(&keys())
            .unwrap();
        assert_eq!(f.store().len(), 1);
        assert_eq!(f.len(), 3_000);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_sort_builds_identical_filter() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(11);
        let keys: Vec<u64> = (0..5_000).map(|_| rng.gen_range(0..1u64 << 48)).collect();
        for store_bits in [10.0, 16.0] {
            let serial = GrafiteFilterBuilder::new()
                .bits_per_key(store_bits)
                .seed(12)
                .build(&keys)
                .unwrap();
            let parallel = GrafiteFilterBuilder::new()
                .bits_per_key(store_bits)
                .seed(12)
                .parallel_sort(true)
                .build(&keys)
                .unwrap();
            assert_eq!(serial, parallel);
        }
    }

    #[test]
    fn test_metadata() {
        let (f, meta) = GrafiteFilterBuilder::new()
            .bits_per_key(10.0)
            .seed(5)
            .build_with_metadata(&keys())
            .unwrap();
        assert_eq!(meta.n_items, 3_000);
        assert_eq!(meta.store, "elias-fano");
        assert_eq!(meta.reduced_universe, f.reduced_universe());
        assert!((meta.bits_per_key - f.bits_per_key()).abs() < 1e-12);
    }
}
