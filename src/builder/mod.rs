//! Builder pattern for range filter construction.
//!
//! # Type-State Pattern
//!
//! Builders enforce at compile time that a sizing parameter is chosen before
//! `build` becomes available. Invalid values (a rate outside (0, 1), a zero
//! range length) are still runtime errors.
//!
//! # Examples
//!
//! ## Grafite, sized by false positive rate
//!
//! ```
//! use rangecraft::builder::GrafiteFilterBuilder;
//!
//! let keys: Vec<u64> = (1..=10_000u64).map(|i| i * 50_021).collect();
//! let filter = GrafiteFilterBuilder::new()
//!     .false_positive_rate(0.01)
//!     .max_range_len(32)
//!     .seed(42)
//!     .build(&keys)
//!     .unwrap();
//! assert!(filter.query_range(50_021, 50_030));
//! ```
//!
//! ## Bucketing, sized by bits per key
//!
//! ```
//! use rangecraft::builder::BucketingFilterBuilder;
//!
//! let keys: Vec<u64> = (0..1_000u64).map(|i| i * 1_024).collect();
//! let filter = BucketingFilterBuilder::new()
//!     .bits_per_key(8.0)
//!     .build(&keys)
//!     .unwrap();
//! assert!(filter.query_point(2_048));
//! ```
//!
//! # Builder Comparison
//!
//! | Builder | Required Parameters | Optional Parameters |
//! |---------|---------------------|---------------------|
//! | Grafite | fp_rate + max_range_len, bits_per_key, or reduced_universe | seed, rng, duplicates, parallel_sort, store |
//! | Bucketing | bits_per_key or bucket_size | store |

#![allow(clippy::module_name_repetitions)]

pub mod bucketing;
pub mod grafite;

pub use bucketing::BucketingFilterBuilder;
pub use grafite::{FilterMetadata, GrafiteFilterBuilder};

use crate::error::{RangeCraftError, Result};

/// Type-state marker: no sizing parameter set.
pub struct Initial;

/// Type-state marker: false positive rate set, range length pending.
pub struct WithRate;

/// Type-state marker: all required parameters set.
pub struct Complete;

/// Common validation functions for all builders.
mod validation {
    use super::{RangeCraftError, Result};

    /// # Errors
    ///
    /// Returns error if `fp_rate` is not in (0, 1).
    #[inline]
    pub fn validate_fp_rate(fp_rate: f64) -> Result<()> {
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(RangeCraftError::fp_rate_out_of_bounds(fp_rate));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if `len == 0`.
    #[inline]
    pub fn validate_range_len(len: u64) -> Result<()> {
        if len == 0 {
            return Err(RangeCraftError::invalid_parameters(
                "maximum range length must be at least 1",
            ));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if `bpk` is not finite and positive.
    #[inline]
    pub fn validate_bits_per_key(bpk: f64) -> Result<()> {
        if !bpk.is_finite() || bpk <= 0.0 {
            return Err(RangeCraftError::invalid_bits_per_key(bpk));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if `universe == 0`.
    #[inline]
    pub fn validate_universe(universe: u64) -> Result<()> {
        if universe == 0 {
            return Err(RangeCraftError::invalid_parameters(
                "reduced universe must be at least 1",
            ));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns error if `size == 0`.
    #[inline]
    pub fn validate_bucket_size(size: u64) -> Result<()> {
        if size == 0 {
            return Err(RangeCraftError::invalid_bucket_size(0.0));
        }
        Ok(())
    }
}

/// Prelude for convenient builder imports.
pub mod prelude {
    pub use super::{BucketingFilterBuilder, GrafiteFilterBuilder};
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_fp_rate() {
        assert!(validate_fp_rate(0.01).is_ok());
        assert!(validate_fp_rate(0.0).is_err());
        assert!(validate_fp_rate(1.0).is_err());
        assert!(validate_fp_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_sizes() {
        assert!(validate_range_len(1).is_ok());
        assert!(validate_range_len(0).is_err());
        assert!(validate_bits_per_key(0.5).is_ok());
        assert!(validate_bits_per_key(-1.0).is_err());
        assert!(validate_bits_per_key(f64::INFINITY).is_err());
        assert!(validate_universe(0).is_err());
        assert!(matches!(
            validate_bucket_size(0),
            Err(RangeCraftError::InvalidBucketSize { .. })
        ));
    }

    #[test]
    fn test_prelude() {
        use prelude::*;
        let keys = [5u64, 1 << 20];
        assert!(GrafiteFilterBuilder::new().bits_per_key(8.0).build(&keys).is_ok());
        assert!(BucketingFilterBuilder::new().bucket_size(4).build(&keys).is_ok());
    }
}
