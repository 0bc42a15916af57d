//! Builder for bucketing filters.
//!
//! ```text
//! Initial ──.bucket_size()──▶ Complete
//!    └──────.bits_per_key()──▶ Complete
//! ```

use super::validation;
use super::{Complete, Initial};
use crate::error::Result;
use crate::filters::BucketingFilter;
use crate::store::{EliasFanoStore, RangeEmptiness};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq)]
enum BucketSizing {
    Fixed(u64),
    BitsPerKey(f64),
}

/// Builder for [`BucketingFilter`].
///
/// # Examples
///
/// ```
/// use rangecraft::builder::BucketingFilterBuilder;
/// use rangecraft::store::SortedVecStore;
///
/// let filter = BucketingFilterBuilder::new()
///     .store::<SortedVecStore>()
///     .bucket_size(100)
///     .build(&[5, 250, 251, 9_000])
///     .unwrap();
/// assert_eq!(filter.len(), 3);
/// assert!(!filter.query_range(300, 8_999));
/// ```
pub struct BucketingFilterBuilder<State, S = EliasFanoStore> {
    sizing: Option<BucketSizing>,
    _state: PhantomData<State>,
    _store: PhantomData<S>,
}

impl BucketingFilterBuilder<Initial, EliasFanoStore> {
    /// Create a builder for an Elias-Fano backed filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sizing: None,
            _state: PhantomData,
            _store: PhantomData,
        }
    }
}

impl Default for BucketingFilterBuilder<Initial, EliasFanoStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> BucketingFilterBuilder<Initial, S> {
    /// Switch the store backend.
    #[must_use]
    pub fn store<T: RangeEmptiness>(self) -> BucketingFilterBuilder<Initial, T> {
        BucketingFilterBuilder {
            sizing: None,
            _state: PhantomData,
            _store: PhantomData,
        }
    }

    /// Fixed number of keys per bucket.
    #[must_use]
    pub fn bucket_size(self, size: u64) -> BucketingFilterBuilder<Complete, S> {
        BucketingFilterBuilder {
            sizing: Some(BucketSizing::Fixed(size)),
            _state: PhantomData,
            _store: PhantomData,
        }
    }

    /// Derive the bucket size from a space budget and the key set.
    #[must_use]
    pub fn bits_per_key(self, bpk: f64) -> BucketingFilterBuilder<Complete, S> {
        BucketingFilterBuilder {
            sizing: Some(BucketSizing::BitsPerKey(bpk)),
            _state: PhantomData,
            _store: PhantomData,
        }
    }
}

impl<S: RangeEmptiness> BucketingFilterBuilder<Complete, S> {
    /// Build the filter over sorted `keys`.
    ///
    /// # Errors
    ///
    /// - [`RangeCraftError::InvalidBucketSize`](crate::RangeCraftError::InvalidBucketSize)
    ///   for a zero bucket size
    /// - [`RangeCraftError::InvalidBitsPerKey`](crate::RangeCraftError::InvalidBitsPerKey)
    ///   for a non-positive budget
    /// - [`RangeCraftError::UnsortedInput`](crate::RangeCraftError::UnsortedInput)
    ///   if `keys` is not sorted
    pub fn build(self, keys: &[u64]) -> Result<BucketingFilter<S>> {
        match self.sizing {
            Some(BucketSizing::Fixed(size)) => {
                validation::validate_bucket_size(size)?;
                BucketingFilter::with_bucket_size(keys, size)
            }
            Some(BucketSizing::BitsPerKey(bpk)) => {
                validation::validate_bits_per_key(bpk)?;
                BucketingFilter::new(keys, bpk)
            }
            None => Err(crate::error::RangeCraftError::internal_error(
                "complete builder without sizing",
            )),
        }
    }
}
