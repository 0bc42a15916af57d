//! Bucketing range filter.
//!
//! Partitions the key universe into buckets of `s` consecutive keys and
//! records which buckets hold at least one key. A query is positive iff it
//! touches a non-empty bucket.
//!
//! There is no formal false positive bound: every range overlapping an
//! occupied bucket answers `true`, so the error grows with `s` and with how
//! badly queries align to bucket boundaries. With `s = 1` the filter is an
//! exact set.
//!
//! ```text
//! keys:     3   7        21          40
//! s = 8:  [0..8)[8..16)[16..24)[24..32)[32..40)[40..48)
//! stored:   0           2                     5
//! ```

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::params;
use crate::core::RangeFilter;
use crate::error::{RangeCraftError, Result};
use crate::store::{check_sorted, EliasFanoStore, RangeEmptiness};

/// Bytes of fixed header: bucket_size, last_bucket.
pub(crate) const HEADER_BYTES: usize = 2 * 8;

/// Heuristic range filter over fixed-size key buckets.
///
/// # Examples
///
/// ```
/// use rangecraft::filters::BucketingFilter;
///
/// let keys = [3u64, 7, 21, 40];
/// let filter: BucketingFilter = BucketingFilter::with_bucket_size(&keys, 8).unwrap();
///
/// assert!(filter.query_range(16, 17));  // bucket 2 holds 21
/// assert!(!filter.query_range(8, 15));  // bucket 1 is empty
/// assert!(!filter.query_range(48, 1000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketingFilter<S = EliasFanoStore> {
    bucket_size: u64,
    last_bucket: u64,
    store: S,
}

impl<S: RangeEmptiness> BucketingFilter<S> {
    /// Build from sorted keys with buckets of `bucket_size` keys.
    ///
    /// # Errors
    ///
    /// - [`RangeCraftError::InvalidBucketSize`] if `bucket_size == 0`
    /// - [`RangeCraftError::UnsortedInput`] if `keys` is not sorted
    /// - [`RangeCraftError::BackendOverflow`] if the largest key is `u64::MAX`
    pub fn with_bucket_size(keys: &[u64], bucket_size: u64) -> Result<Self> {
        if bucket_size == 0 {
            return Err(RangeCraftError::invalid_bucket_size(0.0));
        }
        Self::build(keys, bucket_size)
    }

    /// Build from sorted keys under a budget of `bits_per_key` bits per key.
    ///
    /// The bucket size is `⌈u / (n × 2^(bpk − 2))⌉` with `u = max_key + 1`.
    ///
    /// # Errors
    ///
    /// - [`RangeCraftError::InvalidBitsPerKey`] if `bits_per_key` is not positive
    /// - [`RangeCraftError::UnsortedInput`] if `keys` is not sorted
    /// - [`RangeCraftError::BackendOverflow`] if the largest key is `u64::MAX`
    pub fn new(keys: &[u64], bits_per_key: f64) -> Result<Self> {
        check_sorted(keys)?;
        let Some(&max_key) = keys.last() else {
            return Self::empty();
        };
        let size = params::bucket_size_from_bpk(max_key, keys.len(), bits_per_key)?;
        Self::build(keys, Self::round_bucket_size(size)?)
    }

    /// Filter over no keys. Every query returns `false`.
    ///
    /// # Errors
    ///
    /// Propagates a store failure to build from an empty sequence.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            bucket_size: 1,
            last_bucket: 0,
            store: S::from_sorted(&[])?,
        })
    }

    /// Ceiling of a computed bucket size, at least 1.
    pub(crate) fn round_bucket_size(size: f64) -> Result<u64> {
        if !size.is_finite() || size <= 0.0 {
            return Err(RangeCraftError::invalid_bucket_size(size));
        }
        let rounded = size.ceil();
        if rounded >= u64::MAX as f64 {
            return Err(RangeCraftError::backend_overflow(format!(
                "bucket size {} exceeds u64::MAX",
                rounded
            )));
        }
        Ok((rounded as u64).max(1))
    }

    pub(crate) fn build(keys: &[u64], bucket_size: u64) -> Result<Self> {
        check_sorted(keys)?;
        let Some(&max_key) = keys.last() else {
            return Self::empty();
        };
        if max_key == u64::MAX {
            return Err(RangeCraftError::backend_overflow(
                "largest key u64::MAX leaves no room for universe max + 1",
            ));
        }

        let mut buckets: Vec<u64> = Vec::with_capacity(keys.len());
        for &key in keys {
            let bucket = key / bucket_size;
            if buckets.last() != Some(&bucket) {
                buckets.push(bucket);
            }
        }
        let last_bucket = buckets.last().copied().unwrap_or(0);
        let store = S::from_sorted(&buckets)?;

        tracing::debug!(
            n = keys.len(),
            bucket_size,
            buckets = store.len(),
            store = S::NAME,
            store_bytes = store.size_in_bytes(),
            "built bucketing filter"
        );
        Ok(Self {
            bucket_size,
            last_bucket,
            store,
        })
    }

    /// Reassemble a filter from decoded parts, checking their consistency.
    pub(crate) fn from_parts(bucket_size: u64, last_bucket: u64, store: S) -> Result<Self> {
        if bucket_size == 0 {
            return Err(RangeCraftError::serialization_error("bucket size is zero"));
        }
        let expected_last = store.max_value().unwrap_or(0);
        if last_bucket != expected_last {
            return Err(RangeCraftError::serialization_error(format!(
                "last bucket {} does not match stored maximum {}",
                last_bucket, expected_last
            )));
        }
        Ok(Self {
            bucket_size,
            last_bucket,
            store,
        })
    }

    /// Check whether some key might lie in `[left, right]`.
    ///
    /// # Panics
    ///
    /// Panics if `left > right`.
    #[must_use]
    pub fn query_range(&self, left: u64, right: u64) -> bool {
        assert!(
            left <= right,
            "query range must satisfy left <= right, got [{}, {}]",
            left,
            right
        );
        if self.store.is_empty() {
            return false;
        }
        let lo = left / self.bucket_size;
        if lo > self.last_bucket {
            return false;
        }
        let hi = (right / self.bucket_size).min(self.last_bucket);
        self.store.contains_range(lo, hi)
    }

    /// Check whether `key` might be in the set.
    #[must_use]
    pub fn query_point(&self, key: u64) -> bool {
        self.query_range(key, key)
    }

    /// Number of keys per bucket.
    #[must_use]
    pub const fn bucket_size(&self) -> u64 {
        self.bucket_size
    }

    /// Index of the highest non-empty bucket.
    #[must_use]
    pub const fn last_bucket(&self) -> u64 {
        self.last_bucket
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True if built from no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Backing store of bucket indices.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Bytes occupied: the fixed header plus the store.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        HEADER_BYTES + self.store.size_in_bytes()
    }
}

impl<S: RangeEmptiness> RangeFilter for BucketingFilter<S> {
    fn query_range(&self, left: u64, right: u64) -> bool {
        BucketingFilter::query_range(self, left, right)
    }

    fn len(&self) -> usize {
        BucketingFilter::len(self)
    }

    fn size_in_bytes(&self) -> usize {
        BucketingFilter::size_in_bytes(self)
    }
}
