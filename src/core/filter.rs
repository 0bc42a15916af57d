//! Range filter trait definition.
//!
//! A range filter summarizes a static set of `u64` keys and answers "might
//! any key lie in `[left, right]`?" with one-sided error.
//!
//! # Guarantees
//!
//! 1. **No False Negatives**: if some key lies in `[left, right]`, the query
//!    MUST return `true`
//! 2. **Bounded False Positives**: an empty range of length `L` reports
//!    `true` with probability bounded by the filter's sizing parameters
//! 3. **Thread Safety**: filters are immutable after construction, so every
//!    implementation is `Send + Sync` and can be shared through `Arc`
//!    without locks
//!
//! # Concurrency
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Filter                 │ Single-threaded │ Multi-threaded    │
//! ├──────────────────────────────────────────────────────────────┤
//! │ GrafiteFilter<S>       │ &filter         │ Arc<filter>       │
//! │ BucketingFilter<S>     │ &filter         │ Arc<filter>       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![allow(clippy::module_name_repetitions)]

use crate::error::{RangeCraftError, Result};

/// Static approximate range-membership filter.
///
/// # Contract
///
/// ```text
/// keys ∩ [left, right] ≠ ∅   ⟹   query_range(left, right) == true
/// ```
///
/// The converse does not hold: `true` may be a false positive.
///
/// # Examples
///
/// ```
/// use rangecraft::core::RangeFilter;
/// use rangecraft::filters::GrafiteFilter;
///
/// let keys = [100u64, 5_000, 90_000, 1 << 30];
/// let filter: GrafiteFilter = GrafiteFilter::new(&keys, 16.0).unwrap();
///
/// assert!(filter.query_range(4_990, 5_010));
/// assert!(filter.query_point(90_000));
/// assert!(filter.try_query_range(10, 1).is_err());
/// ```
pub trait RangeFilter: Send + Sync {
    /// Check whether some key might lie in `[left, right]`.
    ///
    /// # Returns
    ///
    /// * `true` - a key **might** be in the range
    /// * `false` - the range is **definitely** empty
    ///
    /// # Panics
    ///
    /// Panics if `left > right`. Use [`try_query_range`](Self::try_query_range)
    /// for unchecked input.
    #[must_use]
    fn query_range(&self, left: u64, right: u64) -> bool;

    /// Check whether `key` might be in the set.
    #[must_use]
    fn query_point(&self, key: u64) -> bool {
        self.query_range(key, key)
    }

    /// Fallible variant of [`query_range`](Self::query_range).
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::UnsortedRange`] if `left > right`.
    fn try_query_range(&self, left: u64, right: u64) -> Result<bool> {
        if left > right {
            return Err(RangeCraftError::unsorted_range(left, right));
        }
        Ok(self.query_range(left, right))
    }

    /// Answer a batch of range queries.
    ///
    /// # Panics
    ///
    /// Panics if any range has `left > right`.
    fn query_batch<I>(&self, ranges: I) -> Vec<bool>
    where
        I: IntoIterator<Item = (u64, u64)>,
        Self: Sized,
    {
        ranges
            .into_iter()
            .map(|(left, right)| self.query_range(left, right))
            .collect()
    }

    /// True if any range of the batch might be non-empty.
    fn query_any<I>(&self, ranges: I) -> bool
    where
        I: IntoIterator<Item = (u64, u64)>,
        Self: Sized,
    {
        ranges
            .into_iter()
            .any(|(left, right)| self.query_range(left, right))
    }

    /// Number of keys the filter was built from.
    fn len(&self) -> usize;

    /// True if the filter was built from no keys.
    ///
    /// An empty filter answers `false` to every query.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes occupied by the filter, header included.
    fn size_in_bytes(&self) -> usize;

    /// Space per key in bits. Zero for an empty filter.
    fn bits_per_key(&self) -> f64 {
        crate::core::params::bits_per_key(self.size_in_bytes(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // exact filter over a sorted vector
    struct ExactFilter {
        keys: Vec<u64>,
    }

    impl RangeFilter for ExactFilter {
        fn query_range(&self, left: u64, right: u64) -> bool {
            assert!(left <= right, "left must not exceed right");
            let i = self.keys.partition_point(|&k| k < left);
            self.keys.get(i).map_or(false, |&k| k <= right)
        }

        fn len(&self) -> usize {
            self.keys.len()
        }

        fn size_in_bytes(&self) -> usize {
            self.keys.len() * 8
        }
    }

    fn filter() -> ExactFilter {
        ExactFilter {
            keys: vec![10, 20, 30],
        }
    }

    #[test]
    fn test_query_point_default() {
        let f = filter();
        assert!(f.query_point(20));
        assert!(!f.query_point(21));
    }

    #[test]
    fn test_try_query_range_rejects_unsorted() {
        let f = filter();
        assert_eq!(
            f.try_query_range(5, 4),
            Err(RangeCraftError::unsorted_range(5, 4))
        );
        assert_eq!(f.try_query_range(11, 19), Ok(false));
        assert_eq!(f.try_query_range(11, 20), Ok(true));
    }

    #[test]
    #[should_panic(expected = "left must not exceed right")]
    fn test_query_range_panics_on_unsorted() {
        let _ = filter().query_range(9, 1);
    }

    #[test]
    fn test_batch_helpers() {
        let f = filter();
        assert_eq!(
            f.query_batch([(0, 9), (9, 10), (31, 40)]),
            vec![false, true, false]
        );
        assert!(f.query_any([(0, 9), (25, 35)]));
        assert!(!f.query_any([(0, 9), (31, 40)]));
    }

    #[test]
    fn test_bits_per_key_default() {
        let f = filter();
        assert!((f.bits_per_key() - 64.0).abs() < 1e-9);
        let empty = ExactFilter { keys: vec![] };
        assert!(empty.is_empty());
        assert_eq!(empty.bits_per_key(), 0.0);
    }

    #[test]
    fn test_trait_bounds() {
        fn accept_filter(_f: &impl RangeFilter) {}
        fn assert_shareable<T: Send + Sync>() {}
        accept_filter(&filter());
        assert_shareable::<ExactFilter>();
    }
}
