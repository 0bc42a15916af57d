//! Range filter implementations.
//!
//! # Available Filters
//!
//! - [`GrafiteFilter`] - Hashes keys into a reduced universe; false positive
//!   rate bounded by `l × n / r` for any query of length `l`
//! - [`BucketingFilter`] - Records non-empty fixed-size key buckets; no
//!   formal bound, exact when the bucket size is 1
//!
//! # Choosing a Filter
//!
//! | Filter | Input | FPR guarantee | Sizing |
//! |--------|-------|---------------|--------|
//! | [`GrafiteFilter`] | Sorted or unsorted | `min(1, l × n / r)` | ε and L, bits per key, or r |
//! | [`BucketingFilter`] | Sorted | None | Bits per key or bucket size |
//!
//! Both filters are generic over the [`RangeEmptiness`](crate::store::RangeEmptiness)
//! store and default to [`EliasFanoStore`](crate::store::EliasFanoStore).
//!
//! # Examples
//!
//! ```
//! use rangecraft::filters::{BucketingFilter, GrafiteFilter};
//!
//! let keys: Vec<u64> = (1..=1_000u64).map(|i| i * 1_000_003).collect();
//!
//! let grafite: GrafiteFilter = GrafiteFilter::new(&keys, 12.0).unwrap();
//! let bucketing: BucketingFilter = BucketingFilter::new(&keys, 12.0).unwrap();
//!
//! for &k in &keys {
//!     assert!(grafite.query_range(k, k + 10));
//!     assert!(bucketing.query_range(k, k + 10));
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bucketing;
pub use bucketing::BucketingFilter;

pub mod grafite;
pub use grafite::GrafiteFilter;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RangeFilter;
    use crate::store::{EliasFanoStore, SortedVecStore};

    #[test]
    fn test_all_filters_accessible() {
        let keys = [10u64, 20, 1 << 30];
        let _g: GrafiteFilter = GrafiteFilter::new(&keys, 10.0).unwrap();
        let _gs: GrafiteFilter<SortedVecStore> = GrafiteFilter::new(&keys, 10.0).unwrap();
        let _b: BucketingFilter = BucketingFilter::new(&keys, 10.0).unwrap();
        let _bs: BucketingFilter<SortedVecStore> = BucketingFilter::new(&keys, 10.0).unwrap();
    }

    #[test]
    fn test_filters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GrafiteFilter<EliasFanoStore>>();
        assert_send_sync::<GrafiteFilter<SortedVecStore>>();
        assert_send_sync::<BucketingFilter<EliasFanoStore>>();
    }

    #[test]
    fn test_trait_objects_share_contract() {
        let keys = [100u64, 200, 300, 1 << 25];
        let grafite: GrafiteFilter = GrafiteFilter::with_universe(&keys, 1 << 16).unwrap();
        let bucketing: BucketingFilter = BucketingFilter::with_bucket_size(&keys, 16).unwrap();

        fn check(f: &impl RangeFilter, keys: &[u64]) {
            for &k in keys {
                assert!(f.query_point(k));
                assert!(f.query_range(k.saturating_sub(3), k + 3));
            }
            assert!(f.try_query_range(2, 1).is_err());
        }
        check(&grafite, &keys);
        check(&bucketing, &keys);
    }
}
