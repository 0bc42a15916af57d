//! RangeCraft: range filters with provable false positive bounds.
//!
//! A range filter is a compact, immutable summary of a set of `u64` keys that
//! answers "might some key lie in `[left, right]`?". Like a Bloom filter it
//! never reports a false negative; unlike a Bloom filter it answers for whole
//! intervals, which is what LSM-tree compactions, key-value store lookups and
//! time-series scans actually ask.
//!
//! # Quick Start
//!
//! ```
//! use rangecraft::GrafiteFilter;
//!
//! let keys: Vec<u64> = (0..10_000u64).map(|i| i * 104_729).collect();
//!
//! // 1% false positives on ranges of up to 64 keys
//! let filter: GrafiteFilter = GrafiteFilter::with_fpr(&keys, 0.01, 64).unwrap();
//!
//! assert!(filter.query_range(104_700, 104_760)); // holds 104_729
//! assert!(filter.query_point(0));
//! ```
//!
//! # Filters
//!
//! | Filter | False positive bound | Input | Backing store |
//! |--------|----------------------|-------|---------------|
//! | [`GrafiteFilter`] | `min(1, l × n / r)` for any range of length `l` | any order | [`RangeEmptiness`] |
//! | [`BucketingFilter`] | none (exact with bucket size 1) | sorted | [`RangeEmptiness`] |
//!
//! Grafite's bound holds for every query, including queries correlated with
//! the keys, because the hash coefficients are random and private to the
//! filter. Both filters are generic over the store holding the reduced keys;
//! [`EliasFanoStore`] is the default and [`SortedVecStore`] is the baseline.
//!
//! # Using Builders
//!
//! ```
//! use rangecraft::builder::GrafiteFilterBuilder;
//! use rangecraft::store::DuplicatePolicy;
//!
//! let keys: Vec<u64> = (1..=1_000u64).map(|i| i << 32).collect();
//! let filter = GrafiteFilterBuilder::new()
//!     .bits_per_key(12.0)
//!     .seed(2024)
//!     .duplicates(DuplicatePolicy::Collapse)
//!     .build(&keys)
//!     .unwrap();
//! assert_eq!(filter.len(), 1_000);
//! ```
//!
//! # Concurrency
//!
//! Filters are immutable after construction and `Send + Sync`; share them
//! with `Arc` and query from any number of threads without locks.
//!
//! ```
//! use rangecraft::GrafiteFilter;
//! use std::sync::Arc;
//!
//! let keys: Vec<u64> = (0..1_000u64).map(|i| i * 1_000_000).collect();
//! let filter: Arc<GrafiteFilter> = Arc::new(GrafiteFilter::new(&keys, 10.0).unwrap());
//!
//! let f = Arc::clone(&filter);
//! let handle = std::thread::spawn(move || f.query_range(5_000_000, 5_000_010));
//! assert!(handle.join().unwrap());
//! ```
//!
//! # Serialization
//!
//! Every filter writes a compact little-endian layout with
//! [`GrafiteFilter::to_bytes`] and reads it back with
//! [`GrafiteFilter::from_bytes`]. With the `serde` feature the filters also
//! implement `Serialize` and `Deserialize`.
//!
//! ```
//! use rangecraft::GrafiteFilter;
//!
//! let keys = [7u64, 1 << 20, 1 << 40];
//! let filter: GrafiteFilter = GrafiteFilter::new(&keys, 16.0).unwrap();
//! let bytes = filter.to_bytes().unwrap();
//! let restored: GrafiteFilter = GrafiteFilter::from_bytes(&bytes).unwrap();
//! assert_eq!(restored, filter);
//! ```
//!
//! # Optional Features
//!
//! - `serde` - `Serialize`/`Deserialize` plus bincode and JSON helpers
//! - `rayon` - parallel sort of hashed keys during construction
//! - `metrics` - empirical false positive rate tracking
//!
//! # Logging
//!
//! Construction and decoding emit `tracing` events at `debug` level; store
//! probes emit `trace` events. The crate installs no subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::len_zero)]
#![allow(clippy::bool_assert_comparison)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

/// Core data structures and traits
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations
pub mod filters;

/// Reduced-universe hashing
pub mod hash;

/// Range-emptiness stores backing the filters
pub mod store;

/// Utility functions and helpers
pub mod util;

/// Type-safe builders for all filter types
pub mod builder;

/// Binary codec and serde support
pub mod serde_support;

/// Observability and monitoring (requires `metrics` feature)
#[cfg(feature = "metrics")]
#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
pub mod metrics;

pub use error::{RangeCraftError, Result};

pub use core::filter::RangeFilter;

pub use filters::{BucketingFilter, GrafiteFilter};

pub use store::{DuplicatePolicy, EliasFanoStore, RangeEmptiness, SortedVecStore};

pub use builder::{BucketingFilterBuilder, GrafiteFilterBuilder};

pub use hash::UniverseHasher;

#[cfg(feature = "metrics")]
pub use metrics::FalsePositiveTracker;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use rangecraft::prelude::*;
///
/// fn any_hit<F: RangeFilter>(filter: &F) -> bool {
///     filter.query_any([(0, 9), (100, 109)])
/// }
///
/// let filter: GrafiteFilter = GrafiteFilter::new(&[105, 1 << 30], 8.0).unwrap();
/// assert!(any_hit(&filter));
/// ```
pub mod prelude {
    pub use crate::builder::{BucketingFilterBuilder, GrafiteFilterBuilder};
    pub use crate::core::filter::RangeFilter;
    pub use crate::error::{RangeCraftError, Result};
    pub use crate::filters::{BucketingFilter, GrafiteFilter};
    pub use crate::store::{DuplicatePolicy, EliasFanoStore, RangeEmptiness, SortedVecStore};

    #[cfg(feature = "serde")]
    pub use crate::serde_support::FilterSerdeSupport;

    #[cfg(feature = "metrics")]
    pub use crate::metrics::FalsePositiveTracker;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let keys = [10u64, 20, 30, 1 << 32];
        let g: GrafiteFilter = GrafiteFilter::new(&keys, 10.0).unwrap();
        let b: BucketingFilter<SortedVecStore> = BucketingFilter::new(&keys, 10.0).unwrap();
        assert!(g.query_range(15, 25));
        assert!(b.query_range(15, 25));
    }

    #[test]
    fn test_trait_objects() {
        let keys = [10u64, 20, 30, 1 << 32];
        let filters: Vec<Box<dyn RangeFilter>> = vec![
            Box::new(GrafiteFilter::<EliasFanoStore>::new(&keys, 10.0).unwrap()),
            Box::new(BucketingFilter::<EliasFanoStore>::with_bucket_size(&keys, 1).unwrap()),
        ];
        for f in &filters {
            assert!(f.query_point(20));
            assert!(f.query_range(29, 31));
        }
    }

    #[test]
    fn test_filters_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GrafiteFilter>();
        assert_send_sync::<GrafiteFilter<SortedVecStore>>();
        assert_send_sync::<BucketingFilter>();
    }
}
