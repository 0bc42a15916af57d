//! Core types, traits, and utilities for RangeCraft.
//!
//! - **Traits**: [`RangeFilter`]
//! - **Data Structures**: [`BitVec`] (static rank/select bit vector)
//! - **Utilities**: sizing functions for the reduced universe and buckets
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── filter.rs    - Trait definitions
//! ├── bitvec.rs    - Bit vector with rank/select
//! ├── params.rs    - Parameter calculations
//! └── mod.rs       - This file (public API)
//! ```
//!
//! # Examples
//!
//! ```
//! use rangecraft::core::prelude::*;
//!
//! let r = reduced_universe_from_fpr(1_000, 0.01, 32).unwrap();
//! assert_eq!(r, 3_200_000);
//! assert!((expected_fpr(32, 1_000, r) - 0.01).abs() < 1e-12);
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod bitvec;
pub mod filter;
pub mod params;

pub use bitvec::BitVec;
pub use filter::RangeFilter;

pub use params::{
    bits_per_key, bucket_size_from_bpk, expected_fpr, reduced_universe_from_bpk,
    reduced_universe_from_fpr,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::filter::RangeFilter;
    pub use super::params::{expected_fpr, reduced_universe_from_bpk, reduced_universe_from_fpr};
}
