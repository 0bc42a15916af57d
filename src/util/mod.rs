//! Utility functions and helpers.
//!
//! - [`bitops`]: word-level bit packing and select used by the succinct stores

pub mod bitops;
