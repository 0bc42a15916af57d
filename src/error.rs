//! Error types for RangeCraft operations.
//!
//! Every fallible construction path returns [`Result<T>`]. Query paths are
//! infallible except for the range-argument contract, which is enforced by a
//! panic in [`query_range`](crate::core::RangeFilter::query_range) and by an
//! [`RangeCraftError::UnsortedRange`] error in the `try_` variants.
//!
//! # Error Propagation
//!
//! ```
//! use rangecraft::{Result, RangeCraftError};
//! use rangecraft::core::params::reduced_universe_from_bpk;
//!
//! fn universe_for(n: usize, bpk: f64) -> Result<u64> {
//!     let r = reduced_universe_from_bpk(n, bpk, 2)?;
//!     Ok(r)
//! }
//! # assert!(universe_for(1000, 10.0).is_ok());
//! # assert!(universe_for(1000, -1.0).is_err());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for RangeCraft operations.
pub type Result<T> = std::result::Result<T, RangeCraftError>;

/// Errors that can occur while building, querying or decoding a range filter.
///
/// `Clone` + `PartialEq` keep the errors easy to compare in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeCraftError {
    /// The requested reduced universe is larger than the largest input key.
    ///
    /// A filter with `r > max_key` would occupy more space than a lossless
    /// encoding of the keys, so construction refuses it.
    SizingInfeasible {
        /// Largest key seen in the input.
        max_key: u64,
        /// Reduced universe size implied by the sizing parameters.
        universe: u64,
    },

    /// A range query was issued with `left > right`.
    UnsortedRange {
        /// Left endpoint supplied by the caller.
        left: u64,
        /// Right endpoint supplied by the caller.
        right: u64,
    },

    /// Input that must be sorted was not.
    UnsortedInput {
        /// Position of the first key smaller than its predecessor.
        index: usize,
    },

    /// A computed quantity does not fit in the integer width in use.
    BackendOverflow {
        /// What overflowed.
        message: String,
    },

    /// Generic invalid configuration.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// False positive rate outside the open interval (0, 1).
    FalsePositiveRateOutOfBounds {
        /// The rejected rate.
        fp_rate: f64,
    },

    /// Bits-per-key budget that is not a finite positive number.
    InvalidBitsPerKey {
        /// The rejected budget.
        bpk: f64,
    },

    /// Bucket size below one (or not finite).
    InvalidBucketSize {
        /// The rejected bucket size.
        size: f64,
    },

    /// Encoding or decoding of a filter failed.
    SerializationError {
        /// Description of what failed.
        message: String,
    },

    /// Internal invariant violated. Indicates a bug in RangeCraft.
    InternalError {
        /// Description of the invariant that was violated.
        message: String,
    },
}

impl fmt::Display for RangeCraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizingInfeasible { max_key, universe } => {
                write!(
                    f,
                    "Reduced universe {} exceeds the largest key {}; the filter would be larger \
                     than a lossless encoding of the input.",
                    universe, max_key
                )
            }
            Self::UnsortedRange { left, right } => {
                write!(
                    f,
                    "Range endpoints are not sorted: left {} > right {}.",
                    left, right
                )
            }
            Self::UnsortedInput { index } => {
                write!(f, "Input keys are not sorted at position {}.", index)
            }
            Self::BackendOverflow { message } => {
                write!(f, "Integer overflow: {}.", message)
            }
            Self::InvalidParameters { message } => {
                write!(f, "Invalid range filter parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidBitsPerKey { bpk } => {
                write!(
                    f,
                    "Invalid bits per key: {}. Must be a finite positive number.",
                    bpk
                )
            }
            Self::InvalidBucketSize { size } => {
                write!(f, "Invalid bucket size: {}. Must be at least 1.", size)
            }
            Self::SerializationError { message } => {
                write!(f, "Serialization error: {}.", message)
            }
            Self::InternalError { message } => {
                write!(
                    f,
                    "Internal error (this is a bug in RangeCraft): {}.",
                    message
                )
            }
        }
    }
}

impl std::error::Error for RangeCraftError {}

impl RangeCraftError {
    /// Create a `SizingInfeasible` error.
    #[must_use]
    pub fn sizing_infeasible(max_key: u64, universe: u64) -> Self {
        Self::SizingInfeasible { max_key, universe }
    }

    /// Create an `UnsortedRange` error.
    #[must_use]
    pub fn unsorted_range(left: u64, right: u64) -> Self {
        Self::UnsortedRange { left, right }
    }

    /// Create an `UnsortedInput` error.
    #[must_use]
    pub fn unsorted_input(index: usize) -> Self {
        Self::UnsortedInput { index }
    }

    /// Create a `BackendOverflow` error.
    #[must_use]
    pub fn backend_overflow(message: impl Into<String>) -> Self {
        Self::BackendOverflow {
            message: message.into(),
        }
    }

    /// Create an `InvalidParameters` error with a formatted message.
    ///
    /// # Examples
    /// ```
    /// use rangecraft::RangeCraftError;
    ///
    /// let err = RangeCraftError::invalid_parameters(
    ///     format!("range length {} must be positive", 0)
    /// );
    /// assert!(err.to_string().contains("range length 0"));
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidBitsPerKey` error.
    #[must_use]
    pub fn invalid_bits_per_key(bpk: f64) -> Self {
        Self::InvalidBitsPerKey { bpk }
    }

    /// Create an `InvalidBucketSize` error.
    #[must_use]
    pub fn invalid_bucket_size(size: f64) -> Self {
        Self::InvalidBucketSize { size }
    }

    /// Create a `SerializationError`.
    #[must_use]
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create an `InternalError`.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
