//! Sizing formulas for range filters.
//!
//! A Grafite filter over `n` keys hashes into a reduced universe `[0, r)`.
//! Its false positive rate for a query range of length `l` is
//!
//! ```text
//! FPR(l) ≈ l × n / r
//! ```
//!
//! so the universe can be chosen from a target rate `ε` for ranges of length
//! `L`, or from a space budget in bits per key:
//!
//! - `r = ⌈n × L / ε⌉`
//! - `r = ⌈n × 2^(bpk − overhead)⌉`, where `overhead` is the number of bits per
//!   key the store spends above `log2(r/n)` (2 for Elias-Fano).
//!
//! The bucketing filter has no such guarantee. Its bucket size is derived from
//! the same budget as `s = u / (n × 2^(bpk − 2))` with `u = max_key + 1`.
//!
//! # References
//!
//! - Costa, Ferragina, Vinciguerra (2024). "Grafite: Taming Adversarial Queries
//!   with Optimal Range Filters"
//! - Elias (1974), Fano (1971) for the `2n` upper-bits overhead.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{RangeCraftError, Result};

/// Largest `f64` that still converts to a `u64` without saturating.
const U64_CEILING: f64 = 18_446_744_073_709_549_568.0;

/// Reduced universe for a target false positive rate on ranges of length `L`.
///
/// Implements `r = ⌈n × L / ε⌉`.
///
/// # Errors
///
/// - [`RangeCraftError::InvalidParameters`] if `n == 0` or `max_range_len == 0`
/// - [`RangeCraftError::FalsePositiveRateOutOfBounds`] if `fp_rate` not in (0, 1)
/// - [`RangeCraftError::BackendOverflow`] if `r` does not fit in a `u64`
///
/// # Examples
///
/// ```
/// use rangecraft::core::params::reduced_universe_from_fpr;
///
/// // 1000 keys, 1% FPR on ranges of up to 32 keys
/// assert_eq!(reduced_universe_from_fpr(1000, 0.01, 32).unwrap(), 3_200_000);
/// ```
pub fn reduced_universe_from_fpr(n: usize, fp_rate: f64, max_range_len: u64) -> Result<u64> {
    if n == 0 {
        return Err(RangeCraftError::invalid_parameters(
            "key count must be positive to size a filter",
        ));
    }
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
        return Err(RangeCraftError::fp_rate_out_of_bounds(fp_rate));
    }
    if max_range_len == 0 {
        return Err(RangeCraftError::invalid_parameters(
            "maximum range length must be at least 1",
        ));
    }

    let r = (n as f64 * max_range_len as f64 / fp_rate).ceil();
    to_universe(r)
}

/// Reduced universe for a space budget of `bpk` bits per key.
///
/// Implements `r = ⌈n × 2^(bpk − overhead)⌉`, clamped below at 1.
///
/// # Errors
///
/// - [`RangeCraftError::InvalidParameters`] if `n == 0`
/// - [`RangeCraftError::InvalidBitsPerKey`] if `bpk` is not finite and positive
/// - [`RangeCraftError::BackendOverflow`] if `r` does not fit in a `u64`
///
/// # Examples
///
/// ```
/// use rangecraft::core::params::reduced_universe_from_bpk;
///
/// // 100 keys, 10 bits per key, Elias-Fano overhead of 2
/// assert_eq!(reduced_universe_from_bpk(100, 10.0, 2).unwrap(), 25_600);
/// ```
pub fn reduced_universe_from_bpk(n: usize, bpk: f64, overhead: u32) -> Result<u64> {
    if n == 0 {
        return Err(RangeCraftError::invalid_parameters(
            "key count must be positive to size a filter",
        ));
    }
    if !bpk.is_finite() || bpk <= 0.0 {
        return Err(RangeCraftError::invalid_bits_per_key(bpk));
    }

    let r = (n as f64 * (bpk - f64::from(overhead)).exp2()).ceil();
    to_universe(r.max(1.0))
}

/// Bucket size for the bucketing filter under a `bpk` budget.
///
/// Implements `s = u / (n × 2^(bpk − 2))` with `u = max_key + 1`. The value is
/// returned unrounded; the filter takes its ceiling.
///
/// # Errors
///
/// - [`RangeCraftError::InvalidParameters`] if `n == 0`
/// - [`RangeCraftError::InvalidBitsPerKey`] if `bpk` is not finite and positive
/// - [`RangeCraftError::BackendOverflow`] if `max_key == u64::MAX`
///
/// # Examples
///
/// ```
/// use rangecraft::core::params::bucket_size_from_bpk;
///
/// // keys up to 1023, 16 keys, 6 bits per key → u / (16 × 16) = 4
/// assert_eq!(bucket_size_from_bpk(1023, 16, 6.0).unwrap(), 4.0);
/// ```
pub fn bucket_size_from_bpk(max_key: u64, n: usize, bpk: f64) -> Result<f64> {
    if n == 0 {
        return Err(RangeCraftError::invalid_parameters(
            "key count must be positive to size a filter",
        ));
    }
    if !bpk.is_finite() || bpk <= 0.0 {
        return Err(RangeCraftError::invalid_bits_per_key(bpk));
    }
    let universe = max_key
        .checked_add(1)
        .ok_or_else(|| RangeCraftError::backend_overflow("key universe max_key + 1"))?;

    Ok(universe as f64 / (n as f64 * (bpk - 2.0).exp2()))
}

/// Expected false positive rate of a Grafite filter for ranges of length `range_len`.
///
/// Implements `FPR = min(1, l × n / r)`. Returns 0 for an empty filter.
///
/// # Examples
///
/// ```
/// use rangecraft::core::params::expected_fpr;
///
/// let fpr = expected_fpr(32, 1000, 3_200_000);
/// assert!((fpr - 0.01).abs() < 1e-12);
/// assert_eq!(expected_fpr(1, 0, 100), 0.0);
/// ```
#[must_use]
pub fn expected_fpr(range_len: u64, n: usize, universe: u64) -> f64 {
    if n == 0 || universe == 0 {
        return 0.0;
    }
    (range_len as f64 * n as f64 / universe as f64).min(1.0)
}

/// Average number of bits spent per key for a structure of `size_bytes`.
///
/// Returns 0 when `n == 0`.
#[must_use]
pub fn bits_per_key(size_bytes: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (size_bytes as f64 * 8.0) / n as f64
}

fn to_universe(r: f64) -> Result<u64> {
    if !r.is_finite() || r > U64_CEILING {
        return Err(RangeCraftError::backend_overflow(format!(
            "reduced universe {:.0} exceeds u64::MAX",
            r
        )));
    }
    Ok((r as u64).max(1))
}
