//! Sorted-integer stores answering range-emptiness queries.
//!
//! A range filter reduces every query to "does the stored set intersect
//! `[lo, hi]`?". The [`RangeEmptiness`] trait captures that operation, so
//! filters are generic over how the reduced keys are actually kept.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── elias_fano.rs  - Compressed Elias-Fano store (default)
//! ├── sorted.rs      - Plain sorted vector
//! └── mod.rs         - This file (trait and shared helpers)
//! ```
//!
//! # Choosing a Store
//!
//! | Store                | Space per key               | `contains_range` |
//! |----------------------|-----------------------------|------------------|
//! | [`EliasFanoStore`]   | `2 + ⌈log₂(u/n)⌉` bits      | O(log(u/n))      |
//! | [`SortedVecStore`]   | 64 bits                     | O(log n)         |

pub mod elias_fano;
pub mod sorted;

pub use elias_fano::EliasFanoStore;
pub use sorted::SortedVecStore;

use crate::error::{RangeCraftError, Result};
use std::io::{Read, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable set of `u64` values supporting range-emptiness queries.
///
/// Stores are built once from non-decreasing input and never mutated, so any
/// implementation is safe to query from many threads at once.
///
/// Duplicate values are allowed and kept; `len` counts them.
pub trait RangeEmptiness: Sized + Send + Sync {
    /// Extra bits per key the store needs beyond `log₂(u/n)`.
    ///
    /// Filters subtract this from a bits-per-key budget when sizing the
    /// reduced universe.
    const BPK_OVERHEAD: u32;

    /// Short name used in logs and benchmark labels.
    const NAME: &'static str;

    /// Build the store from non-decreasing values.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::UnsortedInput`] if `values` is not sorted.
    fn from_sorted(values: &[u64]) -> Result<Self>;

    /// Number of stored values, counting duplicates.
    fn len(&self) -> usize;

    /// True if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if some stored value lies in `[lo, hi]`. Requires `lo <= hi`.
    fn contains_range(&self, lo: u64, hi: u64) -> bool;

    /// True if `value` is stored.
    fn contains(&self, value: u64) -> bool {
        self.contains_range(value, value)
    }

    /// Number of stored values in `[lo, hi]`, counting duplicates.
    fn count_range(&self, lo: u64, hi: u64) -> usize;

    /// Largest stored value `<= value`.
    fn predecessor(&self, value: u64) -> Option<u64>;

    /// Smallest stored value.
    fn min_value(&self) -> Option<u64>;

    /// Largest stored value.
    fn max_value(&self) -> Option<u64>;

    /// Bytes occupied by the encoded values and any query indexes.
    fn size_in_bytes(&self) -> usize;

    /// Write a self-describing binary encoding.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] if the writer fails.
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()>;

    /// Read an encoding produced by [`write_to`](Self::write_to).
    ///
    /// Consumes exactly the bytes `write_to` produced.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] on truncated or
    /// inconsistent input.
    fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self>;
}

/// What to do with keys that reduce to the same value.
///
/// Collapsing cannot change any query answer (emptiness only cares whether a
/// value is present), but it shrinks the store when many keys collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DuplicatePolicy {
    /// Store every reduced key.
    #[default]
    Keep,
    /// Store each distinct reduced key once.
    Collapse,
}

/// Index of the first value smaller than its predecessor, if any.
pub(crate) fn check_sorted(values: &[u64]) -> Result<()> {
    match values.windows(2).position(|w| w[0] > w[1]) {
        Some(i) => Err(RangeCraftError::unsorted_input(i + 1)),
        None => Ok(()),
    }
}
