//! Uncompressed sorted-vector store.
//!
//! Eight bytes per value and binary search for every query. Useful as a
//! baseline and when the reduced universe is too dense for Elias-Fano to
//! save space.

use super::{check_sorted, RangeEmptiness};
use crate::error::{RangeCraftError, Result};
use crate::serde_support::binary::{read_u64, read_words, write_u64, write_words};
use std::io::{Read, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sorted values in a plain `Vec<u64>`.
///
/// # Examples
///
/// ```
/// use rangecraft::store::{RangeEmptiness, SortedVecStore};
///
/// let store = SortedVecStore::from_sorted(&[2, 8, 8, 40]).unwrap();
/// assert!(store.contains_range(3, 8));
/// assert!(!store.contains_range(9, 39));
/// assert_eq!(store.count_range(0, 10), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u64>", into = "Vec<u64>"))]
pub struct SortedVecStore {
    values: Vec<u64>,
}

impl SortedVecStore {
    /// Stored values in order.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    /// Number of values `< x`.
    #[inline]
    fn lower_bound(&self, x: u64) -> usize {
        self.values.partition_point(|&v| v < x)
    }
}

impl TryFrom<Vec<u64>> for SortedVecStore {
    type Error = RangeCraftError;

    fn try_from(values: Vec<u64>) -> Result<Self> {
        check_sorted(&values)?;
        Ok(Self { values })
    }
}

impl From<SortedVecStore> for Vec<u64> {
    fn from(store: SortedVecStore) -> Self {
        store.values
    }
}

impl RangeEmptiness for SortedVecStore {
    const BPK_OVERHEAD: u32 = 0;
    const NAME: &'static str = "sorted-vec";

    fn from_sorted(values: &[u64]) -> Result<Self> {
        Self::try_from(values.to_vec())
    }

    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains_range(&self, lo: u64, hi: u64) -> bool {
        debug_assert!(lo <= hi);
        self.values
            .get(self.lower_bound(lo))
            .map_or(false, |&v| v <= hi)
    }

    fn count_range(&self, lo: u64, hi: u64) -> usize {
        let end = self.values.partition_point(|&v| v <= hi);
        end.saturating_sub(self.lower_bound(lo))
    }

    fn predecessor(&self, value: u64) -> Option<u64> {
        let end = self.values.partition_point(|&v| v <= value);
        end.checked_sub(1).map(|i| self.values[i])
    }

    fn min_value(&self) -> Option<u64> {
        self.values.first().copied()
    }

    fn max_value(&self) -> Option<u64> {
        self.values.last().copied()
    }

    fn size_in_bytes(&self) -> usize {
        self.values.len() * 8
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_u64(writer, self.values.len() as u64)?;
        write_words(writer, &self.values)
    }

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let len = read_u64(reader, "store length")?;
        let values = read_words(reader, len, "store values")?;
        Self::try_from(values)
    }
}
