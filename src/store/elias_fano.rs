//! Elias-Fano encoded store.
//!
//! A non-decreasing sequence of `n` values bounded by `u` is split into
//! `l = ⌊log₂(u/n)⌋` low bits per value, packed verbatim, and the remaining
//! high bits, written in unary into a bit vector of `n + (max >> l) + 1`
//! bits. Total space is about `n × (2 + l)` bits.
//!
//! Value `i` has its high part encoded as a one at position `high + i`, so
//!
//! ```text
//! high(i) = select1(i) - i
//! ```
//!
//! and the zeros delimit buckets of equal high part. Locating the first
//! value `>= x` takes two `select0` calls to find `x`'s bucket and a binary
//! search over that bucket's low bits.

#![allow(clippy::cast_possible_truncation)]

use super::{check_sorted, RangeEmptiness};
use crate::core::bitvec::BitVec;
use crate::error::{RangeCraftError, Result};
use crate::serde_support::binary::{read_u64, read_words, to_usize, write_u64, write_words, CodecError};
use crate::util::bitops::{bits_to_words, floor_log2, low_mask, read_bits, write_bits};
use std::io::{Read, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest width of the low part.
const MAX_LOW_BITS: u32 = 63;

/// Compressed monotone sequence with predecessor/successor queries.
///
/// # Examples
///
/// ```
/// use rangecraft::store::{EliasFanoStore, RangeEmptiness};
///
/// let store = EliasFanoStore::from_sorted(&[5, 9, 9, 300, 1 << 33]).unwrap();
/// assert!(store.contains_range(10, 300));
/// assert!(!store.contains_range(301, 1 << 32));
/// assert_eq!(store.get(3), Some(300));
/// assert_eq!(store.predecessor(299), Some(9));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawEliasFano", into = "RawEliasFano"))]
pub struct EliasFanoStore {
    n: usize,
    low_bits: u32,
    last: u64,
    lower: Vec<u64>,
    upper: BitVec,
}

impl EliasFanoStore {
    /// Width of the low part for `n` values with maximum `last`.
    fn low_width(n: usize, last: u64) -> u32 {
        if n == 0 {
            return 0;
        }
        let ratio = (u128::from(last) + 1) / n as u128;
        floor_log2(u64::try_from(ratio).unwrap_or(u64::MAX)).min(MAX_LOW_BITS)
    }

    /// Value at position `i`, or `None` if `i >= len`.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<u64> {
        if i >= self.n {
            return None;
        }
        let high = self.upper.select1(i)? - i;
        Some(((high as u64) << self.low_bits) | self.low(i))
    }

    /// Width in bits of each stored low part.
    #[must_use]
    pub const fn low_bits(&self) -> u32 {
        self.low_bits
    }

    /// Iterate over the values in order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.n).filter_map(move |i| self.get(i))
    }

    #[inline]
    fn low(&self, i: usize) -> u64 {
        read_bits(&self.lower, i * self.low_bits as usize, self.low_bits)
    }

    /// Number of values with high part `< h`.
    #[inline]
    fn bucket_start(&self, h: usize) -> usize {
        if h == 0 {
            return 0;
        }
        // the (h-1)-th zero closes bucket h-1; ones before it are the count
        self.upper
            .select0(h - 1)
            .map_or(self.n, |pos| pos + 1 - h)
    }

    /// Number of stored values `< x`.
    fn rank(&self, x: u64) -> usize {
        if self.n == 0 {
            return 0;
        }
        if x > self.last {
            return self.n;
        }
        let h = (x >> self.low_bits) as usize;
        let start = self.bucket_start(h);
        let end = self.bucket_start(h + 1);
        let target = x & low_mask(self.low_bits);

        let (mut lo, mut hi) = (start, end);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.low(mid) < target {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Number of stored values `<= x`.
    #[inline]
    fn rank_inclusive(&self, x: u64) -> usize {
        match x.checked_add(1) {
            Some(next) => self.rank(next),
            None => self.n,
        }
    }

    fn validate(n: usize, low_bits: u32, last: u64, upper_len: usize) -> Result<()> {
        let expected_low = Self::low_width(n, last);
        if low_bits != expected_low {
            return Err(CodecError::InconsistentHeader(format!(
                "low width {} does not match {} for n = {}, last = {}",
                low_bits, expected_low, n, last
            ))
            .into());
        }
        let expected_upper = if n == 0 {
            0
        } else {
            n.checked_add((last >> low_bits) as usize)
                .and_then(|v| v.checked_add(1))
                .ok_or_else(|| CodecError::InconsistentHeader("upper length overflows".into()))?
        };
        if upper_len != expected_upper {
            return Err(CodecError::InconsistentHeader(format!(
                "upper length {} does not match expected {}",
                upper_len, expected_upper
            ))
            .into());
        }
        Ok(())
    }
}

impl RangeEmptiness for EliasFanoStore {
    const BPK_OVERHEAD: u32 = 2;
    const NAME: &'static str = "elias-fano";

    fn from_sorted(values: &[u64]) -> Result<Self> {
        check_sorted(values)?;
        let n = values.len();
        let last = values.last().copied().unwrap_or(0);
        let low_bits = Self::low_width(n, last);

        let mut lower = vec![0u64; bits_to_words(n * low_bits as usize)];
        let upper_len = if n == 0 {
            0
        } else {
            n + (last >> low_bits) as usize + 1
        };
        let mut upper = vec![0u64; bits_to_words(upper_len)];

        for (i, &v) in values.iter().enumerate() {
            write_bits(&mut lower, i * low_bits as usize, low_bits, v);
            let pos = (v >> low_bits) as usize + i;
            upper[pos / 64] |= 1u64 << (pos % 64);
        }

        Ok(Self {
            n,
            low_bits,
            last,
            lower,
            upper: BitVec::from_words(upper, upper_len)?,
        })
    }

    #[inline]
    fn len(&self) -> usize {
        self.n
    }

    fn contains_range(&self, lo: u64, hi: u64) -> bool {
        debug_assert!(lo <= hi);
        let i = self.rank(lo);
        let hit = self.get(i).map_or(false, |v| v <= hi);
        tracing::trace!(lo, hi, successor_index = i, hit, "elias-fano probe");
        hit
    }

    fn count_range(&self, lo: u64, hi: u64) -> usize {
        self.rank_inclusive(hi).saturating_sub(self.rank(lo))
    }

    fn predecessor(&self, value: u64) -> Option<u64> {
        self.rank_inclusive(value)
            .checked_sub(1)
            .and_then(|i| self.get(i))
    }

    fn min_value(&self) -> Option<u64> {
        self.get(0)
    }

    fn max_value(&self) -> Option<u64> {
        (self.n > 0).then_some(self.last)
    }

    fn size_in_bytes(&self) -> usize {
        self.lower.len() * 8 + self.upper.size_in_bytes()
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_u64(writer, self.n as u64)?;
        write_u64(writer, u64::from(self.low_bits))?;
        write_u64(writer, self.last)?;
        write_u64(writer, self.upper.len() as u64)?;
        write_u64(writer, self.lower.len() as u64)?;
        write_words(writer, &self.lower)?;
        write_words(writer, self.upper.words())
    }

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let n = to_usize(read_u64(reader, "elias-fano length")?, "elias-fano length")?;
        let low_bits = read_u64(reader, "elias-fano low width")?;
        let last = read_u64(reader, "elias-fano last value")?;
        let upper_len = to_usize(read_u64(reader, "elias-fano upper length")?, "upper length")?;
        let lower_words = read_u64(reader, "elias-fano lower words")?;

        let low_bits = u32::try_from(low_bits)
            .ok()
            .filter(|&l| l <= MAX_LOW_BITS)
            .ok_or_else(|| CodecError::InconsistentHeader(format!("low width {}", low_bits)))?;
        // check the header before trusting its word counts
        Self::validate(n, low_bits, last, upper_len)?;
        let expected_lower = Self::lower_words(n, low_bits)?;
        if lower_words != expected_lower as u64 {
            return Err(CodecError::InconsistentHeader(format!(
                "lower word count {} does not match expected {}",
                lower_words, expected_lower
            ))
            .into());
        }

        let lower = read_words(reader, lower_words, "elias-fano lower bits")?;
        let upper_words = read_words(reader, bits_to_words(upper_len) as u64, "elias-fano upper bits")?;
        let upper = BitVec::from_words(upper_words, upper_len)?;
        Self::assemble(RawEliasFano {
            n,
            low_bits,
            last,
            lower,
            upper,
        })
    }
}

/// Field-level representation, validated on the way back in.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct RawEliasFano {
    n: usize,
    low_bits: u32,
    last: u64,
    lower: Vec<u64>,
    upper: BitVec,
}

impl EliasFanoStore {
    fn lower_words(n: usize, low_bits: u32) -> Result<usize> {
        n.checked_mul(low_bits as usize)
            .map(bits_to_words)
            .ok_or_else(|| CodecError::InconsistentHeader("lower size overflows".into()).into())
    }

    fn assemble(raw: RawEliasFano) -> Result<Self> {
        let RawEliasFano {
            n,
            low_bits,
            last,
            lower,
            upper,
        } = raw;
        if low_bits > MAX_LOW_BITS {
            return Err(CodecError::InconsistentHeader(format!("low width {}", low_bits)).into());
        }
        Self::validate(n, low_bits, last, upper.len())?;
        if lower.len() != Self::lower_words(n, low_bits)? {
            return Err(CodecError::InconsistentHeader(format!(
                "{} lower words for {} values of {} bits",
                lower.len(),
                n,
                low_bits
            ))
            .into());
        }
        if upper.count_ones() != n {
            return Err(CodecError::InconsistentHeader(format!(
                "upper bits hold {} values, header says {}",
                upper.count_ones(),
                n
            ))
            .into());
        }

        let store = Self {
            n,
            low_bits,
            last,
            lower,
            upper,
        };
        if n > 0 && store.get(n - 1) != Some(last) {
            return Err(CodecError::InconsistentHeader(
                "encoded maximum does not match header".into(),
            )
            .into());
        }
        Ok(store)
    }
}

impl TryFrom<RawEliasFano> for EliasFanoStore {
    type Error = RangeCraftError;

    fn try_from(raw: RawEliasFano) -> Result<Self> {
        Self::assemble(raw)
    }
}

impl From<EliasFanoStore> for RawEliasFano {
    fn from(store: EliasFanoStore) -> Self {
        Self {
            n: store.n,
            low_bits: store.low_bits,
            last: store.last,
            lower: store.lower,
            upper: store.upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_low_width() {
        assert_eq!(EliasFanoStore::low_width(0, 0), 0);
        assert_eq!(EliasFanoStore::low_width(4, 3), 0);
        assert_eq!(EliasFanoStore::low_width(10, 1023), 6);
        assert_eq!(EliasFanoStore::low_width(1, u64::MAX), 63);
    }

    #[test]
    fn test_get_and_iter() {
        let values = vec![0, 3, 3, 8, 100, 101, 4096, 1 << 40];
        let store = EliasFanoStore::from_sorted(&values).unwrap();
        assert_eq!(store.iter().collect::<Vec<_>>(), values);
        assert_eq!(store.get(values.len()), None);
    }

    #[test]
    fn test_matches_sorted_vec_on_random_data() {
        let mut rng = StdRng::seed_from_u64(11);
        for &universe in &[64u64, 10_000, 1 << 32, u64::MAX] {
            let mut values: Vec<u64> = (0..500).map(|_| rng.gen_range(0..universe)).collect();
            values.sort_unstable();
            let store = EliasFanoStore::from_sorted(&values).unwrap();
            for _ in 0..2000 {
                let lo = rng.gen_range(0..universe);
                let hi = lo.saturating_add(rng.gen_range(0..universe / 50 + 1));
                let expected = values.iter().any(|&v| lo <= v && v <= hi);
                assert_eq!(store.contains_range(lo, hi), expected, "[{lo}, {hi}] u={universe}");
            }
        }
    }

    #[test]
    fn test_space_is_near_optimal() {
        let values: Vec<u64> = (1..=10_000u64).map(|i| i * 1024).collect();
        let store = EliasFanoStore::from_sorted(&values).unwrap();
        assert_eq!(store.low_bits(), 10);
        // 10 low bits + ~2 upper bits + rank/select overhead
        let bits_per_value = store.size_in_bytes() as f64 * 8.0 / values.len() as f64;
        assert!(bits_per_value < 13.0, "{bits_per_value} bits per value");
    }

    #[test]
    fn test_decode_rejects_tampered_header() {
        let store = EliasFanoStore::from_sorted(&[1, 2, 300]).unwrap();
        let mut buf = Vec::new();
        store.write_to(&mut buf).unwrap();

        let mut tampered = buf.clone();
        tampered[8] ^= 1; // low width
        assert!(EliasFanoStore::read_from(&mut tampered.as_slice()).is_err());

        let mut tampered = buf.clone();
        tampered[16] = 0xFF; // last value
        assert!(EliasFanoStore::read_from(&mut tampered.as_slice()).is_err());

        let truncated = &buf[..buf.len() - 1];
        assert!(EliasFanoStore::read_from(&mut &truncated[..]).is_err());
    }
}
