//! Static bit vector with rank and select support.
//!
//! The Elias-Fano store keeps its upper bits in a [`BitVec`]. Once built the
//! vector never changes, so the auxiliary indexes are computed once and the
//! structure is freely shareable across threads.
//!
//! # Layout
//!
//! Raw bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! Two small indexes sit next to the raw words:
//!
//! - `block_ranks`: number of set bits before each 512-bit block (plus a sentinel)
//! - `select{0,1}_samples`: block holding every 512th zero / one
//!
//! # Performance Characteristics
//!
//! - Space: `⌈n/64⌉ × 8` bytes plus ~12.5% for the rank index and a few
//!   bytes per 512 zeros/ones for the select samples
//! - `rank1`: O(1), at most 8 popcounts
//! - `select0` / `select1`: O(1) expected for uniform density
//!
//! # Examples
//!
//! ```
//! use rangecraft::core::bitvec::BitVec;
//!
//! let bv = BitVec::from_words(vec![0b1011], 4).unwrap();
//! assert_eq!(bv.rank1(4), 3);
//! assert_eq!(bv.select1(2), Some(3));
//! assert_eq!(bv.select0(0), Some(2));
//! ```

#![allow(clippy::cast_possible_truncation)]

use crate::error::{RangeCraftError, Result};
use crate::util::bitops::{bit_offset, bits_to_words, low_mask, select_in_word, word_index};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Bits per rank block.
const BLOCK_BITS: usize = 512;

/// Words per rank block.
const BLOCK_WORDS: usize = BLOCK_BITS / 64;

/// Sampling rate of the select indexes.
const SELECT_SAMPLE: usize = 512;

/// Immutable bit vector with rank/select indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
    ones: usize,
    block_ranks: Vec<u64>,
    select0_samples: Vec<u32>,
    select1_samples: Vec<u32>,
}

impl BitVec {
    /// Build a bit vector from packed words holding `len` bits.
    ///
    /// Bits of the last word at positions `>= len` are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::InvalidParameters`] if `words` holds fewer
    /// than `len` bits, and [`RangeCraftError::BackendOverflow`] if the vector
    /// has more blocks than the select samples can address.
    pub fn from_words(mut words: Vec<u64>, len: usize) -> Result<Self> {
        let required = bits_to_words(len);
        if words.len() < required {
            return Err(RangeCraftError::invalid_parameters(format!(
                "bit vector of {} bits needs {} words, got {}",
                len,
                required,
                words.len()
            )));
        }
        words.truncate(required);
        if bit_offset(len) != 0 {
            if let Some(last) = words.last_mut() {
                *last &= low_mask(bit_offset(len) as u32);
            }
        }

        let num_blocks = words.len().div_ceil(BLOCK_WORDS);
        if num_blocks > u32::MAX as usize {
            return Err(RangeCraftError::backend_overflow(format!(
                "bit vector with {} blocks exceeds select index range",
                num_blocks
            )));
        }

        let mut block_ranks = Vec::with_capacity(num_blocks + 1);
        let mut total = 0u64;
        for block in words.chunks(BLOCK_WORDS) {
            block_ranks.push(total);
            total += block.iter().map(|w| u64::from(w.count_ones())).sum::<u64>();
        }
        block_ranks.push(total);

        let ones = total as usize;
        let mut bv = Self {
            words,
            len,
            ones,
            block_ranks,
            select0_samples: Vec::new(),
            select1_samples: Vec::new(),
        };
        bv.select1_samples = bv.build_samples(ones, |b, v| v.ones_before_block(b));
        bv.select0_samples = bv.build_samples(len - ones, |b, v| v.zeros_before_block(b));
        Ok(bv)
    }

    /// Build a bit vector of `len` bits with the given positions set.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::InvalidParameters`] if a position is `>= len`.
    pub fn from_positions<I>(len: usize, positions: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut words = vec![0u64; bits_to_words(len)];
        for pos in positions {
            if pos >= len {
                return Err(RangeCraftError::invalid_parameters(format!(
                    "bit position {} out of range for length {}",
                    pos, len
                )));
            }
            words[word_index(pos)] |= 1u64 << bit_offset(pos);
        }
        Self::from_words(words, len)
    }

    fn build_samples(&self, total: usize, before: impl Fn(usize, &Self) -> usize) -> Vec<u32> {
        let num_blocks = self.block_ranks.len() - 1;
        let mut samples = Vec::with_capacity(total / SELECT_SAMPLE + 1);
        let mut next = 0usize;
        for block in 0..num_blocks {
            let upto = before(block + 1, self).min(total);
            while next < upto {
                samples.push(block as u32);
                next += SELECT_SAMPLE;
            }
        }
        samples
    }

    /// Number of bits.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the vector holds no bits.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    #[must_use]
    #[inline]
    pub const fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of unset bits.
    #[must_use]
    #[inline]
    pub const fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    /// Raw packed words.
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Value of bit `index`. Out-of-range indexes read as `false`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.words[word_index(index)] >> bit_offset(index)) & 1 == 1
    }

    /// Number of set bits in `[0, index)`. `index` is clamped to `len`.
    #[must_use]
    pub fn rank1(&self, index: usize) -> usize {
        let index = index.min(self.len);
        let block = index / BLOCK_BITS;
        let mut rank = self.block_ranks[block] as usize;
        let first_word = block * BLOCK_WORDS;
        let last_word = word_index(index);
        for w in &self.words[first_word..last_word] {
            rank += w.count_ones() as usize;
        }
        let off = bit_offset(index);
        if off != 0 {
            rank += (self.words[last_word] & low_mask(off as u32)).count_ones() as usize;
        }
        rank
    }

    /// Number of unset bits in `[0, index)`. `index` is clamped to `len`.
    #[must_use]
    pub fn rank0(&self, index: usize) -> usize {
        index.min(self.len) - self.rank1(index)
    }

    /// Position of the `k`-th set bit (0-indexed), or `None` if there is none.
    #[must_use]
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }
        let start = self.select1_samples[k / SELECT_SAMPLE] as usize;
        Some(self.select_from(k, start, Self::ones_before_block, |w| w))
    }

    /// Position of the `k`-th unset bit (0-indexed), or `None` if there is none.
    #[must_use]
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.count_zeros() {
            return None;
        }
        let start = self.select0_samples[k / SELECT_SAMPLE] as usize;
        Some(self.select_from(k, start, Self::zeros_before_block, |w| !w))
    }

    fn select_from(
        &self,
        k: usize,
        mut block: usize,
        before: fn(&Self, usize) -> usize,
        view: fn(u64) -> u64,
    ) -> usize {
        let num_blocks = self.block_ranks.len() - 1;
        while block + 1 < num_blocks && before(self, block + 1) <= k {
            block += 1;
        }
        let mut remaining = k - before(self, block);
        let end = ((block + 1) * BLOCK_WORDS).min(self.words.len());
        for w in block * BLOCK_WORDS..end {
            let word = view(self.words[w]);
            let count = word.count_ones() as usize;
            if remaining < count {
                return w * 64 + select_in_word(word, remaining as u32) as usize;
            }
            remaining -= count;
        }
        // the k-th bit exists, so the scan above always returns
        self.len
    }

    #[inline]
    fn ones_before_block(&self, block: usize) -> usize {
        self.block_ranks[block] as usize
    }

    #[inline]
    fn zeros_before_block(&self, block: usize) -> usize {
        (block * BLOCK_BITS).min(self.len) - self.block_ranks[block] as usize
    }

    /// Heap bytes held by the raw bits and the indexes.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.words.len() * 8
            + self.block_ranks.len() * 8
            + (self.select0_samples.len() + self.select1_samples.len()) * 4
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawBitVec {
    words: Vec<u64>,
    len: usize,
}

// Only the raw bits are serialized; indexes are rebuilt on load.
#[cfg(feature = "serde")]
impl Serialize for BitVec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RawBitVec", 2)?;
        state.serialize_field("words", &self.words)?;
        state.serialize_field("len", &self.len)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BitVec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawBitVec::deserialize(deserializer)?;
        BitVec::from_words(raw.words, raw.len).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_rank1(bits: &[bool], i: usize) -> usize {
        bits[..i].iter().filter(|&&b| b).count()
    }

    fn pseudo_random_bits(len: usize, density_per_mille: u64) -> Vec<bool> {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state % 1000 < density_per_mille
            })
            .collect()
    }

    #[test]
    fn test_rank_select_basic() {
        let bv = BitVec::from_words(vec![0b1011, 0b1101], 128).unwrap();
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(4), 3);
        assert!(bv.get(0));
        assert!(!bv.get(2));
        assert_eq!(bv.count_ones(), 6);
        assert_eq!(bv.select1(0), Some(0));
        assert_eq!(bv.select1(2), Some(3));
        assert_eq!(bv.select1(3), Some(64));
        assert_eq!(bv.select1(6), None);
        assert_eq!(bv.select0(0), Some(2));
        assert_eq!(bv.select0(1), Some(4));
    }

    #[test]
    fn test_empty() {
        let bv = BitVec::from_words(Vec::new(), 0).unwrap();
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(10), 0);
        assert_eq!(bv.select0(0), None);
        assert_eq!(bv.select1(0), None);
    }

    #[test]
    fn test_trailing_bits_are_masked() {
        let bv = BitVec::from_words(vec![u64::MAX], 10).unwrap();
        assert_eq!(bv.count_ones(), 10);
        assert_eq!(bv.count_zeros(), 0);
        assert_eq!(bv.select0(0), None);
        assert!(!bv.get(10));
    }

    #[test]
    fn test_too_few_words() {
        assert!(BitVec::from_words(vec![0], 65).is_err());
        assert!(BitVec::from_positions(10, [10]).is_err());
    }

    #[test]
    fn test_against_naive_over_many_blocks() {
        for density in [5, 300, 500, 995] {
            let bits = pseudo_random_bits(5_000, density);
            let positions = bits.iter().enumerate().filter(|&(_, &b)| b).map(|(i, _)| i);
            let bv = BitVec::from_positions(bits.len(), positions).unwrap();

            for i in (0..=bits.len()).step_by(37) {
                assert_eq!(bv.rank1(i), naive_rank1(&bits, i));
                assert_eq!(bv.rank0(i), i - naive_rank1(&bits, i));
            }

            let ones: Vec<usize> = (0..bits.len()).filter(|&i| bits[i]).collect();
            let zeros: Vec<usize> = (0..bits.len()).filter(|&i| !bits[i]).collect();
            for (k, &pos) in ones.iter().enumerate() {
                assert_eq!(bv.select1(k), Some(pos));
            }
            for (k, &pos) in zeros.iter().enumerate() {
                assert_eq!(bv.select0(k), Some(pos));
            }
            assert_eq!(bv.select1(ones.len()), None);
            assert_eq!(bv.select0(zeros.len()), None);
        }
    }
}
