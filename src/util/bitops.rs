//! Bit manipulation helpers for the succinct stores.
//!
//! All helpers work on little-endian bit order inside `u64` words:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```

#![allow(clippy::cast_possible_truncation)]

/// Number of 64-bit words needed to hold `n_bits` bits.
///
/// # Examples
///
/// ```
/// use rangecraft::util::bitops::bits_to_words;
///
/// assert_eq!(bits_to_words(0), 0);
/// assert_eq!(bits_to_words(1), 1);
/// assert_eq!(bits_to_words(64), 1);
/// assert_eq!(bits_to_words(65), 2);
/// ```
#[inline]
#[must_use]
pub const fn bits_to_words(n_bits: usize) -> usize {
    n_bits.div_ceil(64)
}

/// Word index for a bit position.
#[inline(always)]
#[must_use]
pub const fn word_index(bit_index: usize) -> usize {
    bit_index / 64
}

/// Bit offset within a word for a bit position.
#[inline(always)]
#[must_use]
pub const fn bit_offset(bit_index: usize) -> usize {
    bit_index % 64
}

/// Mask with the lowest `width` bits set. `width` may be 64.
///
/// # Examples
///
/// ```
/// use rangecraft::util::bitops::low_mask;
///
/// assert_eq!(low_mask(0), 0);
/// assert_eq!(low_mask(3), 0b111);
/// assert_eq!(low_mask(64), u64::MAX);
/// ```
#[inline]
#[must_use]
pub const fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// `⌊log2(x)⌋` for `x > 0`, and 0 for `x == 0`.
///
/// # Examples
///
/// ```
/// use rangecraft::util::bitops::floor_log2;
///
/// assert_eq!(floor_log2(1), 0);
/// assert_eq!(floor_log2(8), 3);
/// assert_eq!(floor_log2(9), 3);
/// ```
#[inline]
#[must_use]
pub const fn floor_log2(x: u64) -> u32 {
    if x == 0 {
        0
    } else {
        63 - x.leading_zeros()
    }
}

/// Position of the `k`-th set bit (0-indexed) in `word`.
///
/// The caller guarantees `k < word.count_ones()`.
#[inline]
#[must_use]
pub fn select_in_word(mut word: u64, k: u32) -> u32 {
    for _ in 0..k {
        // clear lowest set bit
        word &= word - 1;
    }
    word.trailing_zeros()
}

/// Read `width` bits starting at bit `pos` from a packed word slice.
///
/// Bits past the end of the slice read as zero.
#[inline]
#[must_use]
pub fn read_bits(words: &[u64], pos: usize, width: u32) -> u64 {
    if width == 0 {
        return 0;
    }
    let idx = word_index(pos);
    let off = bit_offset(pos) as u32;
    let lo = words.get(idx).copied().unwrap_or(0) >> off;
    let value = if off + width > 64 {
        let hi = words.get(idx + 1).copied().unwrap_or(0);
        lo | (hi << (64 - off))
    } else {
        lo
    };
    value & low_mask(width)
}

/// Write the low `width` bits of `value` at bit `pos` into a zero-initialized slice.
///
/// # Panics
///
/// Panics if the slice is too short to hold `pos + width` bits.
#[inline]
pub fn write_bits(words: &mut [u64], pos: usize, width: u32, value: u64) {
    if width == 0 {
        return;
    }
    let value = value & low_mask(width);
    let idx = word_index(pos);
    let off = bit_offset(pos) as u32;
    words[idx] |= value << off;
    if off + width > 64 {
        words[idx + 1] |= value >> (64 - off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_in_word() {
        let w = 0b1011_0100u64;
        assert_eq!(select_in_word(w, 0), 2);
        assert_eq!(select_in_word(w, 1), 4);
        assert_eq!(select_in_word(w, 2), 5);
        assert_eq!(select_in_word(w, 3), 7);
        assert_eq!(select_in_word(u64::MAX, 63), 63);
        assert_eq!(select_in_word(1u64 << 63, 0), 63);
    }

    #[test]
    fn test_read_write_bits_across_words() {
        let mut words = vec![0u64; 3];
        write_bits(&mut words, 60, 10, 0b11_0101_1011);
        assert_eq!(read_bits(&words, 60, 10), 0b11_0101_1011);
        write_bits(&mut words, 0, 7, 0x7f);
        assert_eq!(read_bits(&words, 0, 7), 0x7f);
        assert_eq!(read_bits(&words, 60, 10), 0b11_0101_1011);
        write_bits(&mut words, 128, 64, u64::MAX);
        assert_eq!(read_bits(&words, 128, 64), u64::MAX);
    }

    #[test]
    fn test_read_bits_past_end_is_zero() {
        let words = vec![u64::MAX];
        assert_eq!(read_bits(&words, 60, 8), 0b1111);
        assert_eq!(read_bits(&words, 200, 8), 0);
    }

    #[test]
    fn test_packed_sequence() {
        let width = 13;
        let values: Vec<u64> = (0..100).map(|i| (i * 7919) & low_mask(width)).collect();
        let mut words = vec![0u64; bits_to_words(values.len() * width as usize)];
        for (i, &v) in values.iter().enumerate() {
            write_bits(&mut words, i * width as usize, width, v);
        }
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(read_bits(&words, i * width as usize, width), v);
        }
    }
}
