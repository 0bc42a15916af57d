//! Byte-level binary format for range filters.
//!
//! Every field is a little-endian `u64`. Filters write a fixed header followed
//! by the store blob; stores embed their own element and word counts, so no
//! outer length prefix is needed.
//!
//! # Format
//!
//! ```text
//! GrafiteFilter
//!   first:      8 bytes   smallest stored hash
//!   last:       8 bytes   largest stored hash
//!   n_items:    8 bytes   number of input keys
//!   a:          8 bytes   hash coefficient
//!   b:          8 bytes   hash coefficient
//!   r:          8 bytes   reduced universe size
//!   store:      variable  backend-defined, self-describing
//!
//! BucketingFilter
//!   bucket_size: 8 bytes
//!   last_bucket: 8 bytes
//!   store:       variable
//! ```
//!
//! All encoding is done through explicit byte operations. There is no
//! `unsafe` and no dependence on struct layout or padding.
//!
//! # Examples
//!
//! ```
//! use rangecraft::filters::GrafiteFilter;
//!
//! let keys: Vec<u64> = (0..1000).map(|i| i * 1_000_003).collect();
//! let filter: GrafiteFilter = GrafiteFilter::new(&keys, 12.0).unwrap();
//!
//! let bytes = filter.to_bytes().unwrap();
//! let restored: GrafiteFilter = GrafiteFilter::from_bytes(&bytes).unwrap();
//! assert_eq!(restored.size_in_bytes(), filter.size_in_bytes());
//! assert!(restored.query_range(0, 10));
//! ```

use crate::error::{RangeCraftError, Result};
use crate::filters::{BucketingFilter, GrafiteFilter};
use crate::hash::UniverseHasher;
use crate::store::RangeEmptiness;
use std::io::{Read, Write};

/// Largest number of words pre-allocated from an untrusted length field.
const MAX_PREALLOC_WORDS: usize = 1 << 16;

/// Low-level codec errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    /// Input ended while reading a field.
    #[error("buffer too small: input ended while reading {field}")]
    BufferTooSmall {
        /// Field being read.
        field: &'static str,
    },

    /// Header fields contradict each other.
    #[error("inconsistent header: {0}")]
    InconsistentHeader(String),

    /// Bytes left over after a complete structure.
    #[error("{0} trailing bytes after encoded structure")]
    TrailingBytes(usize),

    /// Underlying reader or writer failed.
    #[error("io error: {0}")]
    Io(String),
}

impl From<CodecError> for RangeCraftError {
    fn from(err: CodecError) -> Self {
        RangeCraftError::serialization_error(err.to_string())
    }
}

/// Write one little-endian `u64`.
///
/// # Errors
///
/// Returns [`RangeCraftError::SerializationError`] if the writer fails.
pub fn write_u64<W: Write + ?Sized>(writer: &mut W, value: u64) -> Result<()> {
    writer
        .write_all(&value.to_le_bytes())
        .map_err(|e| CodecError::Io(e.to_string()).into())
}

/// Read one little-endian `u64`.
///
/// # Errors
///
/// Returns [`RangeCraftError::SerializationError`] on truncated input.
pub fn read_u64<R: Read + ?Sized>(reader: &mut R, field: &'static str) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => CodecError::BufferTooSmall { field },
        _ => CodecError::Io(e.to_string()),
    })?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a slice of words without a length prefix.
///
/// # Errors
///
/// Returns [`RangeCraftError::SerializationError`] if the writer fails.
pub fn write_words<W: Write + ?Sized>(writer: &mut W, words: &[u64]) -> Result<()> {
    for &w in words {
        write_u64(writer, w)?;
    }
    Ok(())
}

/// Read `count` words.
///
/// Allocation grows with the data actually read, so a corrupted count fails
/// on truncation instead of reserving memory up front.
///
/// # Errors
///
/// Returns [`RangeCraftError::SerializationError`] on truncated input.
pub fn read_words<R: Read + ?Sized>(
    reader: &mut R,
    count: u64,
    field: &'static str,
) -> Result<Vec<u64>> {
    let count = usize::try_from(count).map_err(|_| {
        CodecError::InconsistentHeader(format!("{} count {} exceeds usize", field, count))
    })?;
    let mut words = Vec::with_capacity(count.min(MAX_PREALLOC_WORDS));
    for _ in 0..count {
        words.push(read_u64(reader, field)?);
    }
    Ok(words)
}

/// Convert a decoded `u64` into `usize`.
///
/// # Errors
///
/// Returns [`RangeCraftError::SerializationError`] if the value does not fit.
pub fn to_usize(value: u64, field: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        CodecError::InconsistentHeader(format!("{} = {} exceeds usize", field, value)).into()
    })
}

/// Run a decoder over a complete byte slice, rejecting trailing bytes.
///
/// # Errors
///
/// Propagates decoder errors and returns [`CodecError::TrailingBytes`] if
/// input remains after decoding.
pub fn decode_exact<T>(bytes: &[u8], decode: impl FnOnce(&mut &[u8]) -> Result<T>) -> Result<T> {
    let mut cursor = bytes;
    let value = decode(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(CodecError::TrailingBytes(cursor.len()).into());
    }
    Ok(value)
}

impl<S: RangeEmptiness> GrafiteFilter<S> {
    /// Write the filter in the binary layout described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] if the writer fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let (first, last) = self.raw_bounds();
        let hasher = self.hasher();
        write_u64(writer, first)?;
        write_u64(writer, last)?;
        write_u64(writer, self.len() as u64)?;
        write_u64(writer, hasher.a())?;
        write_u64(writer, hasher.b())?;
        write_u64(writer, hasher.universe())?;
        self.store().write_to(writer)
    }

    /// Read a filter written by [`write_to`](Self::write_to).
    ///
    /// Consumes exactly the bytes of one filter.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] on truncated input or
    /// when the header disagrees with the store.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let first = read_u64(reader, "first")?;
        let last = read_u64(reader, "last")?;
        let n_items = to_usize(read_u64(reader, "n_items")?, "n_items")?;
        let a = read_u64(reader, "hash coefficient a")?;
        let b = read_u64(reader, "hash coefficient b")?;
        let r = read_u64(reader, "reduced universe")?;
        let hasher = UniverseHasher::from_parts(a, b, r)
            .map_err(|e| CodecError::InconsistentHeader(e.to_string()))?;
        let store = S::read_from(reader)?;

        let filter = Self::from_parts(hasher, n_items, first, last, store)?;
        tracing::debug!(n = n_items, universe = r, store = S::NAME, "decoded grafite filter");
        Ok(filter)
    }

    /// Encode into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Propagates store encoding failures.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size_in_bytes());
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Decode a filter occupying the whole of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] on malformed input or
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_exact(bytes, |reader| Self::read_from(reader))
    }
}

impl<S: RangeEmptiness> BucketingFilter<S> {
    /// Write the filter in the binary layout described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] if the writer fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_u64(writer, self.bucket_size())?;
        write_u64(writer, self.last_bucket())?;
        self.store().write_to(writer)
    }

    /// Read a filter written by [`write_to`](Self::write_to).
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] on truncated or
    /// inconsistent input.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let bucket_size = read_u64(reader, "bucket_size")?;
        let last_bucket = read_u64(reader, "last_bucket")?;
        let store = S::read_from(reader)?;
        let filter = Self::from_parts(bucket_size, last_bucket, store)?;
        tracing::debug!(bucket_size, buckets = filter.len(), store = S::NAME, "decoded bucketing filter");
        Ok(filter)
    }

    /// Encode into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Propagates store encoding failures.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size_in_bytes());
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Decode a filter occupying the whole of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeCraftError::SerializationError`] on malformed input or
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_exact(bytes, |reader| Self::read_from(reader))
    }
}
