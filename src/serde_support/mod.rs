//! Serialization support for range filters.
//!
//! # Formats
//!
//! ## Binary (always available)
//!
//! [`binary`] writes the fixed little-endian layout
//!
//! ```text
//! [first][last][n_items][a][b][r][store blob]
//! ```
//!
//! through `to_bytes` / `from_bytes` and the streaming `write_to` /
//! `read_from` on each filter. Store blobs are self-describing, so several
//! filters can be concatenated in one stream.
//!
//! ## Serde (feature `serde`)
//!
//! [`standard`] implements `Serialize` / `Deserialize` with a version tag
//! and store name, usable with any serde format:
//!
//! ```toml
//! [dependencies]
//! rangecraft = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Validation
//!
//! Both decoders rebuild the filter through the same consistency checks:
//! the header bounds must match the store's minimum and maximum, the store
//! must be sorted, and every declared length must match the data.

pub mod binary;

#[cfg(feature = "serde")]
pub mod standard;

pub use binary::CodecError;

#[cfg(feature = "serde")]
pub use standard::FilterSerdeSupport;

/// Serialization version for the serde format.
///
/// Increment this when making breaking changes to serialization format.
pub const SERIALIZATION_VERSION: u16 = 1;
