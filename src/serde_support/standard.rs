//! Serde serialization for range filters.
//!
//! Implements `Serialize`/`Deserialize` for [`GrafiteFilter`] and
//! [`BucketingFilter`] through a versioned intermediate representation, so
//! the filters work with any serde format (JSON, bincode, CBOR, ...).
//!
//! # Format
//!
//! - Format version (for compatibility checking)
//! - Store name (prevents decoding one backend as another)
//! - Filter header fields
//! - Store contents
//!
//! Deserialization re-checks every invariant the binary decoder checks.
//!
//! # Examples
//!
//! ```
//! use rangecraft::filters::GrafiteFilter;
//!
//! let keys: Vec<u64> = (1..=500u64).map(|i| i * 99_991).collect();
//! let filter: GrafiteFilter = GrafiteFilter::new(&keys, 10.0).unwrap();
//!
//! let json = serde_json::to_string(&filter).unwrap();
//! let restored: GrafiteFilter = serde_json::from_str(&json).unwrap();
//! assert_eq!(restored, filter);
//!
//! let bytes = bincode::serialize(&filter).unwrap();
//! let restored: GrafiteFilter = bincode::deserialize(&bytes).unwrap();
//! assert_eq!(restored, filter);
//! ```

use super::SERIALIZATION_VERSION;
use crate::error::{RangeCraftError, Result};
use crate::filters::{BucketingFilter, GrafiteFilter};
use crate::hash::UniverseHasher;
use crate::store::RangeEmptiness;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serializable representation of a Grafite filter.
///
/// Serialized with `S = &Store`, deserialized with the owned store.
#[derive(Serialize, Deserialize)]
struct GrafiteFilterSerde<S> {
    version: u16,
    store_name: String,
    n_items: u64,
    first: u64,
    last: u64,
    hasher: UniverseHasher,
    store: S,
}

/// Serializable representation of a bucketing filter.
#[derive(Serialize, Deserialize)]
struct BucketingFilterSerde<S> {
    version: u16,
    store_name: String,
    bucket_size: u64,
    last_bucket: u64,
    store: S,
}

fn check_header<S: RangeEmptiness>(version: u16, store_name: &str) -> Result<()> {
    if version != SERIALIZATION_VERSION {
        return Err(RangeCraftError::serialization_error(format!(
            "unsupported format version {} (expected {})",
            version, SERIALIZATION_VERSION
        )));
    }
    if store_name != S::NAME {
        return Err(RangeCraftError::serialization_error(format!(
            "store mismatch: data was written by '{}', decoding as '{}'",
            store_name,
            S::NAME
        )));
    }
    Ok(())
}

impl<S> Serialize for GrafiteFilter<S>
where
    S: RangeEmptiness + Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        let (first, last) = self.raw_bounds();
        GrafiteFilterSerde {
            version: SERIALIZATION_VERSION,
            store_name: S::NAME.to_string(),
            n_items: self.len() as u64,
            first,
            last,
            hasher: *self.hasher(),
            store: self.store(),
        }
        .serialize(serializer)
    }
}

impl<'de, S> Deserialize<'de> for GrafiteFilter<S>
where
    S: RangeEmptiness + DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = GrafiteFilterSerde::<S>::deserialize(deserializer)?;
        check_header::<S>(repr.version, &repr.store_name).map_err(de::Error::custom)?;
        let n_items = usize::try_from(repr.n_items).map_err(de::Error::custom)?;
        GrafiteFilter::from_parts(repr.hasher, n_items, repr.first, repr.last, repr.store)
            .map_err(de::Error::custom)
    }
}

impl<S> Serialize for BucketingFilter<S>
where
    S: RangeEmptiness + Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        BucketingFilterSerde {
            version: SERIALIZATION_VERSION,
            store_name: S::NAME.to_string(),
            bucket_size: self.bucket_size(),
            last_bucket: self.last_bucket(),
            store: self.store(),
        }
        .serialize(serializer)
    }
}

impl<'de, S> Deserialize<'de> for BucketingFilter<S>
where
    S: RangeEmptiness + DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = BucketingFilterSerde::<S>::deserialize(deserializer)?;
        check_header::<S>(repr.version, &repr.store_name).map_err(de::Error::custom)?;
        BucketingFilter::from_parts(repr.bucket_size, repr.last_bucket, repr.store)
            .map_err(de::Error::custom)
    }
}

/// Convenience wrappers over bincode and JSON for any serde-enabled filter.
pub struct FilterSerdeSupport;

impl FilterSerdeSupport {
    /// Serialize a filter with bincode.
    ///
    /// # Examples
    ///
    /// ```
    /// use rangecraft::filters::BucketingFilter;
    /// use rangecraft::serde_support::FilterSerdeSupport;
    ///
    /// let filter: BucketingFilter = BucketingFilter::with_bucket_size(&[1, 2, 300], 4).unwrap();
    /// let bytes = FilterSerdeSupport::to_bincode(&filter).unwrap();
    /// let restored: BucketingFilter = FilterSerdeSupport::from_bincode(&bytes).unwrap();
    /// assert_eq!(restored, filter);
    /// ```
    pub fn to_bincode<F: Serialize>(filter: &F) -> Result<Vec<u8>> {
        bincode::serialize(filter).map_err(|e| RangeCraftError::serialization_error(e.to_string()))
    }

    /// Deserialize a filter from bincode.
    pub fn from_bincode<F: DeserializeOwned>(bytes: &[u8]) -> Result<F> {
        bincode::deserialize(bytes).map_err(|e| RangeCraftError::serialization_error(e.to_string()))
    }

    /// Serialize a filter to a JSON string.
    pub fn to_json<F: Serialize>(filter: &F) -> Result<String> {
        serde_json::to_string(filter).map_err(|e| RangeCraftError::serialization_error(e.to_string()))
    }

    /// Deserialize a filter from a JSON string.
    pub fn from_json<F: DeserializeOwned>(json: &str) -> Result<F> {
        serde_json::from_str(json).map_err(|e| RangeCraftError::serialization_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EliasFanoStore, SortedVecStore};

    fn keys() -> Vec<u64> {
        (1..=1_000u64).map(|i| i * 7_777_777).collect()
    }

    #[test]
    fn test_grafite_json_round_trip() {
        let filter: GrafiteFilter = GrafiteFilter::new(&keys(), 9.0).unwrap();
        let json = FilterSerdeSupport::to_json(&filter).unwrap();
        let restored: GrafiteFilter = FilterSerdeSupport::from_json(&json).unwrap();
        assert_eq!(restored, filter);
    }

    #[test]
    fn test_grafite_bincode_round_trip() {
        let filter: GrafiteFilter<SortedVecStore> = GrafiteFilter::new(&keys(), 9.0).unwrap();
        let bytes = FilterSerdeSupport::to_bincode(&filter).unwrap();
        let restored: GrafiteFilter<SortedVecStore> = FilterSerdeSupport::from_bincode(&bytes).unwrap();
        assert_eq!(restored, filter);
        for &k in &keys() {
            assert!(restored.query_point(k));
        }
    }

    #[test]
    fn test_store_mismatch_rejected() {
        let filter: GrafiteFilter<SortedVecStore> = GrafiteFilter::new(&keys(), 9.0).unwrap();
        let json = FilterSerdeSupport::to_json(&filter).unwrap();
        let err = FilterSerdeSupport::from_json::<GrafiteFilter<EliasFanoStore>>(&json).unwrap_err();
        assert!(matches!(err, RangeCraftError::SerializationError { .. }));
    }

    #[test]
    fn test_tampered_bounds_rejected() {
        let filter: GrafiteFilter = GrafiteFilter::new(&keys(), 9.0).unwrap();
        let mut value: serde_json::Value = serde_json::to_value(&filter).unwrap();
        let last = value["last"].as_u64().unwrap();
        value["last"] = serde_json::Value::from(last + 1);
        assert!(serde_json::from_value::<GrafiteFilter>(value).is_err());
    }

    #[test]
    fn test_unsorted_store_rejected() {
        let json = format!(
            r#"{{"version":{},"store_name":"sorted-vec","bucket_size":4,"last_bucket":1,"store":[3,1]}}"#,
            SERIALIZATION_VERSION
        );
        assert!(FilterSerdeSupport::from_json::<BucketingFilter<SortedVecStore>>(&json).is_err());
    }

    #[test]
    fn test_bucketing_round_trip() {
        let filter: BucketingFilter = BucketingFilter::new(&keys(), 10.0).unwrap();
        let bytes = bincode::serialize(&filter).unwrap();
        let restored: BucketingFilter = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, filter);
    }
}
