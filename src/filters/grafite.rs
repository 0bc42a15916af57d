//! Grafite range filter.
//!
//! Keys are hashed into a reduced universe `[0, r)` by a [`UniverseHasher`]
//! and the sorted hashes are kept in a [`RangeEmptiness`] store. A query
//! `[left, right]` maps to one cyclic interval of the reduced universe per
//! hash block it touches, and each interval is answered by the store.
//!
//! # False Positive Rate
//!
//! For an empty query range of length `l`, the probability of a positive
//! answer is at most `l × n / r`, independent of how the query is chosen:
//!
//! ```text
//! r = ⌈n × L / ε⌉          (target ε on ranges up to L)
//! r = ⌈n × 2^(bpk − 2)⌉    (Elias-Fano space budget)
//! ```
//!
//! # Query Algorithm
//!
//! Inside one hash block the hash is a cyclic shift of `x mod r`, so `[left,
//! right]` maps to `[h(left), h(right)]`, wrapping past zero when
//! `h(left) > h(right)`. The stored bounds `first` and `last` answer most
//! empty ranges without touching the store:
//!
//! ```text
//! hl > hr                 → first <= hr || last >= hl
//! hl > last || hr < first → false
//! hr > last               → hl <= last
//! hl < first              → first <= hr
//! otherwise               → store.contains_range(hl, hr)
//! ```
//!
//! A range crossing one block boundary is split in two at the boundary. A
//! range covering a whole block touches every reduced value and is positive.
//!
//! # Examples
//!
//! ```
//! use rangecraft::filters::GrafiteFilter;
//! use rangecraft::core::RangeFilter;
//!
//! let keys: Vec<u64> = (0..10_000u64).map(|i| i * 7_919 + 100_000).collect();
//! let filter: GrafiteFilter = GrafiteFilter::with_fpr(&keys, 0.01, 64).unwrap();
//!
//! // no false negatives
//! assert!(filter.query_range(100_000, 100_010));
//! assert!(filter.query_point(100_000 + 7_919 * 42));
//! ```

#![allow(clippy::module_name_repetitions)]

use crate::core::params;
use crate::core::RangeFilter;
use crate::error::{RangeCraftError, Result};
use crate::hash::{default_rng, UniverseHasher};
use crate::store::{DuplicatePolicy, EliasFanoStore, RangeEmptiness};
use rand::Rng;

/// Bytes of fixed header: first, last, n_items, a, b, r.
pub(crate) const HEADER_BYTES: usize = 6 * 8;

/// How the reduced universe is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Sizing {
    /// Target false positive rate on ranges up to a given length.
    FalsePositiveRate { fp_rate: f64, max_range_len: u64 },
    /// Space budget in bits per key.
    BitsPerKey(f64),
    /// Explicit reduced-universe size.
    Universe(u64),
}

impl Sizing {
    pub(crate) fn universe(self, n: usize, overhead: u32) -> Result<u64> {
        match self {
            Self::FalsePositiveRate {
                fp_rate,
                max_range_len,
            } => params::reduced_universe_from_fpr(n, fp_rate, max_range_len),
            Self::BitsPerKey(bpk) => params::reduced_universe_from_bpk(n, bpk, overhead),
            Self::Universe(0) => Err(RangeCraftError::invalid_parameters(
                "reduced universe must be at least 1",
            )),
            Self::Universe(r) => Ok(r),
        }
    }
}

/// Construction knobs that do not affect sizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BuildOptions {
    pub(crate) duplicates: DuplicatePolicy,
    pub(crate) parallel_sort: bool,
}

/// Range filter with a provable false positive bound.
///
/// Generic over the store holding the hashed keys; [`EliasFanoStore`] by
/// default. Immutable once built.
///
/// # Examples
///
/// ```
/// use rangecraft::filters::GrafiteFilter;
/// use rangecraft::store::SortedVecStore;
///
/// let keys = [1_000u64, 2_000, 3_000, 1 << 40];
/// let filter = GrafiteFilter::<SortedVecStore>::new(&keys, 20.0).unwrap();
/// assert!(filter.query_range(1_500, 2_500));
/// assert_eq!(filter.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrafiteFilter<S = EliasFanoStore> {
    hasher: UniverseHasher,
    n_items: usize,
    first: u64,
    last: u64,
    store: S,
}

impl<S: RangeEmptiness> GrafiteFilter<S> {
    /// Build a filter spending about `bits_per_key` bits per key.
    ///
    /// Coefficients are drawn from an entropy-seeded generator; use
    /// [`GrafiteFilterBuilder`](crate::builder::GrafiteFilterBuilder) with a
    /// seed for reproducible filters.
    ///
    /// # Errors
    ///
    /// - [`RangeCraftError::InvalidBitsPerKey`] if `bits_per_key` is not positive
    /// - [`RangeCraftError::SizingInfeasible`] if the largest key is below the
    ///   implied reduced universe
    pub fn new(keys: &[u64], bits_per_key: f64) -> Result<Self> {
        Self::build(
            keys,
            Sizing::BitsPerKey(bits_per_key),
            &mut default_rng(),
            BuildOptions::default(),
        )
    }

    /// Build a filter with false positive rate `fp_rate` on ranges of up to
    /// `max_range_len` keys.
    ///
    /// # Errors
    ///
    /// - [`RangeCraftError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1)
    /// - [`RangeCraftError::InvalidParameters`] if `max_range_len == 0`
    /// - [`RangeCraftError::SizingInfeasible`] if the largest key is below `r`
    pub fn with_fpr(keys: &[u64], fp_rate: f64, max_range_len: u64) -> Result<Self> {
        Self::build(
            keys,
            Sizing::FalsePositiveRate {
                fp_rate,
                max_range_len,
            },
            &mut default_rng(),
            BuildOptions::default(),
        )
    }

    /// Build a filter over an explicit reduced universe of size `universe`.
    ///
    /// # Errors
    ///
    /// - [`RangeCraftError::InvalidParameters`] if `universe == 0`
    /// - [`RangeCraftError::SizingInfeasible`] if the largest key is below `universe`
    pub fn with_universe(keys: &[u64], universe: u64) -> Result<Self> {
        Self::build(
            keys,
            Sizing::Universe(universe),
            &mut default_rng(),
            BuildOptions::default(),
        )
    }

    /// Filter over no keys. Every query returns `false`.
    ///
    /// # Errors
    ///
    /// Propagates a store failure to build from an empty sequence.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            hasher: UniverseHasher::from_parts(1, 0, 1)?,
            n_items: 0,
            first: 0,
            last: 0,
            store: S::from_sorted(&[])?,
        })
    }

    pub(crate) fn build<R: Rng + ?Sized>(
        keys: &[u64],
        sizing: Sizing,
        rng: &mut R,
        options: BuildOptions,
    ) -> Result<Self> {
        if keys.is_empty() {
            tracing::debug!(store = S::NAME, "building empty grafite filter");
            return Self::empty();
        }

        let universe = sizing.universe(keys.len(), S::BPK_OVERHEAD)?;
        let hasher = UniverseHasher::new(universe, rng)?;

        let mut max_key = 0u64;
        let mut hashed = Vec::with_capacity(keys.len());
        for &key in keys {
            max_key = max_key.max(key);
            hashed.push(hasher.hash(key));
        }
        if max_key < universe {
            return Err(RangeCraftError::sizing_infeasible(max_key, universe));
        }

        sort_hashed(&mut hashed, options.parallel_sort);
        if options.duplicates == DuplicatePolicy::Collapse {
            hashed.dedup();
        }

        let (first, last) = match (hashed.first(), hashed.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(RangeCraftError::internal_error("hashed buffer is empty")),
        };
        let store = S::from_sorted(&hashed)?;

        let filter = Self {
            hasher,
            n_items: keys.len(),
            first,
            last,
            store,
        };
        tracing::debug!(
            n = filter.n_items,
            universe,
            store = S::NAME,
            stored = filter.store.len(),
            store_bytes = filter.store.size_in_bytes(),
            bits_per_key = filter.bits_per_key(),
            "built grafite filter"
        );
        Ok(filter)
    }

    /// Reassemble a filter from decoded parts, checking their consistency.
    pub(crate) fn from_parts(
        hasher: UniverseHasher,
        n_items: usize,
        first: u64,
        last: u64,
        store: S,
    ) -> Result<Self> {
        let hasher = UniverseHasher::from_parts(hasher.a(), hasher.b(), hasher.universe())
            .map_err(|e| RangeCraftError::serialization_error(e.to_string()))?;
        if n_items == 0 {
            if !store.is_empty() {
                return Err(RangeCraftError::serialization_error(
                    "empty filter carries a non-empty store",
                ));
            }
        } else {
            let consistent = store.len() <= n_items
                && store.min_value() == Some(first)
                && store.max_value() == Some(last)
                && last < hasher.universe();
            if !consistent {
                return Err(RangeCraftError::serialization_error(format!(
                    "store of {} values over [{:?}, {:?}] does not match header \
                     (n = {}, first = {}, last = {}, r = {})",
                    store.len(),
                    store.min_value(),
                    store.max_value(),
                    n_items,
                    first,
                    last,
                    hasher.universe()
                )));
            }
        }
        Ok(Self {
            hasher,
            n_items,
            first,
            last,
            store,
        })
    }

    /// Check whether `key` might be in the set.
    #[must_use]
    pub fn query_point(&self, key: u64) -> bool {
        if self.n_items == 0 {
            return false;
        }
        let h = self.hasher.hash(key);
        if h < self.first || h > self.last {
            return false;
        }
        self.store.contains(h)
    }

    /// Check whether some key might lie in `[left, right]`.
    ///
    /// # Panics
    ///
    /// Panics if `left > right`.
    #[must_use]
    pub fn query_range(&self, left: u64, right: u64) -> bool {
        assert!(
            left <= right,
            "query range must satisfy left <= right, got [{}, {}]",
            left,
            right
        );
        if self.n_items == 0 {
            return false;
        }
        if left == right {
            return self.query_point(left);
        }

        let boundary = self.hasher.block_end(left);
        if right <= boundary {
            return self.query_block(left, right);
        }
        // boundary < right, so boundary + 1 cannot overflow
        if right > self.hasher.block_end(boundary + 1) {
            return true;
        }
        self.query_block(left, boundary) || self.query_block(boundary + 1, right)
    }

    /// Range query for endpoints in one hash block.
    fn query_block(&self, left: u64, right: u64) -> bool {
        let hl = self.hasher.hash(left);
        let hr = self.hasher.hash(right);

        if hl > hr {
            self.first <= hr || self.last >= hl
        } else if hl > self.last || hr < self.first {
            false
        } else if hr > self.last {
            hl <= self.last
        } else if hl < self.first {
            self.first <= hr
        } else {
            self.store.contains_range(hl, hr)
        }
    }

    /// Number of keys the filter was built from.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n_items
    }

    /// True if built from no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n_items == 0
    }

    /// Size `r` of the reduced universe.
    #[must_use]
    pub const fn reduced_universe(&self) -> u64 {
        self.hasher.universe()
    }

    /// Smallest and largest stored hash, or `None` for an empty filter.
    #[must_use]
    pub const fn bounds(&self) -> Option<(u64, u64)> {
        if self.n_items == 0 {
            None
        } else {
            Some((self.first, self.last))
        }
    }

    /// Hash function mapping keys into the reduced universe.
    #[must_use]
    pub const fn hasher(&self) -> &UniverseHasher {
        &self.hasher
    }

    /// Backing store of reduced keys.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Bytes occupied: the fixed header plus the store.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        HEADER_BYTES + self.store.size_in_bytes()
    }

    /// Space per key in bits.
    #[must_use]
    pub fn bits_per_key(&self) -> f64 {
        params::bits_per_key(self.size_in_bytes(), self.n_items)
    }

    /// Bound `min(1, l × n / r)` on the false positive rate of an empty range
    /// of `range_len` keys.
    #[must_use]
    pub fn expected_fpr(&self, range_len: u64) -> f64 {
        params::expected_fpr(range_len, self.n_items, self.hasher.universe())
    }

    pub(crate) const fn raw_bounds(&self) -> (u64, u64) {
        (self.first, self.last)
    }
}

impl<S: RangeEmptiness> RangeFilter for GrafiteFilter<S> {
    fn query_range(&self, left: u64, right: u64) -> bool {
        GrafiteFilter::query_range(self, left, right)
    }

    fn query_point(&self, key: u64) -> bool {
        GrafiteFilter::query_point(self, key)
    }

    fn len(&self) -> usize {
        self.n_items
    }

    fn size_in_bytes(&self) -> usize {
        GrafiteFilter::size_in_bytes(self)
    }
}

fn sort_hashed(values: &mut [u64], parallel: bool) {
    #[cfg(feature = "rayon")]
    {
        if parallel {
            use rayon::slice::ParallelSliceMut;
            values.par_sort_unstable();
            return;
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    values.sort_unstable();
}
