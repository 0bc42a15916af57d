//! Shared workload generators for the range filter benchmarks.
//!
//! Two query distributions:
//! - Uniform: left endpoints drawn uniformly from the key space
//! - Correlated: left endpoints placed just past a random key, the
//!   adversarial case for filters that learn the key distribution
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// BENCHMARK CONSTANTS

/// Key counts for construction and query benchmarks
pub const SIZES: &[usize] = &[
    10_000,    // fits in L2
    100_000,   // fits in L3
    1_000_000, // RAM
];

/// Space budgets in bits per key
pub const BITS_PER_KEY: &[f64] = &[8.0, 12.0, 16.0, 20.0];

/// Query range lengths
pub const RANGE_LENS: &[u64] = &[1, 32, 1_024];

/// Query batch size per iteration
pub const QUERIES: usize = 10_000;

/// Seed shared by all generators so runs are comparable
pub const SEED: u64 = 0x5EED;

// DATA GENERATORS

/// Sorted, deduplicated uniform keys over the full `u64` space.
pub fn uniform_keys(count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut keys: Vec<u64> = (0..count).map(|_| rng.gen_range(0..u64::MAX)).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Keys clustered into a few dense runs, as in time-series workloads.
pub fn clustered_keys(count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    let clusters = 64;
    let mut keys = Vec::with_capacity(count);
    for _ in 0..clusters {
        let base: u64 = rng.gen_range(0..u64::MAX / 2);
        for _ in 0..count / clusters {
            keys.push(base + rng.gen_range(0..1u64 << 24));
        }
    }
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Ranges of `len` keys starting uniformly at random.
pub fn uniform_queries(count: usize, len: u64) -> Vec<(u64, u64)> {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    (0..count)
        .map(|_| {
            let left = rng.gen_range(0..u64::MAX - len);
            (left, left + len - 1)
        })
        .collect()
}

/// Ranges of `len` keys starting just past a random key.
///
/// Mostly empty, yet as close to the keys as a range can get.
pub fn correlated_queries(keys: &[u64], count: usize, len: u64) -> Vec<(u64, u64)> {
    let mut rng = StdRng::seed_from_u64(SEED + 3);
    (0..count)
        .map(|_| {
            let k = keys[rng.gen_range(0..keys.len())];
            let left = k.saturating_add(1).min(u64::MAX - len);
            (left, left + len - 1)
        })
        .collect()
}

/// Fraction of `queries` that hold no key yet are answered positive.
pub fn measured_fpr(keys: &[u64], queries: &[(u64, u64)], answer: impl Fn(u64, u64) -> bool) -> f64 {
    let mut empty = 0u64;
    let mut false_positives = 0u64;
    for &(left, right) in queries {
        let i = keys.partition_point(|&k| k < left);
        if keys.get(i).map_or(false, |&k| k <= right) {
            continue;
        }
        empty += 1;
        false_positives += u64::from(answer(left, right));
    }
    if empty == 0 {
        0.0
    } else {
        false_positives as f64 / empty as f64
    }
}
