//! Empirical false positive rate tracking for range queries.
//!
//! A range filter's false positive rate is measured over *empty* queries:
//! ranges that truly contain no key. The caller supplies that ground truth
//! with each result.
//!
//! ```text
//! FPR = false positives / empty queries
//! ```
//!
//! A measurement with no empty queries reports 0.0.
//!
//! # Examples
//!
//! ```
//! use rangecraft::metrics::FalsePositiveTracker;
//!
//! let tracker = FalsePositiveTracker::new(0.01);
//!
//! // 10 empty ranges, one answered "maybe"
//! tracker.record(true, false);
//! for _ in 0..9 {
//!     tracker.record(false, false);
//! }
//! // a non-empty range, answered "maybe"
//! tracker.record(true, true);
//!
//! assert_eq!(tracker.empty_queries(), 10);
//! assert!((tracker.observed_fp_rate() - 0.10).abs() < 1e-12);
//! ```

#![allow(clippy::cast_precision_loss)]

use crate::core::RangeFilter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Configuration for [`FalsePositiveTracker`].
#[derive(Debug, Clone)]
pub struct FpTrackerConfig {
    /// Number of recent empty queries kept for the windowed rate
    pub window_size: usize,
    /// False positive rate the filter was sized for
    pub expected_fp_rate: f64,
    /// Alert when the windowed rate exceeds `expected × alert_threshold`
    pub alert_threshold: f64,
}

impl Default for FpTrackerConfig {
    fn default() -> Self {
        Self {
            window_size: 1000,
            expected_fp_rate: 0.01,
            alert_threshold: 1.5,
        }
    }
}

/// Ring buffer of outcomes of recent empty queries.
struct SlidingWindow {
    samples: Vec<bool>,
    pos: usize,
    size: usize,
}

impl SlidingWindow {
    fn new(size: usize) -> Self {
        Self {
            samples: Vec::with_capacity(size),
            pos: 0,
            size,
        }
    }

    fn push(&mut self, false_positive: bool) {
        if self.size == 0 {
            return;
        }
        if self.samples.len() < self.size {
            self.samples.push(false_positive);
        } else {
            self.samples[self.pos] = false_positive;
            self.pos = (self.pos + 1) % self.size;
        }
    }

    fn rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let fp = self.samples.iter().filter(|&&x| x).count();
        fp as f64 / self.samples.len() as f64
    }
}

/// Thread-safe counter of range query outcomes against ground truth.
///
/// Counters are lock-free; only the sliding window takes a lock.
pub struct FalsePositiveTracker {
    queries: AtomicU64,
    positives: AtomicU64,
    empty_queries: AtomicU64,
    false_positives: AtomicU64,
    false_negatives: AtomicU64,
    config: FpTrackerConfig,
    window: Mutex<SlidingWindow>,
}

impl FalsePositiveTracker {
    /// Tracker for a filter sized for `expected_fp_rate`.
    #[must_use]
    pub fn new(expected_fp_rate: f64) -> Self {
        Self::with_config(FpTrackerConfig {
            expected_fp_rate,
            ..FpTrackerConfig::default()
        })
    }

    /// Tracker with a custom configuration.
    #[must_use]
    pub fn with_config(config: FpTrackerConfig) -> Self {
        Self {
            queries: AtomicU64::new(0),
            positives: AtomicU64::new(0),
            empty_queries: AtomicU64::new(0),
            false_positives: AtomicU64::new(0),
            false_negatives: AtomicU64::new(0),
            window: Mutex::new(SlidingWindow::new(config.window_size)),
            config,
        }
    }

    /// Record one answer. `actually_nonempty` is the ground truth for the
    /// queried range.
    pub fn record(&self, filter_result: bool, actually_nonempty: bool) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if filter_result {
            self.positives.fetch_add(1, Ordering::Relaxed);
        }
        if actually_nonempty {
            if !filter_result {
                self.false_negatives.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("range filter answered negative on a non-empty range");
            }
            return;
        }

        self.empty_queries.fetch_add(1, Ordering::Relaxed);
        if filter_result {
            self.false_positives.fetch_add(1, Ordering::Relaxed);
        }
        if let Ok(mut window) = self.window.lock() {
            window.push(filter_result);
        }
    }

    /// Query `filter` on `[left, right]` and record the answer.
    ///
    /// Returns the filter's answer.
    pub fn query_and_record<F: RangeFilter + ?Sized>(
        &self,
        filter: &F,
        left: u64,
        right: u64,
        actually_nonempty: bool,
    ) -> bool {
        let result = filter.query_range(left, right);
        self.record(result, actually_nonempty);
        result
    }

    /// False positives over all empty queries, or 0.0 with none recorded.
    #[must_use]
    pub fn observed_fp_rate(&self) -> f64 {
        let empty = self.empty_queries.load(Ordering::Relaxed);
        if empty == 0 {
            return 0.0;
        }
        self.false_positives.load(Ordering::Relaxed) as f64 / empty as f64
    }

    /// Rate over the most recent empty queries.
    #[must_use]
    pub fn window_fp_rate(&self) -> f64 {
        self.window.lock().map(|w| w.rate()).unwrap_or(0.0)
    }

    /// True if the windowed rate exceeds the configured alert threshold.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        self.window_fp_rate() > self.config.expected_fp_rate * self.config.alert_threshold
    }

    /// Total answers recorded.
    #[must_use]
    pub fn total_queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Answers that were positive.
    #[must_use]
    pub fn positives(&self) -> u64 {
        self.positives.load(Ordering::Relaxed)
    }

    /// Queries whose range held no key.
    #[must_use]
    pub fn empty_queries(&self) -> u64 {
        self.empty_queries.load(Ordering::Relaxed)
    }

    /// Positive answers on empty ranges.
    #[must_use]
    pub fn false_positives(&self) -> u64 {
        self.false_positives.load(Ordering::Relaxed)
    }

    /// Negative answers on non-empty ranges. Always 0 for a correct filter.
    #[must_use]
    pub fn false_negatives(&self) -> u64 {
        self.false_negatives.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all statistics.
    #[must_use]
    pub fn snapshot(&self) -> FpTrackerSnapshot {
        FpTrackerSnapshot {
            total_queries: self.total_queries(),
            positives: self.positives(),
            empty_queries: self.empty_queries(),
            false_positives: self.false_positives(),
            false_negatives: self.false_negatives(),
            observed_fp_rate: self.observed_fp_rate(),
            window_fp_rate: self.window_fp_rate(),
            expected_fp_rate: self.config.expected_fp_rate,
            is_alert: self.is_alert(),
        }
    }

    /// Clear all counters and the window.
    pub fn reset(&self) {
        for counter in [
            &self.queries,
            &self.positives,
            &self.empty_queries,
            &self.false_positives,
            &self.false_negatives,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        if let Ok(mut window) = self.window.lock() {
            *window = SlidingWindow::new(self.config.window_size);
        }
    }
}

/// Snapshot of [`FalsePositiveTracker`] statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FpTrackerSnapshot {
    /// Total answers recorded
    pub total_queries: u64,
    /// Positive answers
    pub positives: u64,
    /// Queries over empty ranges
    pub empty_queries: u64,
    /// Positive answers over empty ranges
    pub false_positives: u64,
    /// Negative answers over non-empty ranges
    pub false_negatives: u64,
    /// All-time false positive rate
    pub observed_fp_rate: f64,
    /// Rate over the sliding window
    pub window_fp_rate: f64,
    /// Configured target rate
    pub expected_fp_rate: f64,
    /// Whether the window exceeds the alert threshold
    pub is_alert: bool,
}

impl FpTrackerSnapshot {
    /// Deviation of the observed rate from the target, in percent.
    #[must_use]
    pub fn deviation_percent(&self) -> f64 {
        if self.expected_fp_rate == 0.0 {
            return 0.0;
        }
        (self.observed_fp_rate - self.expected_fp_rate) / self.expected_fp_rate * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::GrafiteFilter;
    use crate::hash::seeded_rng;
    use rand::Rng;
    use std::sync::Arc;

    #[test]
    fn test_empty_measurement_reports_zero() {
        let tracker = FalsePositiveTracker::new(0.01);
        assert_eq!(tracker.observed_fp_rate(), 0.0);
        tracker.record(true, true);
        assert_eq!(tracker.observed_fp_rate(), 0.0);
        assert_eq!(tracker.total_queries(), 1);
    }

    #[test]
    fn test_counts() {
        let tracker = FalsePositiveTracker::new(0.01);
        tracker.record(true, false);
        tracker.record(false, false);
        tracker.record(false, false);
        tracker.record(false, false);
        tracker.record(false, true);

        let snap = tracker.snapshot();
        assert_eq!(snap.total_queries, 5);
        assert_eq!(snap.positives, 1);
        assert_eq!(snap.empty_queries, 4);
        assert_eq!(snap.false_positives, 1);
        assert_eq!(snap.false_negatives, 1);
        assert!((snap.observed_fp_rate - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_window_and_alert() {
        let tracker = FalsePositiveTracker::with_config(FpTrackerConfig {
            window_size: 4,
            expected_fp_rate: 0.1,
            alert_threshold: 2.0,
        });
        for _ in 0..4 {
            tracker.record(true, false);
        }
        assert!(tracker.is_alert());
        for _ in 0..4 {
            tracker.record(false, false);
        }
        assert_eq!(tracker.window_fp_rate(), 0.0);
        assert!(!tracker.is_alert());
        assert!((tracker.observed_fp_rate() - 0.5).abs() < 1e-12);

        tracker.reset();
        assert_eq!(tracker.snapshot().total_queries, 0);
    }

    #[test]
    fn test_grafite_stays_near_bound() {
        let mut rng = seeded_rng(21);
        let mut keys: Vec<u64> = (0..5_000).map(|_| rng.gen_range(0..1u64 << 40)).collect();
        keys.sort_unstable();
        keys.dedup();
        let filter: GrafiteFilter = crate::builder::GrafiteFilterBuilder::new()
            .false_positive_rate(0.02)
            .max_range_len(16)
            .seed(22)
            .build(&keys)
            .unwrap();

        let tracker = Arc::new(FalsePositiveTracker::new(0.02));
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let tracker = Arc::clone(&tracker);
                let filter = filter.clone();
                let keys = keys.clone();
                std::thread::spawn(move || {
                    let mut rng = seeded_rng(100 + t);
                    for _ in 0..5_000 {
                        let left = rng.gen_range(0..1u64 << 40);
                        let right = left + 15;
                        let start = keys.partition_point(|&k| k < left);
                        let truth = keys.get(start).map_or(false, |&k| k <= right);
                        tracker.query_and_record(&filter, left, right, truth);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(tracker.total_queries(), 20_000);
        assert_eq!(tracker.false_negatives(), 0);
        // bound is 0.02; allow sampling noise
        assert!(tracker.observed_fp_rate() < 0.04, "{}", tracker.observed_fp_rate());
    }
}
