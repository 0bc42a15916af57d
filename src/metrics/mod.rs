//! Observability for range filters.
//!
//! Filters are immutable, so the interesting runtime quantity is how often
//! they answer "maybe" on empty ranges. [`FalsePositiveTracker`] counts that
//! from ground truth supplied by the caller, with lock-free counters and a
//! sliding window for recent behavior.
//!
//! Enabled by the `metrics` feature:
//!
//! ```toml
//! [dependencies]
//! rangecraft = { version = "0.1", features = ["metrics"] }
//! ```

pub mod tracker;

pub use tracker::{FalsePositiveTracker, FpTrackerConfig, FpTrackerSnapshot};
