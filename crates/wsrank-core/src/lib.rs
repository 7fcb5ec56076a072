// Shared statistics primitives for the season standardization pipeline.
//
// Missing data is modeled as `Option<f64>` everywhere; the helpers here
// define how missing values are excluded from every aggregate.

pub mod keys;
pub mod percentile;
pub mod stats;

pub use keys::{PlayerSeasonKey, TeamSeasonKey};
pub use percentile::{percentile_of_score, percentile_ranks, PercentileKind};
pub use stats::{compute_pool_stats, compute_zscore, mean, median, ratio, PoolStats};
