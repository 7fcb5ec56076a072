// Aggregates over optional values: ratios, mean, median, and population
// z-scores.

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Divide two optional quantities.
///
/// Returns `None` when either side is missing, when the denominator is zero,
/// or when the quotient is not finite. This is the only place a derived
/// metric can become undefined.
pub fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    let (num, den) = (num?, den?);
    if den == 0.0 {
        return None;
    }
    let value = num / den;
    value.is_finite().then_some(value)
}

/// Keep only the defined, finite values.
fn defined<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect()
}

// ---------------------------------------------------------------------------
// Central tendency
// ---------------------------------------------------------------------------

/// Arithmetic mean of the defined values; `None` if there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let vals = defined(values);
    if vals.is_empty() {
        return None;
    }
    Some(vals.iter().sum::<f64>() / vals.len() as f64)
}

/// Median of the defined values; an even count averages the two middle
/// values. `None` if there are no defined values.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut vals = defined(values);
    if vals.is_empty() {
        return None;
    }
    vals.sort_by(f64::total_cmp);
    let mid = vals.len() / 2;
    if vals.len() % 2 == 0 {
        Some((vals[mid - 1] + vals[mid]) / 2.0)
    } else {
        Some(vals[mid])
    }
}

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation for one statistic across a season's teams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
    /// Number of defined values the moments were computed from.
    pub count: usize,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and population standard deviation (N denominator) over the
/// defined values.
///
/// Returns `None` when no value is defined.
pub fn compute_pool_stats<I>(values: I) -> Option<PoolStats>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let vals = defined(values);
    if vals.is_empty() {
        return None;
    }
    let n = vals.len() as f64;
    let mean = vals.iter().sum::<f64>() / n;
    let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(PoolStats {
        mean,
        stdev: variance.sqrt(),
        count: vals.len(),
    })
}

/// Compute a z-score given a value and pool stats.
///
/// A missing value stays missing. A (near) zero standard deviation makes the
/// score undefined as well.
pub fn compute_zscore(value: Option<f64>, stats: &PoolStats) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    if stats.stdev < STDEV_EPSILON {
        return None;
    }
    Some((value - stats.mean) / stats.stdev)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
