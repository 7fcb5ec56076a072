// Percentile-of-score with selectable tie handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How tied values are placed when computing a percentile rank.
///
/// With `left = count(P < v)` and `right = count(P <= v)` over a population
/// of size `n`:
///
/// | kind     | percentile                                 |
/// |----------|--------------------------------------------|
/// | `Mean`   | `50 * (left + right) / n`                  |
/// | `Strict` | `100 * left / n`                           |
/// | `Weak`   | `100 * right / n`                          |
/// | `Rank`   | `50 * (left + right + [right > left]) / n` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileKind {
    #[default]
    Mean,
    Strict,
    Weak,
    Rank,
}

impl PercentileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PercentileKind::Mean => "mean",
            PercentileKind::Strict => "strict",
            PercentileKind::Weak => "weak",
            PercentileKind::Rank => "rank",
        }
    }
}

impl fmt::Display for PercentileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentile position (0-100) of `value` within `population`.
///
/// Returns `None` for an empty population or a non-finite value. The
/// population is expected to hold only defined values.
pub fn percentile_of_score(population: &[f64], value: f64, kind: PercentileKind) -> Option<f64> {
    if population.is_empty() || !value.is_finite() {
        return None;
    }
    let n = population.len() as f64;
    let left = population.iter().filter(|&&p| p < value).count() as f64;
    let right = population.iter().filter(|&&p| p <= value).count() as f64;

    let pct = match kind {
        PercentileKind::Mean => (left + right) * (50.0 / n),
        PercentileKind::Strict => left / n * 100.0,
        PercentileKind::Weak => right / n * 100.0,
        PercentileKind::Rank => {
            let plus_one = if right > left { 1.0 } else { 0.0 };
            (left + right + plus_one) * (50.0 / n)
        }
    };
    Some(pct)
}

/// Percentile rank of every entry against the defined entries of the same
/// slice. Missing entries are left out of the population and stay missing.
pub fn percentile_ranks(values: &[Option<f64>], kind: PercentileKind) -> Vec<Option<f64>> {
    let population: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    values
        .iter()
        .map(|v| v.and_then(|v| percentile_of_score(&population, v, kind)))
        .collect()
}
