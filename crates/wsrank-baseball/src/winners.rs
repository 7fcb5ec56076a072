// World Series winner extraction and summary.

use std::collections::BTreeMap;
use tracing::{info, warn};
use wsrank_core::{mean, median};

use crate::standardize::{Measure, StandardizedRow, StandardizedTable};
use crate::stat::Stat;

/// Select, for each season, the row flagged as the World Series winner.
///
/// A season with no flagged team contributes nothing. If a season flags
/// more than one team, the first by team id is kept.
pub fn extract_ws_winners(table: &StandardizedTable) -> StandardizedTable {
    let mut by_year: BTreeMap<i32, Vec<&StandardizedRow>> = BTreeMap::new();
    for row in &table.rows {
        by_year.entry(row.key.year).or_default().push(row);
    }

    let mut rows = Vec::new();
    for (year, members) in by_year {
        let flagged: Vec<&StandardizedRow> = members
            .into_iter()
            .filter(|r| r.ws_win == Some(1))
            .collect();
        match flagged.as_slice() {
            [] => {}
            [winner] => rows.push((*winner).clone()),
            [winner, ..] => {
                warn!(
                    "{} teams flagged as World Series winner in {}, keeping {}",
                    flagged.len(),
                    year,
                    winner.key.team_id
                );
                rows.push((*winner).clone());
            }
        }
    }

    info!("extracted {} World Series winners ({})", rows.len(), table.measure);
    StandardizedTable {
        measure: table.measure,
        stats: table.stats.clone(),
        rows,
    }
}

/// How winners sit, on average, for one statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct WinnerStatSummary {
    pub measure: Measure,
    pub stat: Stat,
    /// Seasons with a defined winner value for this statistic.
    pub seasons: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Mean and median of the winners' standardized values, per statistic.
pub fn summarize_winners(winners: &StandardizedTable) -> Vec<WinnerStatSummary> {
    winners
        .stats
        .iter()
        .map(|&stat| {
            let values: Vec<Option<f64>> = winners.rows.iter().map(|r| r.get(stat)).collect();
            WinnerStatSummary {
                measure: winners.measure,
                stat,
                seasons: values.iter().flatten().count(),
                mean: mean(values.iter().copied()),
                median: median(values),
            }
        })
        .collect()
}
