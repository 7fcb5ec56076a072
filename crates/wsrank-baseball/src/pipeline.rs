// End-to-end analysis run over loaded databank tables.

use std::collections::BTreeMap;
use tracing::info;
use wsrank_core::{PercentileKind, TeamSeasonKey};

use crate::demographics::{attach_ages, compute_team_ages};
use crate::lahman::LahmanTables;
use crate::metrics::{build_team_seasons, TeamSeason};
use crate::salary::{attach_salaries, median_salaries, ReconcilePolicy, SalaryReport};
use crate::standardize::{standardize, Standardized, StandardizedTable};
use crate::stat::STATS_OF_INTEREST;
use crate::winners::{extract_ws_winners, summarize_winners, WinnerStatSummary};

/// Tunable parts of a run. The statistic list and grouping keys are fixed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub percentile_kind: PercentileKind,
    pub reconcile: ReconcilePolicy,
    /// Inclusive season bounds applied before standardization.
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl PipelineOptions {
    fn includes(&self, year: i32) -> bool {
        self.min_year.map_or(true, |min| year >= min) && self.max_year.map_or(true, |max| year <= max)
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    /// Fully joined team-seasons that were standardized.
    pub teams: Vec<TeamSeason>,
    pub standardized: Standardized,
    pub winner_percentiles: StandardizedTable,
    pub winner_zscores: StandardizedTable,
    pub percentile_summary: Vec<WinnerStatSummary>,
    pub zscore_summary: Vec<WinnerStatSummary>,
    pub salary_report: SalaryReport,
}

/// Run every stage: metrics, ages, salaries, standardization, winners.
pub fn run(tables: &LahmanTables, options: &PipelineOptions) -> AnalysisOutput {
    let teams: Vec<TeamSeason> = build_team_seasons(&tables.teams)
        .into_iter()
        .filter(|t| options.includes(t.year()))
        .collect();

    let ages = compute_team_ages(&tables.stint_tables(), &tables.people);
    let teams = attach_ages(teams, &ages);

    let medians: BTreeMap<TeamSeasonKey, f64> = median_salaries(&tables.salaries)
        .into_iter()
        .filter(|(key, _)| options.includes(key.year))
        .collect();
    let (teams, salary_report) = attach_salaries(teams, &medians, &options.reconcile);

    let standardized = standardize(&teams, &STATS_OF_INTEREST, options.percentile_kind);
    let winner_percentiles = extract_ws_winners(&standardized.percentiles);
    let winner_zscores = extract_ws_winners(&standardized.zscores);
    let percentile_summary = summarize_winners(&winner_percentiles);
    let zscore_summary = summarize_winners(&winner_zscores);

    info!(
        "analysis complete: {} team-seasons, {} winners",
        teams.len(),
        winner_zscores.rows.len()
    );

    AnalysisOutput {
        teams,
        standardized,
        winner_percentiles,
        winner_zscores,
        percentile_summary,
        zscore_summary,
        salary_report,
    }
}
