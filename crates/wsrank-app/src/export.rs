// Writes the analysis tables to CSV and a JSON run summary.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use wsrank_baseball::lahman::LahmanTables;
use wsrank_baseball::pipeline::{AnalysisOutput, PipelineOptions};
use wsrank_baseball::standardize::StandardizedTable;
use wsrank_baseball::winners::WinnerStatSummary;
use wsrank_core::PercentileKind;

pub const PERCENTILES_FILE: &str = "percentiles.csv";
pub const ZSCORES_FILE: &str = "zscores.csv";
pub const WINNER_PERCENTILES_FILE: &str = "ws_winner_percentiles.csv";
pub const WINNER_ZSCORES_FILE: &str = "ws_winner_zscores.csv";
pub const WINNER_SUMMARY_FILE: &str = "winner_summary.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("failed to serialize run summary: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputCounts {
    pub teams: usize,
    pub batting: usize,
    pub pitching: usize,
    pub fielding: usize,
    pub people: usize,
    pub salaries: usize,
}

/// Machine-readable record of one run, written as run_summary.json.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub percentile_kind: PercentileKind,
    pub inputs: InputCounts,
    pub team_seasons: usize,
    pub seasons_analyzed: Vec<i32>,
    pub seasons_reconciled: Vec<i32>,
    pub teams_backfilled: usize,
    pub teams_unresolved: usize,
    pub winners: usize,
}

impl RunSummary {
    pub fn new(tables: &LahmanTables, output: &AnalysisOutput, options: &PipelineOptions) -> Self {
        RunSummary {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            percentile_kind: options.percentile_kind,
            inputs: InputCounts {
                teams: tables.teams.len(),
                batting: tables.batting.rows.len(),
                pitching: tables.pitching.rows.len(),
                fielding: tables.fielding.rows.len(),
                people: tables.people.len(),
                salaries: tables.salaries.len(),
            },
            team_seasons: output.teams.len(),
            seasons_analyzed: output.standardized.zscores.years(),
            seasons_reconciled: output.salary_report.reconciled_seasons.clone(),
            teams_backfilled: output.salary_report.backfilled,
            teams_unresolved: output.salary_report.unresolved,
            winners: output.winner_zscores.rows.len(),
        }
    }
}

/// Files written by [`export_all`].
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_writer(path: &Path) -> Result<csv::Writer<fs::File>, ExportError> {
    csv::Writer::from_path(path).map_err(|e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write one standardized table: key columns, the WS flag, then one column
/// per statistic. Missing values are empty cells.
pub fn write_table<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    table: &StandardizedTable,
) -> Result<usize, csv::Error> {
    let mut header = vec!["yearID".to_string(), "teamID".to_string(), "WSWin".to_string()];
    header.extend(table.stats.iter().map(|s| s.label().to_string()));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.key.year.to_string(),
            row.key.team_id.clone(),
            row.ws_win.map(|w| w.to_string()).unwrap_or_default(),
        ];
        record.extend(table.stats.iter().map(|&s| format_value(row.get(s))));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(table.rows.len())
}

pub fn write_summary<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    summaries: &[&WinnerStatSummary],
) -> Result<usize, csv::Error> {
    writer.write_record(["measure", "stat", "seasons", "mean", "median"])?;
    for s in summaries {
        writer.write_record([
            s.measure.as_str().to_string(),
            s.stat.label().to_string(),
            s.seasons.to_string(),
            format_value(s.mean),
            format_value(s.median),
        ])?;
    }
    writer.flush()?;
    Ok(summaries.len())
}

fn export_table(path: &Path, table: &StandardizedTable) -> Result<usize, ExportError> {
    let mut writer = csv_writer(path)?;
    write_table(&mut writer, table).map_err(|e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write every result table and the run summary into `dir`, creating it if
/// needed. Existing files are overwritten.
pub fn export_all(dir: &Path, output: &AnalysisOutput, summary: &RunSummary) -> Result<ExportReport, ExportError> {
    fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut report = ExportReport::default();
    let tables = [
        (PERCENTILES_FILE, &output.standardized.percentiles),
        (ZSCORES_FILE, &output.standardized.zscores),
        (WINNER_PERCENTILES_FILE, &output.winner_percentiles),
        (WINNER_ZSCORES_FILE, &output.winner_zscores),
    ];
    for (name, table) in tables {
        let path = dir.join(name);
        report.rows += export_table(&path, table)?;
        report.files.push(path);
    }

    let path = dir.join(WINNER_SUMMARY_FILE);
    let summaries: Vec<&WinnerStatSummary> = output
        .percentile_summary
        .iter()
        .chain(&output.zscore_summary)
        .collect();
    let mut writer = csv_writer(&path)?;
    report.rows += write_summary(&mut writer, &summaries).map_err(|e| ExportError::Csv {
        path: path.clone(),
        source: e,
    })?;
    report.files.push(path);

    let path = dir.join(RUN_SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;
    report.files.push(path);

    info!("wrote {} files ({} rows) to {}", report.files.len(), report.rows, dir.display());
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
