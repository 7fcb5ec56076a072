// Runs the pipeline over the baseball crate's fixture databank and checks
// the exported files.

use std::fs;
use std::path::PathBuf;

use wsrank_app::export::{self, RunSummary};
use wsrank_baseball::lahman::LahmanTables;
use wsrank_baseball::pipeline::{self, PipelineOptions};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../wsrank-baseball/tests/fixtures")
}

#[test]
fn export_writes_every_file() {
    let tables = LahmanTables::load(&fixtures_dir()).unwrap();
    let options = PipelineOptions::default();
    let output = pipeline::run(&tables, &options);
    let summary = RunSummary::new(&tables, &output, &options);

    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("output");
    let report = export::export_all(&out_dir, &output, &summary).unwrap();
    assert_eq!(report.files.len(), 6);

    let zscores = fs::read_to_string(out_dir.join(export::ZSCORES_FILE)).unwrap();
    let mut lines = zscores.lines();
    assert_eq!(
        lines.next().unwrap(),
        "yearID,teamID,WSWin,R,H,teamBA,SLG,OBP,OPS,SB,RA,ERA,HA,SO,BBA,age,salary"
    );
    assert_eq!(lines.count(), 8);

    let winners = fs::read_to_string(out_dir.join(export::WINNER_PERCENTILES_FILE)).unwrap();
    let rows: Vec<&str> = winners.lines().skip(1).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("2015,KCA,1,50,"));
    assert!(rows[1].starts_with("2016,CHN,1,"));

    let summary_csv = fs::read_to_string(out_dir.join(export::WINNER_SUMMARY_FILE)).unwrap();
    // header + 14 stats for each of the two measures
    assert_eq!(summary_csv.lines().count(), 1 + 28);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join(export::RUN_SUMMARY_FILE)).unwrap())
            .unwrap();
    assert_eq!(json["percentile_kind"], "mean");
    assert_eq!(json["inputs"]["teams"], 8);
    assert_eq!(json["seasons_analyzed"], serde_json::json!([1994, 2015, 2016]));
    assert_eq!(json["seasons_reconciled"], serde_json::json!([2016]));
    assert_eq!(json["teams_backfilled"], 2);
    assert_eq!(json["winners"], 2);
    assert!(chrono::DateTime::parse_from_rfc3339(json["generated_at"].as_str().unwrap()).is_ok());
}

#[test]
fn export_overwrites_previous_run() {
    let tables = LahmanTables::load(&fixtures_dir()).unwrap();
    let options = PipelineOptions::default();
    let output = pipeline::run(&tables, &options);
    let summary = RunSummary::new(&tables, &output, &options);

    let tmp = tempfile::tempdir().unwrap();
    export::export_all(tmp.path(), &output, &summary).unwrap();
    let first = fs::read_to_string(tmp.path().join(export::PERCENTILES_FILE)).unwrap();
    export::export_all(tmp.path(), &output, &summary).unwrap();
    let second = fs::read_to_string(tmp.path().join(export::PERCENTILES_FILE)).unwrap();
    assert_eq!(first, second);
}
