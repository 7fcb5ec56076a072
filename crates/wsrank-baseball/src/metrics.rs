// Compound team metrics derived from raw counting stats.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use wsrank_core::{ratio, TeamSeasonKey};

use crate::lahman::{TeamCounts, TeamRecord};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Metrics computed from a team's counting stats. Any metric whose inputs
/// are missing, or whose denominator is zero, is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedMetrics {
    pub singles: Option<f64>,
    pub total_bases: Option<f64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
    pub ops: Option<f64>,
    pub batting_average: Option<f64>,
    pub whip: Option<f64>,
}

/// One team in one season, with everything the standardizer reads.
///
/// Built by [`build_team_seasons`]; `mean_age` and `median_salary` start
/// empty and are filled by the demographic and salary stages.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSeason {
    pub key: TeamSeasonKey,
    pub league: String,
    pub franchise_id: String,
    pub name: String,
    pub team_id_br: Option<String>,
    /// 1 for the World Series winner, 0 otherwise, `None` when the source
    /// recorded nothing (seasons without a Series).
    pub ws_win: Option<u8>,
    pub counts: TeamCounts,
    pub metrics: DerivedMetrics,
    pub mean_age: Option<f64>,
    pub median_salary: Option<f64>,
}

impl TeamSeason {
    pub fn year(&self) -> i32 {
        self.key.year
    }

    pub fn team_id(&self) -> &str {
        &self.key.team_id
    }

    /// The alternate identifier, when it differs from the primary one.
    pub fn alternate_id(&self) -> Option<&str> {
        self.team_id_br
            .as_deref()
            .filter(|alt| *alt != self.key.team_id)
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Sum of several optional quantities; missing if any part is missing.
fn sum_all(parts: &[Option<f64>]) -> Option<f64> {
    parts.iter().try_fold(0.0, |acc, p| p.map(|v| acc + v))
}

/// Compute OBP, SLG, OPS, batting average and WHIP from raw counts.
///
/// - singles = H - (2B + 3B + HR)
/// - TB = 1*S + 2*2B + 3*3B + 4*HR
/// - OBP = (H + BB + HBP) / (AB + SF + BB + HBP)
/// - SLG = TB / AB
/// - OPS = OBP + SLG
/// - BA = H / AB
/// - WHIP = (BBA + HA) / (IPouts / 3)
pub fn derive_metrics(c: &TeamCounts) -> DerivedMetrics {
    let extra_base_hits = sum_all(&[c.doubles, c.triples, c.home_runs]);
    let singles = match (c.hits, extra_base_hits) {
        (Some(h), Some(xbh)) => Some(h - xbh),
        _ => None,
    };
    let total_bases = sum_all(&[
        singles,
        c.doubles.map(|v| 2.0 * v),
        c.triples.map(|v| 3.0 * v),
        c.home_runs.map(|v| 4.0 * v),
    ]);

    let obp = ratio(
        sum_all(&[c.hits, c.walks, c.hit_by_pitch]),
        sum_all(&[c.at_bats, c.sac_flies, c.walks, c.hit_by_pitch]),
    );
    let slg = ratio(total_bases, c.at_bats);
    let ops = sum_all(&[obp, slg]);
    let batting_average = ratio(c.hits, c.at_bats);
    let innings = c.ipouts.map(|outs| outs / 3.0);
    let whip = ratio(sum_all(&[c.walks_allowed, c.hits_allowed]), innings);

    DerivedMetrics {
        singles,
        total_bases,
        obp,
        slg,
        ops,
        batting_average,
        whip,
    }
}

/// Map the two-valued `WSWin` encoding onto a numeric flag.
pub fn normalize_ws_win(raw: Option<&str>) -> Option<u8> {
    match raw.map(str::trim) {
        Some("Y") | Some("y") => Some(1),
        Some("N") | Some("n") => Some(0),
        Some(other) => {
            debug!("unrecognized WSWin value '{}'", other);
            None
        }
        None => None,
    }
}

/// Turn Teams rows into team-seasons with derived metrics.
///
/// The result holds one row per (year, team), sorted by key. A repeated key
/// keeps its first row.
pub fn build_team_seasons(records: &[TeamRecord]) -> Vec<TeamSeason> {
    let mut by_key: BTreeMap<TeamSeasonKey, TeamSeason> = BTreeMap::new();

    for record in records {
        let key = TeamSeasonKey::new(record.year, record.team_id.clone());
        if by_key.contains_key(&key) {
            warn!("duplicate team-season {}, keeping the first row", key);
            continue;
        }
        let season = TeamSeason {
            key: key.clone(),
            league: record.league.clone(),
            franchise_id: record.franchise_id.clone(),
            name: record.name.clone(),
            team_id_br: record.team_id_br.clone(),
            ws_win: normalize_ws_win(record.ws_win.as_deref()),
            counts: record.counts.clone(),
            metrics: derive_metrics(&record.counts),
            mean_age: None,
            median_salary: None,
        };
        by_key.insert(key, season);
    }

    let undefined_obp = by_key.values().filter(|t| t.metrics.obp.is_none()).count();
    info!(
        "derived metrics for {} team-seasons ({} without a defined OBP)",
        by_key.len(),
        undefined_obp
    );
    by_key.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
