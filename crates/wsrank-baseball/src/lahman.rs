// Lahman baseball databank loading.
//
// Reads the six tables the analysis needs from a databank `core/` directory.
// Teams, Master/People and Salaries deserialize into typed rows; the three
// player-stint tables (Batting, Pitching, Fielding) are read by header so
// that every numeric column is carried without naming each one.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wsrank_core::PlayerSeasonKey;

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

pub const TEAMS_FILE: &str = "Teams.csv";
pub const BATTING_FILE: &str = "Batting.csv";
pub const PITCHING_FILE: &str = "Pitching.csv";
pub const FIELDING_FILE: &str = "Fielding.csv";
pub const MASTER_FILE: &str = "Master.csv";
/// Later databank releases renamed Master.csv.
pub const PEOPLE_FILE: &str = "People.csv";
pub const SALARIES_FILE: &str = "Salaries.csv";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Raw team counting stats for one season. Cells left empty in the source
/// (HBP and SF before 2000, for example) are `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamCounts {
    pub games: Option<f64>,
    pub wins: Option<f64>,
    pub losses: Option<f64>,
    pub runs: Option<f64>,
    pub at_bats: Option<f64>,
    pub hits: Option<f64>,
    pub doubles: Option<f64>,
    pub triples: Option<f64>,
    pub home_runs: Option<f64>,
    pub walks: Option<f64>,
    pub strikeouts: Option<f64>,
    pub stolen_bases: Option<f64>,
    pub caught_stealing: Option<f64>,
    pub hit_by_pitch: Option<f64>,
    pub sac_flies: Option<f64>,
    pub runs_allowed: Option<f64>,
    pub earned_runs: Option<f64>,
    pub era: Option<f64>,
    pub ipouts: Option<f64>,
    pub hits_allowed: Option<f64>,
    pub home_runs_allowed: Option<f64>,
    pub walks_allowed: Option<f64>,
    pub strikeouts_allowed: Option<f64>,
}

/// One row of Teams.csv.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub year: i32,
    pub league: String,
    pub team_id: String,
    pub franchise_id: String,
    pub name: String,
    /// Baseball-Reference identifier. Other tables sometimes key teams by
    /// this scheme instead of `team_id`.
    pub team_id_br: Option<String>,
    /// The raw `WSWin` cell ("Y", "N" or empty).
    pub ws_win: Option<String>,
    pub counts: TeamCounts,
}

/// Which player table a stint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Batting,
    Pitching,
    Fielding,
}

impl Role {
    pub fn file_name(self) -> &'static str {
        match self {
            Role::Batting => BATTING_FILE,
            Role::Pitching => PITCHING_FILE,
            Role::Fielding => FIELDING_FILE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Batting => "batting",
            Role::Pitching => "pitching",
            Role::Fielding => "fielding",
        };
        f.write_str(label)
    }
}

/// One player stint row, keyed by (year, team, player). `values` lines up
/// with `StintTable::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct StintRow {
    pub key: PlayerSeasonKey,
    pub values: Vec<Option<f64>>,
}

/// A Batting, Pitching or Fielding table.
#[derive(Debug, Clone, PartialEq)]
pub struct StintTable {
    pub role: Role,
    /// Names of the numeric columns, in source order.
    pub columns: Vec<String>,
    pub rows: Vec<StintRow>,
}

/// One row of Master.csv / People.csv, reduced to what the age join needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub player_id: String,
    pub birth_year: Option<i32>,
}

/// One row of Salaries.csv.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub year: i32,
    pub team_id: String,
    pub player_id: String,
    pub salary: Option<f64>,
}

/// Every table the analysis reads, loaded and typed.
#[derive(Debug, Clone)]
pub struct LahmanTables {
    pub teams: Vec<TeamRecord>,
    pub batting: StintTable,
    pub pitching: StintTable,
    pub fielding: StintTable,
    pub people: Vec<PersonRecord>,
    pub salaries: Vec<SalaryRecord>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no `{column}` column")]
    MissingColumn { path: String, column: String },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Teams.csv row. Headers that are not valid identifiers are renamed;
/// unlisted columns (park, attendance, park factors) are ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawTeam {
    yearID: i32,
    #[serde(default)]
    lgID: String,
    teamID: String,
    #[serde(default)]
    franchID: String,
    #[serde(default)]
    name: String,
    G: Option<f64>,
    W: Option<f64>,
    L: Option<f64>,
    WSWin: Option<String>,
    R: Option<f64>,
    AB: Option<f64>,
    H: Option<f64>,
    #[serde(rename = "2B")]
    doubles: Option<f64>,
    #[serde(rename = "3B")]
    triples: Option<f64>,
    HR: Option<f64>,
    BB: Option<f64>,
    SO: Option<f64>,
    SB: Option<f64>,
    CS: Option<f64>,
    HBP: Option<f64>,
    SF: Option<f64>,
    RA: Option<f64>,
    ER: Option<f64>,
    ERA: Option<f64>,
    IPouts: Option<f64>,
    HA: Option<f64>,
    HRA: Option<f64>,
    BBA: Option<f64>,
    SOA: Option<f64>,
    teamIDBR: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPerson {
    playerID: String,
    birthYear: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawSalary {
    yearID: i32,
    teamID: String,
    playerID: String,
    salary: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trim a string cell, mapping blank to `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Stint columns that are keys or labels rather than measurements.
const NON_NUMERIC_STINT_COLUMNS: &[&str] = &["playerID", "yearID", "teamID", "stint", "lgID", "POS"];

fn parse_optional_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column_index(headers: &csv::StringRecord, column: &str, origin: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| LoadError::MissingColumn {
            path: origin.to_string(),
            column: column.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_teams_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut teams = Vec::new();
    for result in reader.deserialize::<RawTeam>() {
        match result {
            Ok(raw) => {
                let team_id = raw.teamID.trim().to_string();
                if team_id.is_empty() {
                    warn!("skipping team row for {} with empty teamID", raw.yearID);
                    continue;
                }
                teams.push(TeamRecord {
                    year: raw.yearID,
                    league: raw.lgID.trim().to_string(),
                    team_id,
                    franchise_id: raw.franchID.trim().to_string(),
                    name: raw.name.trim().to_string(),
                    team_id_br: non_blank(raw.teamIDBR),
                    ws_win: non_blank(raw.WSWin),
                    counts: TeamCounts {
                        games: raw.G,
                        wins: raw.W,
                        losses: raw.L,
                        runs: raw.R,
                        at_bats: raw.AB,
                        hits: raw.H,
                        doubles: raw.doubles,
                        triples: raw.triples,
                        home_runs: raw.HR,
                        walks: raw.BB,
                        strikeouts: raw.SO,
                        stolen_bases: raw.SB,
                        caught_stealing: raw.CS,
                        hit_by_pitch: raw.HBP,
                        sac_flies: raw.SF,
                        runs_allowed: raw.RA,
                        earned_runs: raw.ER,
                        era: raw.ERA,
                        ipouts: raw.IPouts,
                        hits_allowed: raw.HA,
                        home_runs_allowed: raw.HRA,
                        walks_allowed: raw.BBA,
                        strikeouts_allowed: raw.SOA,
                    },
                });
            }
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(teams)
}

fn load_stints_from_reader<R: Read>(rdr: R, role: Role, origin: &str) -> Result<StintTable, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: origin.to_string(),
        source,
    };
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let player_idx = column_index(&headers, "playerID", origin)?;
    let year_idx = column_index(&headers, "yearID", origin)?;
    let team_idx = column_index(&headers, "teamID", origin)?;

    let numeric: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !NON_NUMERIC_STINT_COLUMNS.contains(&h.trim()))
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed {} row: {}", role, e);
                continue;
            }
        };
        let player_id = record.get(player_idx).unwrap_or("").trim();
        let team_id = record.get(team_idx).unwrap_or("").trim();
        let year = record.get(year_idx).and_then(|y| y.trim().parse::<i32>().ok());
        let Some(year) = year else {
            warn!("skipping {} row for '{}': unparseable yearID", role, player_id);
            continue;
        };
        if player_id.is_empty() || team_id.is_empty() {
            warn!("skipping {} row in {}: missing playerID or teamID", role, year);
            continue;
        }
        let values = numeric
            .iter()
            .map(|(i, _)| record.get(*i).and_then(parse_optional_number))
            .collect();
        rows.push(StintRow {
            key: PlayerSeasonKey::new(year, team_id, player_id),
            values,
        });
    }

    Ok(StintTable {
        role,
        columns: numeric.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

fn load_people_from_reader<R: Read>(rdr: R) -> Result<Vec<PersonRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut people: Vec<PersonRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for result in reader.deserialize::<RawPerson>() {
        match result {
            Ok(raw) => {
                let player_id = raw.playerID.trim().to_string();
                if player_id.is_empty() {
                    continue;
                }
                if !seen.insert(player_id.clone()) {
                    warn!("duplicate person entry for '{}', keeping the first", player_id);
                    continue;
                }
                people.push(PersonRecord {
                    player_id,
                    birth_year: raw.birthYear,
                });
            }
            Err(e) => {
                warn!("skipping malformed person row: {}", e);
            }
        }
    }
    Ok(people)
}

fn load_salaries_from_reader<R: Read>(rdr: R) -> Result<Vec<SalaryRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut salaries = Vec::new();
    for result in reader.deserialize::<RawSalary>() {
        match result {
            Ok(raw) => {
                salaries.push(SalaryRecord {
                    year: raw.yearID,
                    team_id: raw.teamID.trim().to_string(),
                    player_id: raw.playerID.trim().to_string(),
                    salary: raw.salary.filter(|s| s.is_finite()),
                });
            }
            Err(e) => {
                warn!("skipping malformed salary row: {}", e);
            }
        }
    }
    Ok(salaries)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load Teams.csv.
pub fn load_teams(path: &Path) -> Result<Vec<TeamRecord>, LoadError> {
    load_teams_from_reader(open(path)?).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a Batting, Pitching or Fielding table.
pub fn load_stints(path: &Path, role: Role) -> Result<StintTable, LoadError> {
    load_stints_from_reader(open(path)?, role, &path.display().to_string())
}

/// Load player birth years from Master.csv or People.csv.
pub fn load_people(path: &Path) -> Result<Vec<PersonRecord>, LoadError> {
    load_people_from_reader(open(path)?).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load Salaries.csv.
pub fn load_salaries(path: &Path) -> Result<Vec<SalaryRecord>, LoadError> {
    load_salaries_from_reader(open(path)?).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Master.csv if present, otherwise People.csv.
fn people_path(dir: &Path) -> PathBuf {
    let master = dir.join(MASTER_FILE);
    if master.exists() {
        master
    } else {
        dir.join(PEOPLE_FILE)
    }
}

impl LahmanTables {
    /// Load every table from a databank directory.
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let teams = load_teams(&dir.join(TEAMS_FILE))?;
        if teams.is_empty() {
            return Err(LoadError::Validation(format!(
                "{} produced zero valid rows",
                dir.join(TEAMS_FILE).display()
            )));
        }
        let batting = load_stints(&dir.join(Role::Batting.file_name()), Role::Batting)?;
        let pitching = load_stints(&dir.join(Role::Pitching.file_name()), Role::Pitching)?;
        let fielding = load_stints(&dir.join(Role::Fielding.file_name()), Role::Fielding)?;
        let people = load_people(&people_path(dir))?;
        let salaries = load_salaries(&dir.join(SALARIES_FILE))?;

        debug!(
            "loaded {} teams, {}/{}/{} stints, {} people, {} salaries from {}",
            teams.len(),
            batting.rows.len(),
            pitching.rows.len(),
            fielding.rows.len(),
            people.len(),
            salaries.len(),
            dir.display()
        );

        Ok(LahmanTables {
            teams,
            batting,
            pitching,
            fielding,
            people,
            salaries,
        })
    }

    /// The three player tables, in a fixed order.
    pub fn stint_tables(&self) -> [&StintTable; 3] {
        [&self.batting, &self.pitching, &self.fielding]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEAMS_HEADER: &str = "yearID,lgID,teamID,franchID,divID,Rank,G,Ghome,W,L,DivWin,WCWin,LgWin,WSWin,R,AB,H,2B,3B,HR,BB,SO,SB,CS,HBP,SF,RA,ER,ERA,CG,SHO,SV,IPouts,HA,HRA,BBA,SOA,E,DP,FP,name,park,attendance,BPF,PPF,teamIDBR,teamIDlahman45,teamIDretro";

    // -- Teams --

    #[test]
    fn team_row_parses_renamed_columns() {
        let csv_data = format!(
            "{TEAMS_HEADER}\n\
2016,NL,CHN,CHC,C,1,162,81,103,58,Y,N,Y,Y,808,5503,1409,293,30,199,656,1339,66,34,77,49,556,511,3.15,5,15,38,4383,1125,163,495,1441,101,123,0.985,Chicago Cubs,Wrigley Field,3232420,104,102,CHC,CHN,CHN"
        );
        let teams = load_teams_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(teams.len(), 1);

        let cubs = &teams[0];
        assert_eq!(cubs.year, 2016);
        assert_eq!(cubs.league, "NL");
        assert_eq!(cubs.team_id, "CHN");
        assert_eq!(cubs.team_id_br.as_deref(), Some("CHC"));
        assert_eq!(cubs.ws_win.as_deref(), Some("Y"));
        assert_eq!(cubs.name, "Chicago Cubs");
        assert_eq!(cubs.counts.doubles, Some(293.0));
        assert_eq!(cubs.counts.triples, Some(30.0));
        assert_eq!(cubs.counts.ipouts, Some(4383.0));
        assert_eq!(cubs.counts.walks_allowed, Some(495.0));
        assert_eq!(cubs.counts.era, Some(3.15));
    }

    #[test]
    fn empty_team_cells_are_missing() {
        let csv_data = format!(
            "{TEAMS_HEADER}\n\
1927,AL,NYA,NYY,,1,155,77,110,44,,,Y,Y,975,5347,1644,291,103,158,635,605,90,64,,,599,494,3.20,82,11,20,4167,1403,42,409,431,195,123,0.969,New York Yankees,Yankee Stadium I,1164015,98,94,NYY,NYA,NYA"
        );
        let teams = load_teams_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(teams[0].counts.hit_by_pitch, None);
        assert_eq!(teams[0].counts.sac_flies, None);
        assert_eq!(teams[0].counts.hits, Some(1644.0));
    }

    #[test]
    fn blank_ws_win_is_missing() {
        let csv_data = format!(
            "{TEAMS_HEADER}\n\
1994,NL,MON,WSN,E,1,114,52,74,40,,,,,585,4000,1111,246,30,108,379,669,137,36,48,42,454,410,3.56,4,10,46,3114,970,100,288,805,94,90,0.981,Montreal Expos,Stade Olympique,1276250,102,101,MON,MON,MON"
        );
        let teams = load_teams_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(teams[0].ws_win, None);
    }

    #[test]
    fn malformed_team_rows_skipped() {
        let csv_data = "\
yearID,teamID,H,AB
2005,CHA,1450,5529
not_a_year,BOS,1579,5626
2005,NYA,1552,5624";
        let teams = load_teams_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].team_id, "CHA");
        assert_eq!(teams[1].team_id, "NYA");
        assert_eq!(teams[1].counts.walks, None);
    }

    // -- Stints --

    #[test]
    fn stints_keep_numeric_columns_only() {
        let csv_data = "\
playerID,yearID,stint,teamID,lgID,POS,G,GS,PO
smithjo01,2010,1,T1,AL,SS,40,38,55
smithjo01,2010,2,T2,NL,2B,20,,31";
        let table = load_stints_from_reader(csv_data.as_bytes(), Role::Fielding, "inline").unwrap();
        assert_eq!(table.role, Role::Fielding);
        assert_eq!(table.columns, vec!["G", "GS", "PO"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].key, PlayerSeasonKey::new(2010, "T1", "smithjo01"));
        assert_eq!(table.rows[1].values, vec![Some(20.0), None, Some(31.0)]);
    }

    #[test]
    fn stints_missing_key_column_is_an_error() {
        let csv_data = "\
playerID,yearID,G
smithjo01,2010,40";
        let err = load_stints_from_reader(csv_data.as_bytes(), Role::Batting, "Batting.csv").unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "teamID"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stints_with_bad_year_skipped() {
        let csv_data = "\
playerID,yearID,stint,teamID,lgID,G
a01,2010,1,T1,AL,10
b01,xx,1,T1,AL,12
,2010,1,T1,AL,14";
        let table = load_stints_from_reader(csv_data.as_bytes(), Role::Batting, "inline").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key.player_id, "a01");
    }

    // -- People --

    #[test]
    fn people_with_missing_birth_year() {
        let csv_data = "\
playerID,birthYear,birthMonth,nameFirst,nameLast
smithjo01,1980,4,John,Smith
ghostpl01,,,Phantom,Player";
        let people = load_people_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].birth_year, Some(1980));
        assert_eq!(people[1].birth_year, None);
    }

    #[test]
    fn duplicate_people_keep_first() {
        let csv_data = "\
playerID,birthYear
smithjo01,1980
smithjo01,1990";
        let people = load_people_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].birth_year, Some(1980));
    }

    // -- Salaries --

    #[test]
    fn salaries_parse() {
        let csv_data = "\
yearID,teamID,lgID,playerID,salary
2016,CHC,NL,arrieja01,10700000
2016,CHC,NL,bryankr01,652000";
        let salaries = load_salaries_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(salaries.len(), 2);
        assert_eq!(salaries[0].team_id, "CHC");
        assert_eq!(salaries[0].salary, Some(10_700_000.0));
    }

    // -- Directory loading --

    #[test]
    fn missing_directory_is_io_error() {
        let err = LahmanTables::load(Path::new("/definitely/not/a/databank")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
