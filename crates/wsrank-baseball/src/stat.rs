// The statistics compared across each season's teams.

use std::fmt;

use crate::metrics::TeamSeason;

/// A team-season statistic that is standardized within its season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Runs,
    Hits,
    BattingAverage,
    Slugging,
    OnBase,
    Ops,
    StolenBases,
    RunsAllowed,
    Era,
    HitsAllowed,
    Strikeouts,
    WalksAllowed,
    Age,
    Salary,
}

/// The fixed list of statistics of interest, in output column order.
pub const STATS_OF_INTEREST: [Stat; 14] = [
    Stat::Runs,
    Stat::Hits,
    Stat::BattingAverage,
    Stat::Slugging,
    Stat::OnBase,
    Stat::Ops,
    Stat::StolenBases,
    Stat::RunsAllowed,
    Stat::Era,
    Stat::HitsAllowed,
    Stat::Strikeouts,
    Stat::WalksAllowed,
    Stat::Age,
    Stat::Salary,
];

impl Stat {
    /// Column label, following the databank's column names.
    pub fn label(self) -> &'static str {
        match self {
            Stat::Runs => "R",
            Stat::Hits => "H",
            Stat::BattingAverage => "teamBA",
            Stat::Slugging => "SLG",
            Stat::OnBase => "OBP",
            Stat::Ops => "OPS",
            Stat::StolenBases => "SB",
            Stat::RunsAllowed => "RA",
            Stat::Era => "ERA",
            Stat::HitsAllowed => "HA",
            Stat::Strikeouts => "SO",
            Stat::WalksAllowed => "BBA",
            Stat::Age => "age",
            Stat::Salary => "salary",
        }
    }

    /// Read this statistic from a team-season.
    pub fn value(self, team: &TeamSeason) -> Option<f64> {
        let c = &team.counts;
        let m = &team.metrics;
        match self {
            Stat::Runs => c.runs,
            Stat::Hits => c.hits,
            Stat::BattingAverage => m.batting_average,
            Stat::Slugging => m.slg,
            Stat::OnBase => m.obp,
            Stat::Ops => m.ops,
            Stat::StolenBases => c.stolen_bases,
            Stat::RunsAllowed => c.runs_allowed,
            Stat::Era => c.era,
            Stat::HitsAllowed => c.hits_allowed,
            Stat::Strikeouts => c.strikeouts,
            Stat::WalksAllowed => c.walks_allowed,
            Stat::Age => team.mean_age,
            Stat::Salary => team.median_salary,
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<&str> = STATS_OF_INTEREST.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), STATS_OF_INTEREST.len());
    }

    #[test]
    fn list_is_in_declaration_order() {
        let mut sorted = STATS_OF_INTEREST;
        sorted.sort();
        assert_eq!(sorted, STATS_OF_INTEREST);
    }
}
