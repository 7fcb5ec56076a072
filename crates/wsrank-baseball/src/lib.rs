// Season-relative standing of World Series winners.
//
// Loads the Lahman databank tables, derives compound team metrics, joins
// mean player age and median salary onto every team-season, standardizes
// each statistic within its season, and pulls out the champions.

pub mod demographics;
pub mod lahman;
pub mod metrics;
pub mod pipeline;
pub mod salary;
pub mod standardize;
pub mod stat;
pub mod winners;
