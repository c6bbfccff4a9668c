// NFLverse weekly player stats reader (player_stats_<season>.csv).
//
// NFLverse writes `NA` for missing numbers, so every stat column is parsed
// leniently and treated as zero when absent.

use dfsops_core::NameQuery;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::{load_path, read_rows, required_name, LoadedRows, SourceError, SourceRow};

/// One player's box score for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct NflverseStatRow {
    pub line: u64,
    pub player_display_name: String,
    pub recent_team: String,
    pub position: String,
    pub season: u16,
    pub week: u8,
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
    pub rushing_yards: f64,
    pub rushing_tds: f64,
    pub receptions: f64,
    pub targets: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub fantasy_points: f64,
    pub fantasy_points_ppr: f64,
}

impl SourceRow for NflverseStatRow {
    fn line(&self) -> u64 {
        self.line
    }

    fn query(&self) -> NameQuery {
        NameQuery::new(
            &self.player_display_name,
            Some(&self.recent_team),
            Some(&self.position),
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawNflverseStat {
    player_display_name: String,
    #[serde(default, alias = "team")]
    recent_team: String,
    #[serde(default)]
    position: String,
    season: u16,
    week: u8,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    passing_yards: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    passing_tds: Option<f64>,
    #[serde(default, alias = "passing_interceptions", deserialize_with = "csv::invalid_option")]
    interceptions: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rushing_yards: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rushing_tds: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    receptions: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    targets: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    receiving_yards: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    receiving_tds: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fantasy_points: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fantasy_points_ppr: Option<f64>,
}

/// Missing, `NA` and non-finite values all count as zero.
fn stat(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(0.0)
}

fn convert(raw: RawNflverseStat, line: u64) -> Result<NflverseStatRow, String> {
    let name = required_name(&raw.player_display_name)?;
    if raw.week == 0 {
        return Err(format!("'{name}' has week 0"));
    }
    Ok(NflverseStatRow {
        line,
        player_display_name: name,
        recent_team: raw.recent_team,
        position: raw.position,
        season: raw.season,
        week: raw.week,
        passing_yards: stat(raw.passing_yards),
        passing_tds: stat(raw.passing_tds),
        interceptions: stat(raw.interceptions),
        rushing_yards: stat(raw.rushing_yards),
        rushing_tds: stat(raw.rushing_tds),
        receptions: stat(raw.receptions),
        targets: stat(raw.targets),
        receiving_yards: stat(raw.receiving_yards),
        receiving_tds: stat(raw.receiving_tds),
        fantasy_points: stat(raw.fantasy_points),
        fantasy_points_ppr: stat(raw.fantasy_points_ppr),
    })
}

pub(crate) fn load_from_reader<R: Read>(rdr: R) -> Result<LoadedRows<NflverseStatRow>, csv::Error> {
    read_rows(rdr, "NFLverse", convert)
}

/// Load NFLverse weekly stats from a CSV file.
pub fn load(path: &Path) -> Result<LoadedRows<NflverseStatRow>, SourceError> {
    load_path(path, load_from_reader)
}
