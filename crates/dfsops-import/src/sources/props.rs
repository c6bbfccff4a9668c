// Player prop lines reader (Odds-API exports flattened to one row per
// player/market/bookmaker).

use dfsops_core::NameQuery;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::{all_finite, load_path, read_rows, required_name, LoadedRows, SourceError, SourceRow};

/// One prop line, e.g. "Josh Allen player_pass_yds 262.5 -115/-105 @ draftkings".
#[derive(Debug, Clone, PartialEq)]
pub struct PropCsvRow {
    pub line: u64,
    pub player: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub market: String,
    pub prop_line: f64,
    /// American odds.
    pub over_odds: Option<i32>,
    pub under_odds: Option<i32>,
    pub bookmaker: String,
}

impl SourceRow for PropCsvRow {
    fn line(&self) -> u64 {
        self.line
    }

    fn query(&self) -> NameQuery {
        NameQuery::new(&self.player, self.team.as_deref(), self.position.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawProp {
    #[serde(alias = "player", alias = "Name", alias = "description")]
    Player: String,
    #[serde(default, alias = "team")]
    Team: Option<String>,
    #[serde(default, alias = "position", alias = "Pos")]
    Position: Option<String>,
    #[serde(alias = "market", alias = "market_key")]
    Market: String,
    #[serde(alias = "line", alias = "point")]
    Line: f64,
    #[serde(default, alias = "over_odds", alias = "over_price", deserialize_with = "csv::invalid_option")]
    OverOdds: Option<i32>,
    #[serde(default, alias = "under_odds", alias = "under_price", deserialize_with = "csv::invalid_option")]
    UnderOdds: Option<i32>,
    #[serde(default, alias = "bookmaker", alias = "book")]
    Bookmaker: String,
}

fn convert(raw: RawProp, line: u64) -> Result<PropCsvRow, String> {
    let player = required_name(&raw.Player)?;
    let market = raw.Market.trim().to_lowercase();
    if market.is_empty() {
        return Err(format!("'{player}' has no market"));
    }
    if !all_finite(&[raw.Line]) {
        return Err(format!("'{player}' has non-finite line"));
    }
    if raw.OverOdds.is_none() && raw.UnderOdds.is_none() {
        return Err(format!("'{player}' {market} has no prices"));
    }
    let bookmaker = match raw.Bookmaker.trim() {
        "" => "unknown".to_string(),
        b => b.to_lowercase(),
    };
    Ok(PropCsvRow {
        line,
        player,
        team: raw.Team,
        position: raw.Position,
        market,
        prop_line: raw.Line,
        over_odds: raw.OverOdds,
        under_odds: raw.UnderOdds,
        bookmaker,
    })
}

pub(crate) fn load_from_reader<R: Read>(rdr: R) -> Result<LoadedRows<PropCsvRow>, csv::Error> {
    read_rows(rdr, "prop", convert)
}

/// Load player props from a CSV file.
pub fn load(path: &Path) -> Result<LoadedRows<PropCsvRow>, SourceError> {
    load_path(path, load_from_reader)
}
