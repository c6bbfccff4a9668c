// DraftKings salary export (DKSalaries.csv) reader. This is the only source
// that creates canonical players.

use dfsops_core::{CanonicalPlayer, NameQuery, Position};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::{all_finite, load_path, read_rows, required_name, LoadedRows, SourceError, SourceRow};

/// One player on a DraftKings slate.
#[derive(Debug, Clone, PartialEq)]
pub struct DkSalaryRow {
    pub line: u64,
    pub player_dk_id: i64,
    pub name: String,
    pub position: Position,
    /// Slot eligibility string, e.g. `RB/FLEX`.
    pub roster_position: String,
    pub salary: u32,
    /// e.g. `BUF@MIA 09/14/2025 01:00PM ET`
    pub game_info: String,
    pub team: String,
    pub avg_points: f64,
}

impl DkSalaryRow {
    /// The canonical identity this row describes.
    pub fn to_player(&self) -> CanonicalPlayer {
        CanonicalPlayer::new(self.player_dk_id, &self.name, self.position.clone(), &self.team)
    }
}

impl SourceRow for DkSalaryRow {
    fn line(&self) -> u64 {
        self.line
    }

    fn query(&self) -> NameQuery {
        NameQuery::new(&self.name, Some(&self.team), Some(self.position.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct RawDkSalary {
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Roster Position", default)]
    roster_position: String,
    #[serde(rename = "Salary")]
    salary: u32,
    #[serde(rename = "Game Info", default)]
    game_info: String,
    #[serde(rename = "TeamAbbrev")]
    team: String,
    #[serde(rename = "AvgPointsPerGame", default)]
    avg_points: f64,
}

fn convert(raw: RawDkSalary, line: u64) -> Result<DkSalaryRow, String> {
    let name = required_name(&raw.name)?;
    let Some(position) = Position::parse(&raw.position) else {
        return Err(format!("'{name}' has no position"));
    };
    if raw.id <= 0 {
        return Err(format!("'{name}' has non-positive ID {}", raw.id));
    }
    if !all_finite(&[raw.avg_points]) {
        return Err(format!("'{name}' has non-finite AvgPointsPerGame"));
    }
    Ok(DkSalaryRow {
        line,
        player_dk_id: raw.id,
        name,
        position,
        roster_position: raw.roster_position,
        salary: raw.salary,
        game_info: raw.game_info,
        team: raw.team.to_uppercase(),
        avg_points: raw.avg_points,
    })
}

pub(crate) fn load_from_reader<R: Read>(rdr: R) -> Result<LoadedRows<DkSalaryRow>, csv::Error> {
    read_rows(rdr, "DraftKings salary", convert)
}

/// Load a DraftKings salary export.
pub fn load(path: &Path) -> Result<LoadedRows<DkSalaryRow>, SourceError> {
    load_path(path, load_from_reader)
}
