// Projection CSV reader. Accepts the column spellings used by the common
// projection sites (Name/Player, Pos/Position, Proj/FPTS/Points).

use dfsops_core::NameQuery;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::{all_finite, load_path, read_rows, required_name, LoadedRows, SourceError, SourceRow};

/// Projected fantasy points for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionCsvRow {
    pub line: u64,
    pub name: String,
    pub team: String,
    pub position: String,
    pub points: f64,
    /// Projected ownership percentage, when the site publishes one.
    pub ownership: Option<f64>,
}

impl SourceRow for ProjectionCsvRow {
    fn line(&self) -> u64 {
        self.line
    }

    fn query(&self) -> NameQuery {
        NameQuery::new(&self.name, Some(&self.team), Some(&self.position))
    }
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawProjection {
    #[serde(alias = "Player", alias = "player", alias = "name")]
    Name: String,
    #[serde(default, alias = "team", alias = "Tm")]
    Team: String,
    #[serde(default, alias = "Pos", alias = "position", alias = "pos")]
    Position: String,
    #[serde(alias = "Proj", alias = "FPTS", alias = "Projection", alias = "points")]
    Points: f64,
    #[serde(
        default,
        alias = "Own%",
        alias = "Own",
        alias = "ownership",
        deserialize_with = "csv::invalid_option"
    )]
    Ownership: Option<f64>,
}

fn convert(raw: RawProjection, line: u64) -> Result<ProjectionCsvRow, String> {
    let name = required_name(&raw.Name)?;
    if !all_finite(&[raw.Points]) {
        return Err(format!("'{name}' has non-finite projected points"));
    }
    Ok(ProjectionCsvRow {
        line,
        name,
        team: raw.Team,
        position: raw.Position,
        points: raw.Points,
        ownership: raw.Ownership.filter(|o| o.is_finite()),
    })
}

pub(crate) fn load_from_reader<R: Read>(rdr: R) -> Result<LoadedRows<ProjectionCsvRow>, csv::Error> {
    read_rows(rdr, "projection", convert)
}

/// Load projections from a CSV file.
pub fn load(path: &Path) -> Result<LoadedRows<ProjectionCsvRow>, SourceError> {
    load_path(path, load_from_reader)
}
