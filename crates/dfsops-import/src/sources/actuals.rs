// Weekly actual fantasy points reader (contest results / box-score exports).

use dfsops_core::NameQuery;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::{all_finite, load_path, read_rows, required_name, LoadedRows, SourceError, SourceRow};

/// Points a player actually scored.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualsCsvRow {
    pub line: u64,
    pub name: String,
    pub team: String,
    pub position: String,
    /// Week column, when the export carries one. Rows for a different week
    /// than the one being imported are dropped by the pipeline.
    pub week: Option<u8>,
    pub points: f64,
}

impl SourceRow for ActualsCsvRow {
    fn line(&self) -> u64 {
        self.line
    }

    fn query(&self) -> NameQuery {
        NameQuery::new(&self.name, Some(&self.team), Some(&self.position))
    }
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawActual {
    #[serde(alias = "Player", alias = "player", alias = "name")]
    Name: String,
    #[serde(default, alias = "team", alias = "Tm")]
    Team: String,
    #[serde(default, alias = "Pos", alias = "position", alias = "pos")]
    Position: String,
    /// An empty cell is `None`; anything that is not a week number fails the
    /// row.
    #[serde(default, alias = "week", alias = "Wk")]
    Week: Option<u8>,
    #[serde(alias = "FPTS", alias = "Actual", alias = "points", alias = "DK Points")]
    Points: f64,
}

fn convert(raw: RawActual, line: u64) -> Result<ActualsCsvRow, String> {
    let name = required_name(&raw.Name)?;
    if !all_finite(&[raw.Points]) {
        return Err(format!("'{name}' has non-finite points"));
    }
    Ok(ActualsCsvRow {
        line,
        name,
        team: raw.Team,
        position: raw.Position,
        week: raw.Week,
        points: raw.Points,
    })
}

pub(crate) fn load_from_reader<R: Read>(rdr: R) -> Result<LoadedRows<ActualsCsvRow>, csv::Error> {
    read_rows(rdr, "actuals", convert)
}

/// Load actual points from a CSV file.
pub fn load(path: &Path) -> Result<LoadedRows<ActualsCsvRow>, SourceError> {
    load_path(path, load_from_reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_week() {
        let csv_data = "\
Name,Team,Position,Week,Points
Josh Allen,BUF,QB,3,31.4
Bills,BUF,DST,3,-2";

        let loaded = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.rows[0].week, Some(3));
        assert!((loaded.rows[0].points - 31.4).abs() < f64::EPSILON);
        assert!((loaded.rows[1].points + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn week_column_is_optional() {
        let csv_data = "\
Player,Pos,DK Points
Josh Allen,QB,31.4";

        let loaded = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(loaded.rows[0].week, None);
        assert_eq!(loaded.rows[0].team, "");
        assert_eq!(loaded.rows[0].query().team, None);
    }

    #[test]
    fn unreadable_week_skips_the_row() {
        let csv_data = "\
Name,Team,Position,Week,Points
Josh Allen,BUF,QB,wk17,31.4
Jalen Hurts,PHI,QB,300,20
Justin Jefferson,MIN,WR,,26.9";

        let loaded = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.skipped, 2);
        assert_eq!(loaded.rows[0].name, "Justin Jefferson");
        assert_eq!(loaded.rows[0].week, None);
    }

    #[test]
    fn nan_points_skipped() {
        let csv_data = "\
Name,Team,Position,Points
Josh Allen,BUF,QB,NaN
Jalen Hurts,PHI,QB,20";

        let loaded = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.rows[0].name, "Jalen Hurts");
    }
}
