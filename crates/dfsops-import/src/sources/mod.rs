// Typed CSV readers for every upstream source.
//
// Each source deserializes into a private raw serde struct, which is then
// validated into a public row type. Malformed rows are skipped with a warning
// and counted rather than failing the whole file.

pub mod actuals;
pub mod draftkings;
pub mod nflverse;
pub mod projections;
pub mod props;

use dfsops_core::NameQuery;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::warn;

pub use actuals::ActualsCsvRow;
pub use draftkings::DkSalaryRow;
pub use nflverse::NflverseStatRow;
pub use projections::ProjectionCsvRow;
pub use props::PropCsvRow;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Shared row plumbing
// ---------------------------------------------------------------------------

/// A validated source row that names a player.
pub trait SourceRow {
    /// 1-based line in the source file (header is line 1).
    fn line(&self) -> u64;

    /// The matcher query built from this row's name/team/position columns.
    fn query(&self) -> NameQuery;
}

/// Rows that survived validation plus how many were dropped.
#[derive(Debug, Clone)]
pub struct LoadedRows<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> LoadedRows<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read every record of `rdr` as `R` and convert it with `convert`, which
/// receives the record's line number and returns `Err(reason)` to skip.
pub(crate) fn read_rows<R, T, F>(rdr: impl Read, what: &str, convert: F) -> Result<LoadedRows<T>, csv::Error>
where
    R: DeserializeOwned,
    F: Fn(R, u64) -> Result<T, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    let mut skipped = 0;
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping unreadable {what} row: {e}");
                skipped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: R = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed {what} row at line {line}: {e}");
                skipped += 1;
                continue;
            }
        };
        match convert(raw, line) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                warn!("skipping {what} row at line {line}: {reason}");
                skipped += 1;
            }
        }
    }
    Ok(LoadedRows { rows, skipped })
}

/// Open `path` and run a reader-based loader over it, attaching the path to
/// any error.
pub(crate) fn load_path<T>(
    path: &Path,
    load: impl FnOnce(std::fs::File) -> Result<LoadedRows<T>, csv::Error>,
) -> Result<LoadedRows<T>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reject empty names; return the trimmed name otherwise.
pub(crate) fn required_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("empty player name".into());
    }
    Ok(trimmed.to_string())
}

/// Returns true if all given f64 values are finite (not NaN or Infinity).
pub(crate) fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Raw {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Value")]
        value: f64,
    }

    fn load(csv: &str) -> LoadedRows<(String, f64, u64)> {
        read_rows(csv.as_bytes(), "test", |raw: Raw, line| {
            let name = required_name(&raw.name)?;
            if !all_finite(&[raw.value]) {
                return Err("non-finite value".into());
            }
            Ok((name, raw.value, line))
        })
        .unwrap()
    }

    #[test]
    fn line_numbers_count_the_header() {
        let loaded = load("Name,Value\nA,1\nB,2\n");
        assert_eq!(loaded.rows[0], ("A".to_string(), 1.0, 2));
        assert_eq!(loaded.rows[1], ("B".to_string(), 2.0, 3));
        assert_eq!(loaded.skipped, 0);
    }

    #[test]
    fn malformed_and_rejected_rows_are_counted() {
        let loaded = load("Name,Value\nA,1\nB,oops\n,3\nC,NaN\nD,4\n");
        let names: Vec<&str> = loaded.rows.iter().map(|r| r.0.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
        assert_eq!(loaded.skipped, 3);
    }

    #[test]
    fn fields_are_trimmed() {
        let loaded = load("Name,Value\n  Josh Allen  , 3.5 \n");
        assert_eq!(loaded.rows[0].0, "Josh Allen");
        assert!((loaded.rows[0].1 - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_path(Path::new("/nonexistent/dfsops.csv"), |f| {
            read_rows(f, "test", |raw: Raw, _| Ok(raw.name))
        })
        .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
