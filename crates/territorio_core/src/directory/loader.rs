//! Tabular loaders for the municipality dataset.
//!
//! # Responsibility
//! - Read `(code, name, province, region)` rows from CSV files.
//! - Tolerate a missing dataset by substituting a built-in fallback
//!   table, so the application still starts on a fresh checkout.
//!
//! # Invariants
//! - Malformed rows are skipped with a warning, never fatal.
//! - Codes are carried as opaque text; canonicalization happens in the
//!   directory, not here.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Built-in fallback rows used when no dataset file is present.
///
/// Lecco-province municipalities (the operating area) plus a national
/// sample, in the same `codice,comune,provincia,regione` shape as the
/// downloadable ISTAT list.
const FALLBACK_CSV: &str = include_str!("fallback_comuni.csv");

/// One raw directory row before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRow {
    pub code: String,
    pub name: String,
    pub province: String,
    pub region: String,
}

#[derive(Debug)]
pub enum DirectoryError {
    Io(std::io::Error),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "directory dataset read failed: {err}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DirectoryError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Source of tabular municipality data.
pub trait DirectoryLoader {
    fn load(&self) -> Result<Vec<DirectoryRow>, DirectoryError>;
}

/// CSV-file loader with ordered path preference and built-in fallback.
///
/// Paths are tried in order (the ISTAT list first when present); when no
/// file exists the embedded fallback table is used.
#[derive(Debug, Clone, Default)]
pub struct CsvDirectoryLoader {
    paths: Vec<PathBuf>,
}

impl CsvDirectoryLoader {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Conventional dataset locations, preferred order.
    pub fn with_default_paths(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self::new([
            data_dir.join("elenco_comuni_istat.csv"),
            data_dir.join("elenco_comuni_completo.csv"),
            data_dir.join("elenco_comuni.csv"),
        ])
    }
}

impl DirectoryLoader for CsvDirectoryLoader {
    fn load(&self) -> Result<Vec<DirectoryRow>, DirectoryError> {
        for path in &self.paths {
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(path)?;
            info!(
                "event=directory_source module=directory status=ok path={}",
                path.display()
            );
            return Ok(parse_csv(&content));
        }

        warn!("event=directory_source module=directory status=fallback reason=no_dataset_file");
        Ok(parse_csv(FALLBACK_CSV))
    }
}

/// In-memory loader for tests and embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectoryLoader {
    rows: Vec<DirectoryRow>,
}

impl StaticDirectoryLoader {
    pub fn new(rows: Vec<DirectoryRow>) -> Self {
        Self { rows }
    }

    /// Loader over the embedded fallback table.
    pub fn builtin() -> Self {
        Self::new(parse_csv(FALLBACK_CSV))
    }
}

impl DirectoryLoader for StaticDirectoryLoader {
    fn load(&self) -> Result<Vec<DirectoryRow>, DirectoryError> {
        Ok(self.rows.clone())
    }
}

fn parse_csv(content: &str) -> Vec<DirectoryRow> {
    let mut rows = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (index == 0 && line.starts_with("codice")) {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 4 {
            warn!(
                "event=directory_source module=directory status=skipped_row line={} fields={}",
                index + 1,
                fields.len()
            );
            continue;
        }

        rows.push(DirectoryRow {
            code: fields[0].trim().to_string(),
            name: fields[1].trim().to_string(),
            province: fields[2].trim().to_string(),
            region: fields[3].trim().to_string(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{parse_csv, CsvDirectoryLoader, DirectoryLoader, StaticDirectoryLoader};

    #[test]
    fn parse_csv_skips_header_and_malformed_rows() {
        let rows = parse_csv(
            "codice,comune,provincia,regione\n\
             097042,Lecco,Lecco,Lombardia\n\
             broken-row-without-commas\n\
             097001,Abbadia Lariana,Lecco,Lombardia\n",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "097042");
        assert_eq!(rows[1].name, "Abbadia Lariana");
    }

    #[test]
    fn builtin_table_contains_operating_area() {
        let rows = StaticDirectoryLoader::builtin().load().unwrap();
        assert!(rows.iter().any(|row| row.code == "097042"));
        assert!(rows.iter().any(|row| row.code == "097001"));
    }

    #[test]
    fn missing_files_fall_back_to_builtin_table() {
        let loader = CsvDirectoryLoader::with_default_paths("/nonexistent/dataset/dir");
        let rows = loader.load().unwrap();
        assert!(!rows.is_empty());
    }
}
