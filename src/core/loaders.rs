//! Data loaders for the dataset table and the digitized angle curves.
//!
//! This module provides parsers for:
//! - The dataset table (one study record per row, columns addressed by name)
//! - Headerless two-column series files (humerothoracic angle, joint angle)

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::{debug, warn};
use thiserror::Error;

use super::series::{AngleSeries, Series};

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Parse error in {path}, line {line}: '{value}' is not a number")]
    ParseError {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Columns every dataset table must carry.
const REQUIRED_COLUMNS: [&str; 3] = ["joint", "parent", "child"];

/// One row of the dataset table, addressed by column name.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Cell content, or `None` when the column is absent or holds a missing marker
    /// (empty, `nan`, `none`, `null`).
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = self.cells.get(column)?.trim();
        match value.to_ascii_lowercase().as_str() {
            "" | "nan" | "none" | "null" => None,
            _ => Some(value),
        }
    }

    pub fn set(&mut self, column: &str, value: &str) {
        self.cells.insert(column.to_string(), value.to_string());
    }
}

/// Load the dataset table.
///
/// The first line holds the column names. Every following line becomes one
/// `RawRow`; cells are kept as text and parsed by the record layer.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has no data rows, or lacks the
/// `joint`, `parent` and `child` columns.
pub fn load_dataset_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == c))
        .collect();
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing.join(", ")));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(RawRow::from_pairs(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string())),
        ));
    }

    if rows.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }
    debug!("Loaded {} dataset rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load a headerless two-column series file.
///
/// Blank lines are skipped. Extra columns are ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a cell is not a number.
pub fn load_series_csv<P: AsRef<Path>>(path: P) -> Result<Series> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let mut humerothoracic = Vec::new();
    let mut values = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let parse = |idx: usize| -> Result<f64> {
            let raw = record.get(idx).unwrap_or_default();
            raw.parse::<f64>().map_err(|_| LoaderError::ParseError {
                path: path.to_path_buf(),
                line: line + 1,
                value: raw.to_string(),
            })
        };
        humerothoracic.push(parse(0)?);
        values.push(parse(1)?);
    }

    Ok(Series::new(humerothoracic, values))
}

/// Load the three Euler channels of a record and align them.
///
/// Files are resolved as `<root>/<folder>/<file>`. A channel without a file
/// reference, or whose file does not exist, is treated as not reported.
///
/// # Errors
///
/// Returns an error if an existing file cannot be parsed.
pub fn load_angle_series(
    root: &Path,
    folder: Option<&str>,
    files: [Option<&str>; 3],
) -> Result<AngleSeries> {
    let base = match folder {
        Some(folder) => root.join(folder),
        None => root.to_path_buf(),
    };

    let mut channels: [Series; 3] = Default::default();
    for (channel, file) in channels.iter_mut().zip(files) {
        let Some(file) = file else {
            continue;
        };
        let path = base.join(file);
        if !path.exists() {
            warn!("Series file not found, channel left empty: {}", path.display());
            continue;
        }
        *channel = load_series_csv(&path)?;
    }

    Ok(AngleSeries::align(channels))
}
