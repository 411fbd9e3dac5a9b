//! CSV writers for normalized output tables.
//!
//! Rows are any `serde::Serialize` struct; the header is taken from the field
//! names of the first row.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Write serializable rows to a CSV file with a header line.
///
/// Returns the number of data rows written. An empty iterator produces an
/// empty file.
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use shoulder_kinematics::core::writers::write_csv;
/// use std::path::Path;
///
/// #[derive(serde::Serialize)]
/// struct Row { joint: &'static str, value: f64 }
///
/// write_csv(Path::new("out.csv"), [Row { joint: "glenohumeral", value: 1.0 }]).unwrap();
/// ```
pub fn write_csv<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    ensure_parent_dirs(path)?;
    let mut csv_writer = csv::Writer::from_writer(create_buffered_writer(path)?);
    let path_str = path.display().to_string();

    let mut count = 0;
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(count)
}
