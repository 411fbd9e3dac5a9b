//! Parallel normalization of a whole dataset table.
//!
//! Records are independent: each one is parsed, validated, scored and expanded
//! on the rayon pool. A failing record is reported and skipped, it never stops
//! the others. Results keep the input order.

use std::path::Path;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::core::error::RecordError;
use crate::core::loaders::{load_angle_series, LoaderError, RawRow};

use super::confidence;
use super::expander::{expand, Expansion, OutputRow};
use super::pipeline::CorrectionPipeline;
use super::record::{article_of, RecordStatus, StudyRecord};
use super::validity::{check_record, Verdict};

/// Why one row produced no output.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("failed to load series: {0}")]
    Loader(#[from] LoaderError),

    #[error("record carries no usable rotation data")]
    NotUsable,
}

/// A row excluded from the output.
#[derive(Debug)]
pub struct Rejection {
    pub index: usize,
    pub article: String,
    pub error: ProcessError,
}

/// Flat form of a rejection for the report file.
#[derive(Debug, Serialize)]
pub struct RejectionRow<'a> {
    pub index: usize,
    pub article: &'a str,
    pub reason: String,
}

impl Rejection {
    pub fn to_row(&self) -> RejectionRow<'_> {
        RejectionRow {
            index: self.index,
            article: &self.article,
            reason: self.error.to_string(),
        }
    }
}

/// Validation result of one row, without touching its series.
#[derive(Debug)]
pub struct RecordCheck {
    pub index: usize,
    pub article: String,
    pub outcome: Result<(Verdict, f64), ProcessError>,
}

/// Everything a batch produced, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub expansions: Vec<Expansion>,
    pub rejections: Vec<Rejection>,
    pub statuses: Vec<RecordStatus>,
}

impl BatchReport {
    /// All output rows, record after record.
    pub fn rows(&self) -> impl Iterator<Item = OutputRow<'_>> + '_ {
        self.expansions.iter().flat_map(|e| e.rows())
    }

    pub fn row_count(&self) -> usize {
        self.expansions.iter().map(Expansion::row_count).sum()
    }
}

/// Parses and validates a row, then computes its confidence.
fn prepare(
    index: usize,
    row: &RawRow,
    config: &PipelineConfig,
) -> Result<(StudyRecord, Verdict, f64), ProcessError> {
    let mut record = StudyRecord::from_row(index, row)?;
    let verdict = check_record(&record, &config.validation)?;
    if !verdict.usable_rotation {
        return Err(ProcessError::NotUsable);
    }
    record.mark_validated(verdict);
    let score = confidence::score(&record, &verdict, &config.confidence);
    Ok((record, verdict, score))
}

fn process_row(
    index: usize,
    row: &RawRow,
    config: &PipelineConfig,
) -> (RecordStatus, Result<Expansion, Rejection>) {
    let reject = |error: ProcessError| {
        warn!("Row {} rejected: {}", index, error);
        let status = RecordStatus::Rejected(error.to_string());
        (
            status,
            Err(Rejection {
                index,
                article: article_of(index, row),
                error,
            }),
        )
    };

    let (mut record, _, score) = match prepare(index, row, config) {
        Ok(prepared) => prepared,
        Err(e) => return reject(e),
    };

    let pipeline = match CorrectionPipeline::for_record(&record, &config.extraction) {
        Ok(p) => p,
        Err(e) => return reject(e.into()),
    };
    record.mark_ready(score);

    let files = [
        record.dof_files[0].as_deref(),
        record.dof_files[1].as_deref(),
        record.dof_files[2].as_deref(),
    ];
    let series = match load_angle_series(&config.data.root, record.folder.as_deref(), files) {
        Ok(s) => s,
        Err(e) => return reject(e.into()),
    };

    match expand(&record, &pipeline, &series, score, &config.output) {
        Ok(expansion) => {
            debug!(
                "Row {} ({}): {} samples, confidence {:.3}",
                index,
                record.article,
                expansion.samples().len(),
                score
            );
            record.mark_expanded(expansion.row_count());
            (record.status().clone(), Ok(expansion))
        }
        Err(e) => reject(e.into()),
    }
}

/// Normalizes every row of the dataset table.
///
/// # Example
///
/// ```no_run
/// use shoulder_kinematics::config::PipelineConfig;
/// use shoulder_kinematics::core::loaders::load_dataset_csv;
/// use shoulder_kinematics::processors::batch::normalize_rows;
///
/// let rows = load_dataset_csv("dataset.csv").unwrap();
/// let report = normalize_rows(&rows, &PipelineConfig::default());
/// println!("{} rows, {} rejected", report.row_count(), report.rejections.len());
/// ```
pub fn normalize_rows(rows: &[RawRow], config: &PipelineConfig) -> BatchReport {
    let outcomes: Vec<(RecordStatus, Result<Expansion, Rejection>)> = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| process_row(index, row, config))
        .collect();

    let mut report = BatchReport::default();
    for (status, result) in outcomes {
        report.statuses.push(status);
        match result {
            Ok(expansion) => report.expansions.push(expansion),
            Err(rejection) => report.rejections.push(rejection),
        }
    }
    info!(
        "Normalized {} of {} records ({} output rows)",
        report.expansions.len(),
        rows.len(),
        report.row_count()
    );
    report
}

/// Runs the acceptance rules and confidence scoring on every row.
pub fn check_rows(rows: &[RawRow], config: &PipelineConfig) -> Vec<RecordCheck> {
    rows.par_iter()
        .enumerate()
        .map(|(index, row)| RecordCheck {
            index,
            article: article_of(index, row),
            outcome: prepare(index, row, config).map(|(_, verdict, score)| (verdict, score)),
        })
        .collect()
}

/// Convenience for callers holding a path: loads then normalizes.
pub fn normalize_dataset(path: &Path, config: &PipelineConfig) -> Result<BatchReport, LoaderError> {
    let rows = crate::core::loaders::load_dataset_csv(path)?;
    Ok(normalize_rows(&rows, config))
}
