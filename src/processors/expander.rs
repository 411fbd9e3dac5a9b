//! Turns a record's aligned series into long-form output rows.

use serde::Serialize;

use crate::config::OutputConfig;
use crate::core::enums::{Axis, TriState};
use crate::core::error::Result;
use crate::core::series::AngleSeries;

use super::pipeline::CorrectionPipeline;
use super::record::StudyRecord;

pub const UNIT_DEGREES: &str = "deg";

/// One time point of a record after normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub humerothoracic_angle: f64,
    /// Degrees, one per Euler channel.
    pub dof: [f64; 3],
    pub confidence: f64,
    pub unit: &'static str,
}

/// One line of the output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow<'a> {
    pub article: &'a str,
    pub joint: &'static str,
    pub humeral_motion: Option<&'a str>,
    pub humerothoracic_angle: f64,
    pub degree_of_freedom: u8,
    pub biomechanical_dof: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub confidence: f64,
    pub shoulder_id: Option<&'a str>,
    pub in_vivo: Option<bool>,
    pub experimental_mean: Option<&'a str>,
}

/// Identifying fields copied from the record onto every row.
#[derive(Debug, Clone, PartialEq)]
struct RowMeta {
    article: String,
    joint: &'static str,
    humeral_motion: Option<String>,
    shoulder_id: Option<String>,
    in_vivo: Option<bool>,
    experimental_mean: Option<String>,
}

/// Every sample of one record, ready to be listed as rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub index: usize,
    meta: RowMeta,
    labels: [&'static str; 3],
    samples: Vec<Sample>,
}

fn axis_label(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    }
}

impl Expansion {
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn labels(&self) -> [&'static str; 3] {
        self.labels
    }

    /// Number of rows `rows()` yields.
    pub fn row_count(&self) -> usize {
        self.samples.len() * 3
    }

    /// Output rows, all first-dof rows first, then the second, then the third.
    ///
    /// Each call starts over from the first row.
    pub fn rows(&self) -> impl Iterator<Item = OutputRow<'_>> + '_ {
        (0..3).flat_map(move |dof| {
            self.samples.iter().map(move |sample| OutputRow {
                article: &self.meta.article,
                joint: self.meta.joint,
                humeral_motion: self.meta.humeral_motion.as_deref(),
                humerothoracic_angle: sample.humerothoracic_angle,
                degree_of_freedom: dof as u8 + 1,
                biomechanical_dof: self.labels[dof],
                value: sample.dof[dof],
                unit: sample.unit,
                confidence: sample.confidence,
                shoulder_id: self.meta.shoulder_id.as_deref(),
                in_vivo: self.meta.in_vivo,
                experimental_mean: self.meta.experimental_mean.as_deref(),
            })
        })
    }
}

/// Runs the pipeline over a record's series and attaches its metadata.
///
/// With `output.corrected` unset the study's own angles are kept and labelled
/// with its sequence axes.
///
/// # Errors
///
/// `DegenerateExtraction` if any sample hits gimbal lock; no row is produced then.
pub fn expand(
    record: &StudyRecord,
    pipeline: &CorrectionPipeline,
    series: &AngleSeries,
    confidence: f64,
    output: &OutputConfig,
) -> Result<Expansion> {
    let raw: Vec<[f64; 3]> = (0..series.len()).map(|i| series.sample(i)).collect();

    let (values, labels): (Vec<[f64; 3]>, [&'static str; 3]) = if output.corrected {
        let radians: Vec<[f64; 3]> = raw.iter().map(|&s| s.map(f64::to_radians)).collect();
        let corrected = pipeline.apply_series(&radians)?;
        (
            corrected.into_iter().map(|s| s.map(f64::to_degrees)).collect(),
            record.joint.isb_dof_labels(),
        )
    } else {
        (raw, pipeline.source_sequence().axes().map(axis_label))
    };

    let samples = series
        .humerothoracic
        .iter()
        .zip(values)
        .map(|(&humerothoracic_angle, dof)| Sample {
            humerothoracic_angle,
            dof,
            confidence,
            unit: UNIT_DEGREES,
        })
        .collect();

    Ok(Expansion {
        index: record.index,
        meta: RowMeta {
            article: record.article.clone(),
            joint: record.joint.joint_type().as_str(),
            humeral_motion: record.humeral_motion.clone(),
            shoulder_id: record.shoulder_id.clone(),
            in_vivo: match record.in_vivo {
                TriState::True => Some(true),
                TriState::False => Some(false),
                TriState::Unknown => None,
            },
            experimental_mean: record.experimental_mean.clone(),
        },
        labels,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::processors::record::fixtures::isb_scapulothoracic_row;
    use approx::assert_relative_eq;

    fn record_and_pipeline(sequence: &str) -> (StudyRecord, CorrectionPipeline) {
        let mut row = isb_scapulothoracic_row();
        row.set("euler_sequence", sequence);
        let record = StudyRecord::from_row(7, &row).unwrap();
        let pipeline = CorrectionPipeline::for_record(&record, &ExtractionConfig::default()).unwrap();
        (record, pipeline)
    }

    fn series() -> AngleSeries {
        AngleSeries {
            humerothoracic: vec![20.0, 40.0],
            channels: [vec![10.0, 12.0], vec![5.0, 6.0], vec![-3.0, -4.0]],
        }
    }

    #[test]
    fn test_rows_are_dof_major() {
        let (record, pipeline) = record_and_pipeline("yxz");
        let expansion =
            expand(&record, &pipeline, &series(), 0.8, &OutputConfig::default()).unwrap();

        let rows: Vec<OutputRow> = expansion.rows().collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(expansion.row_count(), 6);
        let dofs: Vec<u8> = rows.iter().map(|r| r.degree_of_freedom).collect();
        assert_eq!(dofs, vec![1, 1, 2, 2, 3, 3]);

        assert_eq!(rows[0].biomechanical_dof, "protraction_retraction");
        assert_eq!(rows[0].joint, "scapulothoracic");
        assert_eq!(rows[0].article, "Doe et al. 2020");
        assert_eq!(rows[0].unit, "deg");
        assert_eq!(rows[0].in_vivo, Some(true));
        assert_eq!(rows[3].humerothoracic_angle, 40.0);
        assert_relative_eq!(rows[3].value, 6.0, epsilon = 1e-9);
        assert!(rows.iter().all(|r| r.confidence == 0.8));
    }

    #[test]
    fn test_rows_restart_identically() {
        let (record, pipeline) = record_and_pipeline("yxz");
        let expansion =
            expand(&record, &pipeline, &series(), 1.0, &OutputConfig::default()).unwrap();
        let first: Vec<OutputRow> = expansion.rows().collect();
        let second: Vec<OutputRow> = expansion.rows().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uncorrected_output_keeps_raw_angles() {
        let (record, pipeline) = record_and_pipeline("xzy");
        let expansion = expand(
            &record,
            &pipeline,
            &series(),
            1.0,
            &OutputConfig { corrected: false },
        )
        .unwrap();
        assert_eq!(expansion.labels(), ["x", "z", "y"]);
        assert_eq!(expansion.samples()[1].dof, [12.0, 6.0, -4.0]);
    }

    #[test]
    fn test_empty_series_has_no_rows() {
        let (record, pipeline) = record_and_pipeline("yxz");
        let expansion = expand(
            &record,
            &pipeline,
            &AngleSeries::default(),
            1.0,
            &OutputConfig::default(),
        )
        .unwrap();
        assert_eq!(expansion.rows().count(), 0);
    }
}
