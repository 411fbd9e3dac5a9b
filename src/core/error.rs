//! Per-record failure taxonomy.
//!
//! Every variant is recoverable at the batch level: the offending record is
//! excluded from the output and reported, the rest of the dataset proceeds.

use thiserror::Error;

use super::enums::{EulerSequence, JointType, Segment};

/// Reasons a study record cannot be normalized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Segment axes are not orthogonal, not right-handed, or incompletely declared.
    #[error("invalid {segment} frame: {reason}")]
    InvalidFrame { segment: Segment, reason: String },

    /// The joint declares neither an Euler sequence nor a translation reference.
    #[error("joint {joint} has neither an Euler sequence nor a translation reference")]
    MissingJointData { joint: JointType },

    /// A segment the joint relies on has no axis definition in the row.
    #[error("{segment} segment is part of the joint but its axes are not provided")]
    MissingSegmentDefinition { segment: Segment },

    /// The row's parent/child pair does not match the declared joint type.
    #[error("joint {joint} links {expected_parent} -> {expected_child}, row declares {parent} -> {child}")]
    JointSegmentMismatch {
        joint: JointType,
        expected_parent: Segment,
        expected_child: Segment,
        parent: Segment,
        child: Segment,
    },

    /// A declared correction contradicts the segment's ISB compliance.
    #[error("inconsistent correction on {segment}: {reason}")]
    InconsistentCorrection { segment: Segment, reason: String },

    /// Euler re-extraction hit a gimbal-lock configuration.
    #[error("degenerate {sequence} extraction: second angle at {middle_angle_deg:.3} deg is singular")]
    DegenerateExtraction {
        sequence: EulerSequence,
        middle_angle_deg: f64,
    },

    /// A string field holds a value outside its closed vocabulary.
    #[error("unknown {kind} value '{value}'")]
    UnknownEnumerationValue { kind: &'static str, value: String },
}

impl RecordError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        RecordError::UnknownEnumerationValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Result type for record-level operations.
pub type Result<T> = std::result::Result<T, RecordError>;
