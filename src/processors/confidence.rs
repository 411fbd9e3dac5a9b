//! Confidence attached to every sample of a record.
//!
//! The score is the product of one factor per segment and one for the Euler
//! sequence, so it can only go down as deviations accumulate. The sequence
//! factor never looks at the segment frames: making a frame compliant can only
//! raise the score.

use log::debug;

use crate::config::ConfidenceConfig;
use crate::core::enums::{Axis, EulerSequence, JointType};
use crate::core::frame::AnatomicalFrame;

use super::record::StudyRecord;
use super::validity::{SegmentRisk, Verdict};

/// Multiplier for one segment classification, never above 1.
pub fn risk_factor(risk: SegmentRisk, config: &ConfidenceConfig) -> f64 {
    let factor = match risk {
        SegmentRisk::Compliant => 1.0,
        SegmentRisk::OriginOffset => config.origin_offset,
        SegmentRisk::ScapulaOriginOffset => config.scapula_origin_offset,
        SegmentRisk::Reoriented => config.reoriented,
        SegmentRisk::ScapulaNonIsb => config.scapula_non_isb,
        SegmentRisk::NonIsb => config.non_isb,
        SegmentRisk::GlobalThorax => config.global_thorax,
    };
    factor.min(1.0)
}

/// The ISB sequence of `joint` written with the study's own axis names.
///
/// The first two rotations happen about parent axes and the last about a
/// child axis, so each ISB letter is renamed through the matching frame.
pub fn adapted_isb_sequence(
    joint: JointType,
    parent: &AnatomicalFrame,
    child: &AnatomicalFrame,
) -> Option<EulerSequence> {
    let [a, b, c]: [Axis; 3] = joint.isb_sequence().axes();
    EulerSequence::from_axes([parent.axis_along(a), parent.axis_along(b), child.axis_along(c)])
}

/// Whether the declared sequence is the ISB one once renamed into the study frames.
pub fn is_sequence_isb_adapted(record: &StudyRecord) -> bool {
    let (Some(declared), Some(parent), Some(child)) = (
        record.joint.euler_sequence(),
        record.parent_definition(),
        record.child_definition(),
    ) else {
        return false;
    };
    adapted_isb_sequence(record.joint.joint_type(), &parent.frame, &child.frame) == Some(declared)
}

/// Whether the declared sequence has the same kind, proper or Tait-Bryan, as the ISB one.
pub fn is_sequence_isb_kind(record: &StudyRecord) -> bool {
    record
        .joint
        .euler_sequence()
        .is_some_and(|declared| declared.is_proper() == record.joint.isb_sequence().is_proper())
}

/// Confidence of a validated record.
pub fn score(record: &StudyRecord, verdict: &Verdict, config: &ConfidenceConfig) -> f64 {
    if !is_sequence_isb_adapted(record) {
        debug!(
            "row {}: declared sequence {:?} is not the ISB one in the study's axis names",
            record.index,
            record.joint.euler_sequence()
        );
    }
    let sequence_factor = if is_sequence_isb_kind(record) {
        1.0
    } else {
        config.non_isb_sequence.min(1.0)
    };
    risk_factor(verdict.parent_risk, config) * risk_factor(verdict.child_risk, config) * sequence_factor
}
