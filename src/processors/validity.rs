//! Acceptance rules for a study record.
//!
//! Every segment gets a risk classification from how far its declared frame is
//! from the ISB one, and the declared corrections are checked for consistency
//! with that classification.

use log::{debug, warn};

use crate::config::ValidationConfig;
use crate::core::enums::{Correction, Segment, TriState};
use crate::core::error::{RecordError, Result};

use super::record::{SegmentDefinition, StudyRecord};

/// How a segment frame deviates from the ISB recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentRisk {
    /// ISB-oriented with an origin on an ISB axis.
    #[default]
    Compliant,
    /// ISB-oriented, origin off the ISB axes; not considered risky outside the scapula.
    OriginOffset,
    ScapulaOriginOffset,
    /// Origin on an ISB axis but the axes are permuted or flipped.
    Reoriented,
    ScapulaNonIsb,
    NonIsb,
    /// Thorax taken as the global frame.
    GlobalThorax,
}

impl SegmentRisk {
    /// Whether the classification lowers trust in the data.
    pub fn is_flagged(&self) -> bool {
        !matches!(self, SegmentRisk::Compliant | SegmentRisk::OriginOffset)
    }
}

/// Outcome of the acceptance rules for one record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Verdict {
    pub usable_rotation: bool,
    pub usable_translation: bool,
    pub parent_risk: SegmentRisk,
    pub child_risk: SegmentRisk,
}

fn inconsistent(segment: Segment, reason: impl Into<String>) -> RecordError {
    RecordError::InconsistentCorrection {
        segment,
        reason: reason.into(),
    }
}

fn has_kolz(corrections: &[Correction]) -> bool {
    corrections.iter().any(Correction::is_kolz)
}

fn has_to_isb(corrections: &[Correction]) -> bool {
    corrections.iter().any(Correction::is_to_isb)
}

/// Kolz corrections only exist for the scapula, whatever rules the segment follows.
fn check_kolz_placement(definition: &SegmentDefinition) -> Result<()> {
    let segment = definition.segment();
    if segment != Segment::Scapula && has_kolz(&definition.corrections) {
        return Err(inconsistent(segment, "Kolz corrections only apply to the scapula"));
    }
    Ok(())
}

/// Classifies one segment and checks its declared corrections.
///
/// # Errors
///
/// `InconsistentCorrection` when a correction is declared where none may be,
/// or, under strict rules, is missing where the literature requires one.
pub fn check_segment(
    definition: &SegmentDefinition,
    config: &ValidationConfig,
) -> Result<SegmentRisk> {
    let segment = definition.segment();
    let frame = &definition.frame;
    let corrections = definition.corrections.as_slice();
    let is_scapula = segment == Segment::Scapula;

    if definition.declared_isb != TriState::Unknown && definition.declared_isb.is_true() != frame.is_isb() {
        warn!(
            "{} frame declared is_isb={} but axes ({}, {}, {}) at {:?} say otherwise",
            segment,
            definition.declared_isb.is_true(),
            frame.axes()[0],
            frame.axes()[1],
            frame.axes()[2],
            frame.origin()
        );
    }

    check_kolz_placement(definition)?;

    let risk = match (frame.is_isb_oriented(), frame.is_origin_on_an_isb_axis()) {
        (true, true) => {
            if !corrections.is_empty() {
                return Err(inconsistent(
                    segment,
                    "frame already follows the ISB, no correction may be declared",
                ));
            }
            SegmentRisk::Compliant
        }
        (true, false) if is_scapula => {
            if !has_kolz(corrections) {
                if config.strict_literature_rules {
                    return Err(inconsistent(
                        segment,
                        "off-axis scapula origin requires a Kolz correction",
                    ));
                }
                debug!("scapula origin {:?} is off the ISB axes without a Kolz correction", frame.origin());
            }
            SegmentRisk::ScapulaOriginOffset
        }
        (true, false) => SegmentRisk::OriginOffset,
        (false, true) => {
            if !has_to_isb(corrections) {
                if config.strict_literature_rules {
                    return Err(inconsistent(
                        segment,
                        "reoriented frame requires a to_isb or to_isb_like correction",
                    ));
                }
                debug!("{} frame is not ISB-oriented and declares no to-ISB correction", segment);
            }
            SegmentRisk::Reoriented
        }
        (false, false) if is_scapula => {
            if !has_kolz(corrections) {
                if config.strict_literature_rules {
                    return Err(inconsistent(
                        segment,
                        "non-ISB scapula requires a Kolz correction",
                    ));
                }
                debug!("non-ISB scapula declares no Kolz correction");
            }
            SegmentRisk::ScapulaNonIsb
        }
        (false, false) => SegmentRisk::NonIsb,
    };
    Ok(risk)
}

/// Rules for a thorax used as the global frame; they replace the orientation rules.
fn check_global_thorax(definition: &SegmentDefinition) -> Result<SegmentRisk> {
    check_kolz_placement(definition)?;
    let corrections = definition.corrections.as_slice();
    match definition.is_correctable {
        TriState::True => {
            if !corrections.contains(&Correction::ToIsbLikeRotation) {
                return Err(inconsistent(
                    Segment::Thorax,
                    "correctable global thorax requires a to_isb_like correction",
                ));
            }
        }
        TriState::False => {
            if !corrections.is_empty() {
                return Err(inconsistent(
                    Segment::Thorax,
                    "non-correctable global thorax cannot declare a correction",
                ));
            }
        }
        TriState::Unknown => {
            warn!("global thorax frame without an is_correctable flag, kept as is");
        }
    }
    Ok(SegmentRisk::GlobalThorax)
}

/// Runs every acceptance rule on a parsed record.
///
/// # Errors
///
/// `JointSegmentMismatch`, `MissingSegmentDefinition` or `InconsistentCorrection`.
pub fn check_record(record: &StudyRecord, config: &ValidationConfig) -> Result<Verdict> {
    let joint_type = record.joint.joint_type();
    if joint_type.parent() != record.parent || joint_type.child() != record.child {
        return Err(RecordError::JointSegmentMismatch {
            joint: joint_type,
            expected_parent: joint_type.parent(),
            expected_child: joint_type.child(),
            parent: record.parent,
            child: record.child,
        });
    }

    let parent = record
        .parent_definition()
        .ok_or(RecordError::MissingSegmentDefinition {
            segment: record.parent,
        })?;
    let child = record
        .child_definition()
        .ok_or(RecordError::MissingSegmentDefinition {
            segment: record.child,
        })?;

    let parent_risk = if record.parent == Segment::Thorax && record.thorax_is_global.is_true() {
        check_global_thorax(parent)?
    } else {
        check_segment(parent, config)?
    };
    let child_risk = check_segment(child, config)?;

    Ok(Verdict {
        usable_rotation: record.joint.euler_sequence().is_some(),
        // Displacements are never trusted: their origins are too rarely comparable.
        usable_translation: false,
        parent_risk,
        child_risk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::AnatomicalFrame;
    use crate::processors::record::fixtures::isb_scapulothoracic_row;

    fn definition(
        segment: Segment,
        axes: [&str; 3],
        origin: &str,
        corrections: &[Correction],
    ) -> SegmentDefinition {
        SegmentDefinition {
            frame: AnatomicalFrame::from_labels(segment, axes[0], axes[1], axes[2], origin).unwrap(),
            corrections: corrections.to_vec(),
            is_correctable: TriState::Unknown,
            declared_isb: TriState::Unknown,
        }
    }

    const LENIENT: ValidationConfig = ValidationConfig {
        strict_literature_rules: false,
    };
    const STRICT: ValidationConfig = ValidationConfig {
        strict_literature_rules: true,
    };

    #[test]
    fn test_isb_segment_is_compliant() {
        let def = definition(Segment::Humerus, ["+PA", "+IS", "+ML"], "GH", &[]);
        assert_eq!(check_segment(&def, &LENIENT).unwrap(), SegmentRisk::Compliant);
    }

    #[test]
    fn test_isb_segment_rejects_corrections() {
        let def = definition(
            Segment::Humerus,
            ["+PA", "+IS", "+ML"],
            "GH",
            &[Correction::ToIsbRotation],
        );
        assert!(matches!(
            check_segment(&def, &LENIENT),
            Err(RecordError::InconsistentCorrection { .. })
        ));
    }

    #[test]
    fn test_origin_offset_flagged_only_for_scapula() {
        let humerus = definition(Segment::Humerus, ["+PA", "+IS", "+ML"], "EL", &[]);
        let risk = check_segment(&humerus, &LENIENT).unwrap();
        assert_eq!(risk, SegmentRisk::OriginOffset);
        assert!(!risk.is_flagged());

        let scapula = definition(Segment::Scapula, ["+PA", "+IS", "+ML"], "GC", &[]);
        let risk = check_segment(&scapula, &LENIENT).unwrap();
        assert_eq!(risk, SegmentRisk::ScapulaOriginOffset);
        assert!(risk.is_flagged());
    }

    #[test]
    fn test_strict_rules_require_literature_corrections() {
        let scapula = definition(Segment::Scapula, ["+PA", "+IS", "+ML"], "GC", &[]);
        assert!(check_segment(&scapula, &STRICT).is_err());

        let corrected = definition(
            Segment::Scapula,
            ["+PA", "+IS", "+ML"],
            "GC",
            &[Correction::ScapulaKolzGlenoidToPaRotation],
        );
        assert_eq!(
            check_segment(&corrected, &STRICT).unwrap(),
            SegmentRisk::ScapulaOriginOffset
        );

        let reoriented = definition(Segment::Humerus, ["+ML", "+PA", "+IS"], "GH", &[]);
        assert_eq!(check_segment(&reoriented, &LENIENT).unwrap(), SegmentRisk::Reoriented);
        assert!(check_segment(&reoriented, &STRICT).is_err());
    }

    #[test]
    fn test_kolz_outside_scapula_is_inconsistent() {
        let def = definition(
            Segment::Clavicle,
            ["+ML", "+PA", "+IS"],
            "MidpointScAc",
            &[Correction::ScapulaKolzAcToPaRotation],
        );
        assert!(matches!(
            check_segment(&def, &LENIENT),
            Err(RecordError::InconsistentCorrection {
                segment: Segment::Clavicle,
                ..
            })
        ));
    }

    #[test]
    fn test_non_isb_segments() {
        let scapula = definition(Segment::Scapula, ["+ML", "+PA", "+IS"], "GC", &[]);
        assert_eq!(check_segment(&scapula, &LENIENT).unwrap(), SegmentRisk::ScapulaNonIsb);

        let thorax = definition(Segment::Thorax, ["+ML", "+PA", "+IS"], "PX", &[]);
        assert_eq!(check_segment(&thorax, &LENIENT).unwrap(), SegmentRisk::NonIsb);
    }

    #[test]
    fn test_global_thorax_override() {
        let mut row = isb_scapulothoracic_row();
        row.set("thorax_is_global", "true");
        row.set("thorax_is_correctable", "true");
        row.set("thorax_correction_method", "");
        let record = StudyRecord::from_row(0, &row).unwrap();
        assert!(check_record(&record, &LENIENT).is_err());

        row.set("thorax_correction_method", "to_isb_like");
        let record = StudyRecord::from_row(0, &row).unwrap();
        let verdict = check_record(&record, &LENIENT).unwrap();
        assert_eq!(verdict.parent_risk, SegmentRisk::GlobalThorax);

        row.set("thorax_is_correctable", "false");
        let record = StudyRecord::from_row(0, &row).unwrap();
        assert!(check_record(&record, &LENIENT).is_err());

        row.set("thorax_is_correctable", "");
        let record = StudyRecord::from_row(0, &row).unwrap();
        assert!(check_record(&record, &LENIENT).unwrap().usable_rotation);
    }

    #[test]
    fn test_global_thorax_rejects_kolz_correction() {
        let mut row = isb_scapulothoracic_row();
        row.set("thorax_is_global", "true");
        row.set("thorax_is_correctable", "true");
        row.set("thorax_correction_method", "to_isb_like, kolz_AC_to_PA");
        let record = StudyRecord::from_row(0, &row).unwrap();
        assert!(matches!(
            check_record(&record, &LENIENT),
            Err(RecordError::InconsistentCorrection {
                segment: Segment::Thorax,
                ..
            })
        ));
    }

    #[test]
    fn test_joint_segment_mismatch() {
        let mut row = isb_scapulothoracic_row();
        row.set("parent", "clavicle");
        let record = StudyRecord::from_row(0, &row).unwrap();
        assert!(matches!(
            check_record(&record, &LENIENT),
            Err(RecordError::JointSegmentMismatch {
                expected_parent: Segment::Thorax,
                parent: Segment::Clavicle,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_segment_definition() {
        let mut row = isb_scapulothoracic_row();
        for column in ["scapula_x", "scapula_y", "scapula_z", "scapula_origin"] {
            row.set(column, "");
        }
        let record = StudyRecord::from_row(0, &row).unwrap();
        assert_eq!(
            check_record(&record, &LENIENT).unwrap_err(),
            RecordError::MissingSegmentDefinition {
                segment: Segment::Scapula
            }
        );
    }

    #[test]
    fn test_verdict_for_clean_record() {
        let record = StudyRecord::from_row(0, &isb_scapulothoracic_row()).unwrap();
        let verdict = check_record(&record, &LENIENT).unwrap();
        assert!(verdict.usable_rotation);
        assert!(!verdict.usable_translation);
        assert_eq!(verdict.parent_risk, SegmentRisk::Compliant);
        assert_eq!(verdict.child_risk, SegmentRisk::Compliant);
    }
}
