//! Chain of transforms turning a study's Euler angles into ISB angles.
//!
//! Stages, in order:
//! 1. rebuild the joint rotation from the study's angles and sequence
//! 2. express it between the ISB-oriented parent and child frames
//! 3. mirror left-side data onto the right side
//! 4. apply the fixed parent and child corrections
//! 5. extract angles in the joint's ISB sequence

use nalgebra::Matrix3;

use crate::config::ExtractionConfig;
use crate::core::corrections;
use crate::core::enums::{Correction, EulerSequence, Side};
use crate::core::error::{RecordError, Result};
use crate::core::frame::AnatomicalFrame;
use crate::core::transforms::{euler_to_matrix, matrix_to_euler, unwrap_angles};

use super::record::StudyRecord;

/// Reflection through the sagittal plane.
fn mirror() -> Matrix3<f64> {
    Matrix3::from_diagonal(&nalgebra::Vector3::new(1.0, 1.0, -1.0))
}

/// Transform from one study's Euler angles to ISB angles, radians in and out.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionPipeline {
    source_sequence: EulerSequence,
    target_sequence: EulerSequence,
    parent_frame: Matrix3<f64>,
    child_frame: Matrix3<f64>,
    side: Side,
    parent_correction: Matrix3<f64>,
    child_correction: Matrix3<f64>,
    singularity_tolerance: f64,
    /// Unwrap threshold in radians; `None` disables unwrapping.
    unwrap_discontinuity: Option<f64>,
}

impl CorrectionPipeline {
    /// Pipeline with no side flip, no corrections and default extraction settings.
    pub fn new(
        source_sequence: EulerSequence,
        target_sequence: EulerSequence,
        parent: &AnatomicalFrame,
        child: &AnatomicalFrame,
    ) -> Self {
        Self {
            source_sequence,
            target_sequence,
            parent_frame: parent.rotation_matrix(),
            child_frame: child.rotation_matrix(),
            side: Side::Right,
            parent_correction: Matrix3::identity(),
            child_correction: Matrix3::identity(),
            singularity_tolerance: 0.0,
            unwrap_discontinuity: None,
        }
        .with_extraction(&ExtractionConfig::default())
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_corrections(mut self, parent: &[Correction], child: &[Correction]) -> Self {
        self.parent_correction = corrections::compose(parent);
        self.child_correction = corrections::compose(child);
        self
    }

    pub fn with_extraction(mut self, config: &ExtractionConfig) -> Self {
        self.singularity_tolerance = config.singularity_tolerance;
        self.unwrap_discontinuity = config
            .unwrap
            .then(|| config.unwrap_discontinuity_deg.to_radians());
        self
    }

    /// Pipeline for a validated record.
    ///
    /// # Errors
    ///
    /// `MissingJointData` if the record has no Euler sequence, and
    /// `MissingSegmentDefinition` if a joint segment is not defined.
    pub fn for_record(record: &StudyRecord, config: &ExtractionConfig) -> Result<Self> {
        let source = record
            .joint
            .euler_sequence()
            .ok_or(RecordError::MissingJointData {
                joint: record.joint.joint_type(),
            })?;
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

        Ok(Self::new(source, record.joint.isb_sequence(), &parent.frame, &child.frame)
            .with_side(record.side)
            .with_corrections(&parent.corrections, &child.corrections)
            .with_extraction(config))
    }

    #[inline]
    pub fn source_sequence(&self) -> EulerSequence {
        self.source_sequence
    }

    #[inline]
    pub fn target_sequence(&self) -> EulerSequence {
        self.target_sequence
    }

    pub fn reconstruct(&self, angles: [f64; 3]) -> Matrix3<f64> {
        euler_to_matrix(self.source_sequence, angles)
    }

    /// Re-expresses a parent→child rotation from the study frames in the ISB-oriented ones.
    pub fn reframe(&self, rotation: &Matrix3<f64>) -> Matrix3<f64> {
        self.parent_frame * rotation * self.child_frame.transpose()
    }

    pub fn fix_handedness(&self, rotation: &Matrix3<f64>) -> Matrix3<f64> {
        match self.side {
            Side::Right => *rotation,
            Side::Left => {
                let m = mirror();
                m * rotation * m
            }
        }
    }

    pub fn apply_corrections(&self, rotation: &Matrix3<f64>) -> Matrix3<f64> {
        self.parent_correction * rotation * self.child_correction
    }

    /// # Errors
    ///
    /// `DegenerateExtraction` near gimbal lock.
    pub fn extract(&self, rotation: &Matrix3<f64>) -> Result<[f64; 3]> {
        matrix_to_euler(rotation, self.target_sequence, self.singularity_tolerance)
    }

    /// Runs every stage on one sample. A NaN in any input yields NaN outputs.
    pub fn apply(&self, angles: [f64; 3]) -> Result<[f64; 3]> {
        if angles.iter().any(|a| a.is_nan()) {
            return Ok([f64::NAN; 3]);
        }
        let r = self.reconstruct(angles);
        let r = self.reframe(&r);
        let r = self.fix_handedness(&r);
        let r = self.apply_corrections(&r);
        self.extract(&r)
    }

    /// Runs `apply` on every sample, then unwraps each output channel.
    ///
    /// # Errors
    ///
    /// The first `DegenerateExtraction`; the series is then discarded whole.
    pub fn apply_series(&self, samples: &[[f64; 3]]) -> Result<Vec<[f64; 3]>> {
        let mut out = samples
            .iter()
            .map(|s| self.apply(*s))
            .collect::<Result<Vec<_>>>()?;

        if let Some(discontinuity) = self.unwrap_discontinuity {
            for dof in 0..3 {
                let mut channel: Vec<f64> = out.iter().map(|s| s[dof]).collect();
                unwrap_angles(&mut channel, discontinuity);
                for (sample, value) in out.iter_mut().zip(channel) {
                    sample[dof] = value;
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enums::Segment;
    use approx::assert_relative_eq;

    fn frame(segment: Segment, axes: [&str; 3], origin: &str) -> AnatomicalFrame {
        AnatomicalFrame::from_labels(segment, axes[0], axes[1], axes[2], origin).unwrap()
    }

    fn isb(segment: Segment, origin: &str) -> AnatomicalFrame {
        frame(segment, ["+PA", "+IS", "+ML"], origin)
    }

    #[test]
    fn test_isb_input_is_unchanged() {
        let p = CorrectionPipeline::new(
            EulerSequence::Yxz,
            EulerSequence::Yxz,
            &isb(Segment::Thorax, "IJ"),
            &isb(Segment::Scapula, "AA"),
        );
        let angles = [0.4, -0.2, 0.1];
        let out = p.apply(angles).unwrap();
        for d in 0..3 {
            assert_relative_eq!(out[d], angles[d], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reframe_undoes_relabelled_axes() {
        // Same physical frames, labelled x=ML, y=PA, z=IS.
        let thorax = frame(Segment::Thorax, ["+ML", "+PA", "+IS"], "IJ");
        let humerus = frame(Segment::Humerus, ["+ML", "+PA", "+IS"], "GH");
        // In those labels the ISB yxy rotation reads as zyz.
        let p = CorrectionPipeline::new(EulerSequence::Zyz, EulerSequence::Yxy, &thorax, &humerus);
        let angles = [0.3, 0.8, -0.4];
        let out = p.apply(angles).unwrap();
        for d in 0..3 {
            assert_relative_eq!(out[d], angles[d], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_left_side_negates_first_two_yxz_channels() {
        let thorax = isb(Segment::Thorax, "IJ");
        let scapula = isb(Segment::Scapula, "AA");
        let right = CorrectionPipeline::new(EulerSequence::Yxz, EulerSequence::Yxz, &thorax, &scapula);
        let left = right.clone().with_side(Side::Left);

        let angles = [0.5, 0.2, -0.3];
        let r = right.apply(angles).unwrap();
        let l = left.apply(angles).unwrap();
        assert_relative_eq!(l[0], -r[0], epsilon = 1e-12);
        assert_relative_eq!(l[1], -r[1], epsilon = 1e-12);
        assert_relative_eq!(l[2], r[2], epsilon = 1e-12);
    }

    #[test]
    fn test_corrections_compose_around_rotation() {
        let thorax = isb(Segment::Thorax, "IJ");
        let scapula = isb(Segment::Scapula, "GC");
        let p = CorrectionPipeline::new(EulerSequence::Yxz, EulerSequence::Yxz, &thorax, &scapula)
            .with_corrections(&[], &[Correction::ScapulaKolzGlenoidToPaRotation]);

        let angles = [0.1, 0.2, 0.3];
        let expected = euler_to_matrix(EulerSequence::Yxz, angles)
            * corrections::matrix(Correction::ScapulaKolzGlenoidToPaRotation);
        let out = p.apply(angles).unwrap();
        assert_relative_eq!(euler_to_matrix(EulerSequence::Yxz, out), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_nan_passes_through() {
        let p = CorrectionPipeline::new(
            EulerSequence::Yxy,
            EulerSequence::Yxy,
            &isb(Segment::Scapula, "AA"),
            &isb(Segment::Humerus, "GH"),
        );
        let out = p.apply([0.1, f64::NAN, 0.2]).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_degenerate_sample_fails_series() {
        let p = CorrectionPipeline::new(
            EulerSequence::Yxy,
            EulerSequence::Yxy,
            &isb(Segment::Scapula, "AA"),
            &isb(Segment::Humerus, "GH"),
        );
        let samples = [[0.1, 0.5, 0.2], [0.1, 0.0, 0.2]];
        assert!(matches!(
            p.apply_series(&samples),
            Err(RecordError::DegenerateExtraction { .. })
        ));
    }

    #[test]
    fn test_series_is_unwrapped() {
        let p = CorrectionPipeline::new(
            EulerSequence::Yxz,
            EulerSequence::Yxz,
            &isb(Segment::Thorax, "IJ"),
            &isb(Segment::Scapula, "AA"),
        );
        let deg = |d: f64| d.to_radians();
        let samples = [[deg(175.0), 0.1, 0.0], [deg(-175.0), 0.1, 0.0]];
        let out = p.apply_series(&samples).unwrap();
        assert_relative_eq!(out[1][0].to_degrees(), 185.0, epsilon = 1e-6);

        let raw = p
            .with_extraction(&ExtractionConfig {
                unwrap: false,
                ..ExtractionConfig::default()
            })
            .apply_series(&samples)
            .unwrap();
        assert_relative_eq!(raw[1][0].to_degrees(), -175.0, epsilon = 1e-6);
    }
}
