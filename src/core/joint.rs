//! Joint description: which segments it links and how its motion was reported.

use super::enums::{EulerSequence, JointType, Origin, Segment};
use super::error::{RecordError, Result};

/// Where a study measured joint translation from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationReference {
    pub origin: Origin,
    /// Segment whose frame the displacement is expressed in.
    pub frame: Segment,
}

/// A joint as reported by one study.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointDescriptor {
    joint_type: JointType,
    euler_sequence: Option<EulerSequence>,
    translation: Option<TranslationReference>,
}

impl JointDescriptor {
    /// # Errors
    ///
    /// `MissingJointData` when neither a rotation sequence nor a translation
    /// reference is given.
    pub fn new(
        joint_type: JointType,
        euler_sequence: Option<EulerSequence>,
        translation: Option<TranslationReference>,
    ) -> Result<Self> {
        if euler_sequence.is_none() && translation.is_none() {
            return Err(RecordError::MissingJointData { joint: joint_type });
        }
        Ok(Self {
            joint_type,
            euler_sequence,
            translation,
        })
    }

    #[inline]
    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    #[inline]
    pub fn euler_sequence(&self) -> Option<EulerSequence> {
        self.euler_sequence
    }

    #[inline]
    pub fn translation(&self) -> Option<TranslationReference> {
        self.translation
    }

    pub fn isb_sequence(&self) -> EulerSequence {
        self.joint_type.isb_sequence()
    }

    pub fn isb_dof_labels(&self) -> [&'static str; 3] {
        self.joint_type.isb_dof_labels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_needs_rotation_or_translation() {
        let err = JointDescriptor::new(JointType::Sternoclavicular, None, None).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingJointData {
                joint: JointType::Sternoclavicular
            }
        );

        let rotation_only =
            JointDescriptor::new(JointType::Glenohumeral, Some(EulerSequence::Xzy), None).unwrap();
        assert_eq!(rotation_only.isb_sequence(), EulerSequence::Yxy);
        assert_eq!(rotation_only.isb_dof_labels()[1], "elevation");

        let translation_only = JointDescriptor::new(
            JointType::Glenohumeral,
            None,
            Some(TranslationReference {
                origin: Origin::Gc,
                frame: Segment::Scapula,
            }),
        )
        .unwrap();
        assert!(translation_only.euler_sequence().is_none());
    }
}
