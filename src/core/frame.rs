//! Anatomical coordinate systems described by axis labels.
//!
//! A study declares each segment frame as three anatomical directions plus an
//! origin landmark. The frame is only accepted when the labels assemble into a
//! direct (right-handed) orthonormal basis.

use nalgebra::Matrix3;

use super::enums::{Axis, Direction, Origin, Segment};
use super::error::{RecordError, Result};

/// Tolerance on the determinant of a label-built basis.
const DETERMINANT_TOLERANCE: f64 = 1e-9;

/// Segment frame declared by a study.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnatomicalFrame {
    segment: Segment,
    axes: [Direction; 3],
    origin: Origin,
}

impl AnatomicalFrame {
    /// Builds a frame from its x, y, z directions and origin.
    ///
    /// # Errors
    ///
    /// `InvalidFrame` if two axes are collinear or the basis is left-handed.
    pub fn from_axis_labels(
        segment: Segment,
        x: Direction,
        y: Direction,
        z: Direction,
        origin: Origin,
    ) -> Result<Self> {
        let axes = [x, y, z];
        for i in 0..3 {
            for j in (i + 1)..3 {
                if axes[i].isb_axis() == axes[j].isb_axis() {
                    return Err(RecordError::InvalidFrame {
                        segment,
                        reason: format!(
                            "axes {} ({}) and {} ({}) are not orthogonal",
                            Axis::from_index(i).letter(),
                            axes[i],
                            Axis::from_index(j).letter(),
                            axes[j]
                        ),
                    });
                }
            }
        }

        let frame = Self {
            segment,
            axes,
            origin,
        };
        let det = frame.rotation_matrix().determinant();
        if (det - 1.0).abs() > DETERMINANT_TOLERANCE {
            return Err(RecordError::InvalidFrame {
                segment,
                reason: format!("axes ({}, {}, {}) form an indirect frame", x, y, z),
            });
        }
        Ok(frame)
    }

    /// Parses the four raw cells of a segment definition, then builds the frame.
    pub fn from_labels(segment: Segment, x: &str, y: &str, z: &str, origin: &str) -> Result<Self> {
        Self::from_axis_labels(
            segment,
            Direction::parse(x)?,
            Direction::parse(y)?,
            Direction::parse(z)?,
            Origin::parse(segment, origin)?,
        )
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    #[inline]
    pub fn axes(&self) -> [Direction; 3] {
        self.axes
    }

    /// Matrix whose columns are the frame's x, y, z axes expressed in the ISB basis.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[
            self.axes[0].unit_vector(),
            self.axes[1].unit_vector(),
            self.axes[2].unit_vector(),
        ])
    }

    /// Determinant of the label basis is +1.
    pub fn is_direct(&self) -> bool {
        (self.rotation_matrix().determinant() - 1.0).abs() <= DETERMINANT_TOLERANCE
    }

    /// x lies along antero-posterior, y along infero-superior, z along medio-lateral,
    /// each possibly flipped.
    pub fn is_isb_oriented(&self) -> bool {
        self.axes[0].isb_axis() == Axis::X
            && self.axes[1].isb_axis() == Axis::Y
            && self.axes[2].isb_axis() == Axis::Z
    }

    /// The origin is one of the landmarks lying on an ISB axis of the segment.
    pub fn is_origin_on_an_isb_axis(&self) -> bool {
        self.segment.isb_axis_origins().contains(&self.origin)
    }

    /// Strict ISB frame: +PA, +IS, +ML with an on-axis origin.
    pub fn is_isb(&self) -> bool {
        self.axes
            == [
                Direction::PlusPosteroAnterior,
                Direction::PlusInferoSuperior,
                Direction::PlusMedioLateral,
            ]
            && self.is_origin_on_an_isb_axis()
    }

    /// Which of this frame's axes is collinear with the given ISB axis.
    pub fn axis_along(&self, isb_axis: Axis) -> Axis {
        let idx = self
            .axes
            .iter()
            .position(|d| d.isb_axis() == isb_axis)
            .unwrap_or(isb_axis.index());
        Axis::from_index(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL_DIRECTIONS: [Direction; 6] = [
        Direction::PlusPosteroAnterior,
        Direction::MinusPosteroAnterior,
        Direction::PlusInferoSuperior,
        Direction::MinusInferoSuperior,
        Direction::PlusMedioLateral,
        Direction::MinusMedioLateral,
    ];

    fn isb_thorax() -> AnatomicalFrame {
        AnatomicalFrame::from_labels(Segment::Thorax, "+PA", "+IS", "+ML", "IJ").unwrap()
    }

    #[test]
    fn test_isb_frame_is_identity() {
        let frame = isb_thorax();
        assert_eq!(frame.rotation_matrix(), Matrix3::identity());
        assert!(frame.is_isb_oriented());
        assert!(frame.is_origin_on_an_isb_axis());
        assert!(frame.is_isb());
    }

    #[test]
    fn test_every_valid_frame_is_orthonormal_and_direct() {
        let mut valid = 0;
        for &x in &ALL_DIRECTIONS {
            for &y in &ALL_DIRECTIONS {
                for &z in &ALL_DIRECTIONS {
                    if let Ok(frame) =
                        AnatomicalFrame::from_axis_labels(Segment::Humerus, x, y, z, Origin::Gh)
                    {
                        let m = frame.rotation_matrix();
                        assert_relative_eq!(m.transpose() * m, Matrix3::identity(), epsilon = 1e-12);
                        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-12);
                        assert!(frame.is_direct());
                        valid += 1;
                    }
                }
            }
        }
        // Signed permutation matrices with determinant +1.
        assert_eq!(valid, 24);
    }

    #[test]
    fn test_non_orthogonal_axes_rejected() {
        let err = AnatomicalFrame::from_labels(Segment::Scapula, "+PA", "-PA", "+ML", "AA")
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidFrame { segment: Segment::Scapula, .. }));
    }

    #[test]
    fn test_left_handed_frame_rejected() {
        let err = AnatomicalFrame::from_labels(Segment::Scapula, "+PA", "+IS", "-ML", "AA")
            .unwrap_err();
        match err {
            RecordError::InvalidFrame { reason, .. } => assert!(reason.contains("indirect")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_flipped_isb_axes_still_isb_oriented() {
        // 180 degrees about the medio-lateral axis.
        let frame =
            AnatomicalFrame::from_labels(Segment::Scapula, "-PA", "-IS", "+ML", "GC").unwrap();
        assert!(frame.is_isb_oriented());
        assert!(!frame.is_origin_on_an_isb_axis());
        assert!(!frame.is_isb());
    }

    #[test]
    fn test_permuted_frame_is_not_isb_oriented() {
        let frame =
            AnatomicalFrame::from_labels(Segment::Humerus, "+ML", "+PA", "+IS", "GH").unwrap();
        assert!(!frame.is_isb_oriented());
        assert!(frame.is_origin_on_an_isb_axis());

        // Columns are the study axes expressed in the ISB basis.
        let m = frame.rotation_matrix();
        assert_eq!(m.column(0).into_owned(), Direction::PlusMedioLateral.unit_vector());
        assert_eq!(m.column(1).into_owned(), Direction::PlusPosteroAnterior.unit_vector());

        assert_eq!(frame.axis_along(Axis::Z), Axis::X);
        assert_eq!(frame.axis_along(Axis::X), Axis::Y);
        assert_eq!(frame.axis_along(Axis::Y), Axis::Z);
    }

    #[test]
    fn test_unknown_labels_rejected() {
        assert!(matches!(
            AnatomicalFrame::from_labels(Segment::Thorax, "+PA", "+IS", "+ML", "GH"),
            Err(RecordError::UnknownEnumerationValue { kind: "origin", .. })
        ));
        assert!(matches!(
            AnatomicalFrame::from_labels(Segment::Thorax, "+PA", "+XX", "+ML", "IJ"),
            Err(RecordError::UnknownEnumerationValue { .. })
        ));
    }
}
