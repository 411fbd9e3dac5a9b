//! Rotation math shared by the correction pipeline.
//!
//! Euler angles are intrinsic: `R = R_a(θ1) · R_b(θ2) · R_c(θ3)` for a sequence
//! `abc`. All angles are radians.

use std::f64::consts::TAU;

use nalgebra::{Matrix3, Rotation3, Unit};

use super::enums::{Axis, EulerSequence};
use super::error::{RecordError, Result};

/// Rotation of `angle` radians about one of the frame axes.
#[inline]
pub fn elemental_rotation(axis: Axis, angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Unit::new_unchecked(axis.unit()), angle).into_inner()
}

/// Rebuilds a rotation matrix from three intrinsic Euler angles.
///
/// # Example
///
/// ```
/// use shoulder_kinematics::core::enums::EulerSequence;
/// use shoulder_kinematics::core::transforms::euler_to_matrix;
///
/// let r = euler_to_matrix(EulerSequence::Yxz, [0.0, 0.0, 0.0]);
/// assert_eq!(r, nalgebra::Matrix3::identity());
/// ```
pub fn euler_to_matrix(sequence: EulerSequence, angles: [f64; 3]) -> Matrix3<f64> {
    let [a, b, c] = sequence.axes();
    elemental_rotation(a, angles[0]) * elemental_rotation(b, angles[1]) * elemental_rotation(c, angles[2])
}

/// +1 when the first two axes of the sequence follow x→y→z cyclically.
#[inline]
fn parity(i: usize, j: usize) -> f64 {
    if (i + 1) % 3 == j {
        1.0
    } else {
        -1.0
    }
}

/// Decomposes a rotation matrix into intrinsic Euler angles.
///
/// The middle angle lies in `[-π/2, π/2]` for Tait–Bryan sequences and in
/// `[0, π]` for proper ones; the outer angles lie in `(-π, π]`.
///
/// # Errors
///
/// `DegenerateExtraction` when the configuration is within `tolerance` of
/// gimbal lock: `|cos θ2|` for Tait–Bryan sequences, `|sin θ2|` for proper ones.
pub fn matrix_to_euler(
    matrix: &Matrix3<f64>,
    sequence: EulerSequence,
    tolerance: f64,
) -> Result<[f64; 3]> {
    let [a, b, _] = sequence.axes();
    let (i, j) = (a.index(), b.index());
    let k = 3 - i - j;
    let s = parity(i, j);
    let r = |row: usize, col: usize| matrix[(row, col)];

    if sequence.is_proper() {
        let sin_b = r(i, j).hypot(r(i, k));
        let theta2 = sin_b.atan2(r(i, i));
        if sin_b < tolerance {
            return Err(RecordError::DegenerateExtraction {
                sequence,
                middle_angle_deg: theta2.to_degrees(),
            });
        }
        let theta1 = r(j, i).atan2(-s * r(k, i));
        let theta3 = r(i, j).atan2(s * r(i, k));
        Ok([theta1, theta2, theta3])
    } else {
        let cos_b = r(i, i).hypot(r(i, j));
        let theta2 = (s * r(i, k)).atan2(cos_b);
        if cos_b < tolerance {
            return Err(RecordError::DegenerateExtraction {
                sequence,
                middle_angle_deg: theta2.to_degrees(),
            });
        }
        let theta1 = (-s * r(j, k)).atan2(r(k, k));
        let theta3 = (-s * r(i, j)).atan2(r(i, i));
        Ok([theta1, theta2, theta3])
    }
}

/// Removes jumps larger than `discontinuity` radians by shifting the rest of
/// the channel by whole turns.
///
/// NaN samples are left in place and do not reset the reference value.
pub fn unwrap_angles(values: &mut [f64], discontinuity: f64) {
    let mut previous_raw: Option<f64> = None;
    let mut offset = 0.0;

    for value in values.iter_mut() {
        if value.is_nan() {
            continue;
        }
        let raw = *value;
        if let Some(prev) = previous_raw {
            let delta = raw - prev;
            if delta.abs() > discontinuity {
                offset -= (delta / TAU).round() * TAU;
            }
        }
        previous_raw = Some(raw);
        *value = raw + offset;
    }
}
