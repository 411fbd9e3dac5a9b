//! Fixed correction matrices applied after a frame has been re-expressed in
//! the ISB basis.
//!
//! `to_isb` and `to_isb_like` are fully handled by the frame rebuild, so they
//! contribute the identity. The two Kolz matrices map an acromion-based or a
//! glenoid-based scapular frame onto the ISB scapular frame (Kolz et al. 2020);
//! they are stored as `yxz` angles so that every catalogue entry is orthonormal
//! by construction.

use nalgebra::Matrix3;

use super::enums::{Correction, EulerSequence};
use super::transforms::euler_to_matrix;

/// `yxz` angles, in degrees, of the AC-based → ISB scapula rotation.
const KOLZ_AC_TO_PA_YXZ_DEG: [f64; 3] = [-4.9, 7.3, 3.6];

/// `yxz` angles, in degrees, of the glenoid-based → ISB scapula rotation.
const KOLZ_GC_TO_PA_YXZ_DEG: [f64; 3] = [12.6, -0.8, -11.4];

fn from_degrees(sequence: EulerSequence, degrees: [f64; 3]) -> Matrix3<f64> {
    euler_to_matrix(sequence, degrees.map(f64::to_radians))
}

/// Matrix of a single catalogue entry.
pub fn matrix(correction: Correction) -> Matrix3<f64> {
    match correction {
        Correction::ToIsbRotation | Correction::ToIsbLikeRotation => Matrix3::identity(),
        Correction::ScapulaKolzAcToPaRotation => {
            from_degrees(EulerSequence::Yxz, KOLZ_AC_TO_PA_YXZ_DEG)
        }
        Correction::ScapulaKolzGlenoidToPaRotation => {
            from_degrees(EulerSequence::Yxz, KOLZ_GC_TO_PA_YXZ_DEG)
        }
    }
}

/// Product of the declared corrections in order; identity when none is declared.
pub fn compose(corrections: &[Correction]) -> Matrix3<f64> {
    corrections
        .iter()
        .fold(Matrix3::identity(), |acc, c| acc * matrix(*c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CATALOGUE: [Correction; 4] = [
        Correction::ToIsbRotation,
        Correction::ToIsbLikeRotation,
        Correction::ScapulaKolzAcToPaRotation,
        Correction::ScapulaKolzGlenoidToPaRotation,
    ];

    #[test]
    fn test_catalogue_is_orthonormal() {
        for c in CATALOGUE {
            let m = matrix(c);
            assert_relative_eq!(m.transpose() * m, Matrix3::identity(), epsilon = 1e-12);
            assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_to_isb_is_identity() {
        assert_eq!(matrix(Correction::ToIsbRotation), Matrix3::identity());
        assert_eq!(matrix(Correction::ToIsbLikeRotation), Matrix3::identity());
    }

    #[test]
    fn test_kolz_matrices_are_not_identity() {
        let ac = matrix(Correction::ScapulaKolzAcToPaRotation);
        let gc = matrix(Correction::ScapulaKolzGlenoidToPaRotation);
        assert!((ac - Matrix3::identity()).norm() > 1e-3);
        assert!((gc - ac).norm() > 1e-3);
    }

    #[test]
    fn test_compose_keeps_declared_order() {
        assert_eq!(compose(&[]), Matrix3::identity());

        let ac = matrix(Correction::ScapulaKolzAcToPaRotation);
        let gc = matrix(Correction::ScapulaKolzGlenoidToPaRotation);
        let composed = compose(&[
            Correction::ScapulaKolzAcToPaRotation,
            Correction::ToIsbRotation,
            Correction::ScapulaKolzGlenoidToPaRotation,
        ]);
        assert_relative_eq!(composed, ac * gc, epsilon = 1e-12);
    }
}
