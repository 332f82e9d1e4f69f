//! Vector and quaternion helpers for the pole solver.

use std::f32::consts::{PI, TAU};

use nalgebra::{Isometry3, Vector3};

/// Cross products shorter than this fall back to the next axis.
const DEGENERATE_EPS: f32 = 1e-6;

/// An arbitrary vector perpendicular to `v`, not normalized.
///
/// Crosses `v` with world X, falling back to world Y when `v` is nearly
/// parallel to X. The result is zero only for (near-)zero input.
#[must_use]
pub fn perpendicular_vector(v: &Vector3<f32>) -> Vector3<f32> {
    let c = v.cross(&Vector3::x());
    if c.norm() > DEGENERATE_EPS {
        c
    } else {
        v.cross(&Vector3::y())
    }
}

/// Angular distance in radians between the rotation parts of two world
/// transforms, folded into `[0, pi]`. Translations are ignored.
#[must_use]
pub fn rotation_difference(a: &Isometry3<f32>, b: &Isometry3<f32>) -> f32 {
    let dot = a.rotation.quaternion().dot(b.rotation.quaternion());
    let angle = 2.0 * dot.clamp(-1.0, 1.0).acos();
    if angle > PI {
        TAU - angle
    } else {
        angle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};
    use std::f32::consts::FRAC_PI_2;

    fn spin_z(angle: f32) -> Isometry3<f32> {
        Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
        )
    }

    // ---- Perpendiculars ----

    #[test]
    fn perpendicular_is_orthogonal_and_nonzero() {
        let v = Vector3::new(0.3, -1.2, 2.0);
        let p = perpendicular_vector(&v);
        assert!(p.norm() > 1e-6);
        assert_relative_eq!(p.dot(&v), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn axis_parallel_to_x_falls_back_to_the_y_cross() {
        let v = Vector3::new(2.0, 0.0, 0.0);
        let p = perpendicular_vector(&v);
        assert!(p.norm() > 1e-6);
        assert_relative_eq!(p.dot(&v), 0.0, epsilon = 1e-5);
        // x cross y = z, scaled by the input's length.
        assert_relative_eq!(p.z, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn nearly_parallel_axis_also_falls_back() {
        let v = Vector3::new(1.0, 1e-8, 0.0);
        let p = perpendicular_vector(&v);
        assert!(p.norm() > 1e-3);
        assert_relative_eq!(p.dot(&v), 0.0, epsilon = 1e-5);
    }

    // ---- Angular distance ----

    #[test]
    fn identical_rotations_measure_zero() {
        // f32 unit quaternions dot to 1 only within an ulp, and acos
        // amplifies that to a few tenths of a milliradian.
        assert_relative_eq!(
            rotation_difference(&spin_z(0.8), &spin_z(0.8)),
            0.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn quarter_turn_measures_half_pi() {
        assert_relative_eq!(
            rotation_difference(&spin_z(0.0), &spin_z(FRAC_PI_2)),
            FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn negated_quaternion_is_the_same_rotation() {
        // Axis-angle theta - tau yields the negated quaternion of theta.
        assert_relative_eq!(
            rotation_difference(&spin_z(0.8), &spin_z(0.8 - TAU)),
            0.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn reflex_angles_fold_into_the_front_range() {
        // A 270 degree spin is 90 degrees the other way around.
        assert_relative_eq!(
            rotation_difference(&spin_z(0.0), &spin_z(1.5 * PI)),
            FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn translation_is_ignored() {
        let a = Isometry3::from_parts(
            Translation3::new(4.0, -2.0, 9.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3),
        );
        let b = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3),
        );
        assert_relative_eq!(rotation_difference(&a, &b), 0.0, epsilon = 1e-3);
    }
}
