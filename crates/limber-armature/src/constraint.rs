//! Two-bone IK constraint: the rig-side solver that bends a two-joint chain
//! toward a target bone, in the plane selected by a pole bone.
//!
//! The solve is analytic (law of cosines), not iterative: a two-joint chain
//! with a known bend plane has a closed-form pose. One property matters to
//! callers placing pole targets: rotating the pole about the root→target
//! axis by some angle rotates the root joint's world orientation by exactly
//! that angle about the same axis.

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

use crate::bone::BoneId;

/// Direction vectors shorter than this are treated as degenerate.
const DEGENERATE_EPS: f32 = 1e-6;

/// A two-joint IK constraint.
///
/// `mid` must be parented directly under `root` (the builder checks this);
/// `target` and `pole` are free bones whose heads the solve reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoBoneIk {
    /// First chain joint; its head stays fixed and only its orientation is
    /// solved.
    pub root: BoneId,
    /// Second chain joint; placed at the root's tip, oriented toward the
    /// reach point.
    pub mid: BoneId,
    /// Bone whose head the chain reaches for.
    pub target: BoneId,
    /// Bone whose head selects the bend plane, when present.
    pub pole: Option<BoneId>,
}

/// Solved world matrices for the two constrained joints.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TwoBoneSolution {
    pub root_world: Isometry3<f32>,
    pub mid_world: Isometry3<f32>,
}

/// Analytic two-bone solve.
///
/// `root_world`/`mid_world` are the forward-kinematic results for the two
/// joints; the root's head position is kept, and the mid's head seeds the
/// bend plane when no usable pole direction exists. Returns `None` when the
/// span from root to target is degenerate — the caller keeps the FK pose.
pub(crate) fn solve_two_bone(
    root_world: &Isometry3<f32>,
    mid_world: &Isometry3<f32>,
    target_pos: &Vector3<f32>,
    pole_pos: Option<&Vector3<f32>>,
    root_len: f32,
    mid_len: f32,
) -> Option<TwoBoneSolution> {
    let head = root_world.translation.vector;
    let span = target_pos - head;
    let dist = span.norm();
    if dist < DEGENERATE_EPS || root_len < DEGENERATE_EPS || mid_len < DEGENERATE_EPS {
        return None;
    }

    // Clamp to the annulus the chain can actually reach.
    let reach = dist.clamp((root_len - mid_len).abs().max(DEGENERATE_EPS), root_len + mid_len);
    let axis = span / dist;

    // Bend-plane direction: the pole wins, the FK-seeded elbow breaks the
    // tie when the pole sits on the axis, a fixed perpendicular is the last
    // resort.
    let seed = mid_world.translation.vector - head;
    let bend = [pole_pos.map(|p| p - head), Some(seed)]
        .into_iter()
        .flatten()
        .map(|dir| reject_onto_plane(&dir, &axis))
        .find(|v| v.norm() > DEGENERATE_EPS)
        .unwrap_or_else(|| fallback_perpendicular(&axis));
    let bend_dir = bend.normalize();

    // Root joint angle from the law of cosines.
    let cos_root = ((root_len * root_len + reach * reach - mid_len * mid_len)
        / (2.0 * root_len * reach))
        .clamp(-1.0, 1.0);
    let sin_root = (1.0 - cos_root * cos_root).max(0.0).sqrt();

    let elbow = head + axis * (root_len * cos_root) + bend_dir * (root_len * sin_root);
    let reach_point = head + axis * reach;

    let plane_normal = axis.cross(&bend_dir);
    let root_y = (elbow - head).normalize();
    let mid_y = (reach_point - elbow).normalize();

    Some(TwoBoneSolution {
        root_world: Isometry3::from_parts(
            Translation3::from(head),
            bone_frame(&root_y, &plane_normal),
        ),
        mid_world: Isometry3::from_parts(
            Translation3::from(elbow),
            bone_frame(&mid_y, &plane_normal),
        ),
    })
}

/// Component of `v` perpendicular to the unit vector `axis`.
fn reject_onto_plane(v: &Vector3<f32>, axis: &Vector3<f32>) -> Vector3<f32> {
    v - axis * v.dot(axis)
}

/// A perpendicular of `axis` that never degenerates for unit input.
fn fallback_perpendicular(axis: &Vector3<f32>) -> Vector3<f32> {
    let c = axis.cross(&Vector3::x());
    if c.norm() > DEGENERATE_EPS {
        c
    } else {
        axis.cross(&Vector3::y())
    }
}

/// Right-handed orthonormal frame with +Y along `y` and +Z along the bend
/// plane's normal.
fn bone_frame(y: &Vector3<f32>, plane_normal: &Vector3<f32>) -> UnitQuaternion<f32> {
    let x = y.cross(plane_normal);
    let rot = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, *y, *plane_normal]));
    UnitQuaternion::from_rotation_matrix(&rot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn iso(x: f32, y: f32, z: f32) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
    }

    fn solve_simple(target: Vector3<f32>, pole: Option<Vector3<f32>>) -> TwoBoneSolution {
        // Unit-length upper/lower chain along +Y, straight FK seed.
        solve_two_bone(
            &iso(0.0, 0.0, 0.0),
            &iso(0.0, 1.0, 0.0),
            &target,
            pole.as_ref(),
            1.0,
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn straight_chain_at_full_extension() {
        let sol = solve_simple(Vector3::new(0.0, 2.0, 0.0), Some(Vector3::new(1.0, 1.0, 0.0)));
        let elbow = sol.mid_world.translation.vector;
        assert_relative_eq!(elbow.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(elbow.y, 1.0, epsilon = 1e-5);
        // Both joints aim straight up.
        let root_dir = sol.root_world.rotation * Vector3::y();
        assert_relative_eq!(root_dir.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn right_angle_bend_toward_pole() {
        // Distance sqrt(2) with unit links puts the root joint at 45 deg.
        let sol = solve_simple(
            Vector3::new(0.0, std::f32::consts::SQRT_2, 0.0),
            Some(Vector3::new(1.0, 0.7, 0.0)),
        );
        let elbow = sol.mid_world.translation.vector;
        assert_relative_eq!(elbow.x, FRAC_PI_4.cos(), epsilon = 1e-5);
        assert_relative_eq!(elbow.y, FRAC_PI_4.sin(), epsilon = 1e-5);
        assert_relative_eq!(elbow.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn bend_flips_with_the_pole() {
        let target = Vector3::new(0.0, 1.2, 0.0);
        let toward_x = solve_simple(target, Some(Vector3::new(1.0, 0.5, 0.0)));
        let away_x = solve_simple(target, Some(Vector3::new(-1.0, 0.5, 0.0)));
        assert!(toward_x.mid_world.translation.vector.x > 0.1);
        assert!(away_x.mid_world.translation.vector.x < -0.1);
    }

    #[test]
    fn unreachable_target_straightens_the_chain() {
        let sol = solve_simple(Vector3::new(0.0, 5.0, 0.0), Some(Vector3::new(1.0, 1.0, 0.0)));
        let elbow = sol.mid_world.translation.vector;
        let tip = sol.mid_world.translation.vector + sol.mid_world.rotation * Vector3::y();
        assert_relative_eq!(elbow.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(tip.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn link_lengths_are_preserved() {
        let sol = solve_simple(
            Vector3::new(0.4, 1.3, -0.5),
            Some(Vector3::new(0.9, 0.3, 0.2)),
        );
        let head = sol.root_world.translation.vector;
        let elbow = sol.mid_world.translation.vector;
        let tip = elbow + sol.mid_world.rotation * Vector3::y();
        assert_relative_eq!((elbow - head).norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!((tip - elbow).norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_span_returns_none() {
        let sol = solve_two_bone(
            &iso(0.0, 0.0, 0.0),
            &iso(0.0, 1.0, 0.0),
            &Vector3::zeros(),
            None,
            1.0,
            1.0,
        );
        assert!(sol.is_none());
    }

    #[test]
    fn missing_pole_bends_toward_the_fk_seed() {
        let sol = solve_two_bone(
            &iso(0.0, 0.0, 0.0),
            &iso(-0.5, 0.5, 0.0),
            &Vector3::new(0.0, 1.2, 0.0),
            None,
            1.0,
            1.0,
        )
        .unwrap();
        assert!(sol.mid_world.translation.vector.x < -0.1);
    }

    #[test]
    fn pole_on_the_axis_falls_back_to_the_seed() {
        let sol = solve_two_bone(
            &iso(0.0, 0.0, 0.0),
            &iso(-0.5, 0.5, 0.0),
            &Vector3::new(0.0, 1.2, 0.0),
            Some(&Vector3::new(0.0, 0.6, 0.0)),
            1.0,
            1.0,
        )
        .unwrap();
        assert!(sol.mid_world.translation.vector.x < -0.1);
    }

    #[test]
    fn rotating_the_pole_rotates_the_root_joint_with_it() {
        let target = Vector3::new(0.0, 1.4, 0.0);
        let pole = Vector3::new(1.0, 0.7, 0.0);
        let base = solve_simple(target, Some(pole));

        let phi = 0.6;
        let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), phi);
        let rotated = solve_simple(target, Some(spin * pole));

        let expected = spin * base.root_world.rotation;
        assert_relative_eq!(
            rotated.root_world.rotation.angle_to(&expected),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn solved_frames_are_right_handed() {
        let sol = solve_simple(
            Vector3::new(0.3, 1.1, 0.4),
            Some(Vector3::new(1.0, 0.2, -0.3)),
        );
        for world in [sol.root_world, sol.mid_world] {
            let m = world.rotation.to_rotation_matrix();
            assert_relative_eq!(m.matrix().determinant(), 1.0, epsilon = 1e-4);
        }
    }
}
