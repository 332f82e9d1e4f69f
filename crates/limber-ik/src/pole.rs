//! Pole-target placement for two-joint IK chains.
//!
//! A two-bone solve leaves one degree of freedom open: the spin of the
//! bend plane about the root-to-tip axis. The solver here picks the pole
//! position that best reproduces a reference orientation for the chain's
//! root joint, probing three candidates instead of running a numerical
//! optimizer. The residual is smooth in the spin angle and the search
//! range is a single revolution, so three probes get close enough for
//! snapping purposes.

use nalgebra::{Isometry3, Point3, Unit, UnitQuaternion, Vector3};

use limber_armature::{Armature, BoneId};

use crate::math::{perpendicular_vector, rotation_difference};

/// Spans and offsets shorter than this are treated as degenerate.
const DEGENERATE_EPS: f32 = 1e-6;

/// Place the pole so the chain's root joint best reproduces `reference`.
///
/// The chain axis runs from `joint_a`'s head to `joint_b`'s tip. The pole
/// is probed at a perpendicular offset of `probe_length` from the axis
/// midpoint, then at that offset spun about the axis by plus and minus
/// the baseline residual; the better spun candidate is returned. The
/// baseline itself is never restored, even when neither spin improved on
/// it (a warning is logged instead).
///
/// Every probe writes the pole location into `arm` and re-evaluates it,
/// so the rig is left posed at the last probe. Callers write the returned
/// point back and re-evaluate once more.
pub fn solve_pole_position(
    arm: &mut Armature,
    joint_a: BoneId,
    joint_b: BoneId,
    pole: BoneId,
    reference: &Isometry3<f32>,
    probe_length: f32,
) -> Point3<f32> {
    let a = arm.bone(joint_a).world_matrix().translation.vector;
    let b = arm.bone(joint_b).tip();
    let axis = b - a;
    let midpoint = a + axis * 0.5;

    let pv = perpendicular_vector(&axis)
        .try_normalize(DEGENERATE_EPS)
        .unwrap_or_else(Vector3::z)
        * probe_length;

    let mut probe = |offset: Vector3<f32>| {
        arm.set_world_location(pole, &Point3::from(midpoint + offset));
        arm.reevaluate();
        rotation_difference(arm.bone(joint_a).world_matrix(), reference)
    };
    let angle0 = probe(pv);

    let spin_axis = Unit::try_new(axis, DEGENERATE_EPS);
    let spin = |angle: f32| match spin_axis {
        Some(unit_axis) => UnitQuaternion::from_axis_angle(&unit_axis, angle) * pv,
        None => pv,
    };
    let pv1 = spin(angle0);
    let pv2 = spin(-angle0);

    let ang1 = probe(pv1);
    let ang2 = probe(pv2);
    log::debug!("pole probes: baseline {angle0:.4} rad, spun {ang1:.4} / {ang2:.4} rad");
    if ang1.min(ang2) > angle0 {
        log::warn!(
            "pole spin did not improve on the baseline ({:.4} rad vs {angle0:.4} rad); \
             keeping the spun candidate",
            ang1.min(ang2),
        );
    }

    let chosen = if ang1 <= ang2 { pv1 } else { pv2 };
    Point3::from(midpoint + chosen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
