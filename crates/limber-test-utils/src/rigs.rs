//! Canonical limb rigs following the rig-naming contract.
//!
//! Geometry is deliberately simple — bones stack along +Y with identity rest
//! rotations, and each IK end-effector's rest position coincides with the
//! straight chain's tip, so a freshly built rig is self-consistent before
//! any posing.

use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use rand::Rng;

use limber_armature::{Armature, ArmatureBuilder};

use crate::rng::seeded_rng;

fn offset(x: f32, y: f32, z: f32) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
}

/// Append a full arm (control, IK chain, FK chain, pole target, constraint)
/// for one side. `shoulder_x` mirrors the limb across the body.
fn add_arm(builder: ArmatureBuilder, side: char, shoulder_x: f32) -> ArmatureBuilder {
    let control = format!("upper_arm_parent.{side}");
    let ik = [
        format!("upper_arm_ik.{side}"),
        format!("forearm_ik.{side}"),
        format!("hand_ik.{side}"),
    ];
    let fk = [
        format!("upper_arm_fk.{side}"),
        format!("forearm_fk.{side}"),
        format!("hand_fk.{side}"),
    ];
    let pole = format!("upper_arm_ik_target.{side}");

    builder
        .bone(&control, Some("root"), offset(shoulder_x, 1.4, 0.0), 0.2)
        // IK chain: two solved joints plus a free end-effector control.
        .bone(&ik[0], Some(&control), offset(0.0, 0.2, 0.0), 0.5)
        .bone(&ik[1], Some(&ik[0]), offset(0.0, 0.5, 0.0), 0.5)
        .bone(&ik[2], Some("root"), offset(shoulder_x, 2.6, 0.0), 0.2)
        // FK chain: serially parented.
        .bone(&fk[0], Some(&control), offset(0.0, 0.2, 0.0), 0.5)
        .bone(&fk[1], Some(&fk[0]), offset(0.0, 0.5, 0.0), 0.5)
        .bone(&fk[2], Some(&fk[1]), offset(0.0, 0.5, 0.0), 0.2)
        .bone(&pole, Some("root"), offset(shoulder_x, 2.1, 0.8), 0.1)
        .two_bone_ik(&ik[0], &ik[1], &ik[2], Some(&pole))
}

/// Append a full leg for one side, mirroring [`add_arm`]'s layout with the
/// four-joint leg chains.
fn add_leg(builder: ArmatureBuilder, side: char, hip_x: f32) -> ArmatureBuilder {
    let control = format!("thigh_parent.{side}");
    let ik = [
        format!("thigh_ik.{side}"),
        format!("shin_ik.{side}"),
        format!("foot_ik.{side}"),
        format!("toe_ik.{side}"),
    ];
    let fk = [
        format!("thigh_fk.{side}"),
        format!("shin_fk.{side}"),
        format!("foot_fk.{side}"),
        format!("toe_fk.{side}"),
    ];
    let pole = format!("thigh_ik_target.{side}");

    builder
        .bone(&control, Some("root"), offset(hip_x, 1.0, 0.0), 0.15)
        .bone(&ik[0], Some(&control), offset(0.0, 0.15, 0.0), 0.6)
        .bone(&ik[1], Some(&ik[0]), offset(0.0, 0.6, 0.0), 0.6)
        .bone(&ik[2], Some("root"), offset(hip_x, 2.35, 0.0), 0.25)
        .bone(&ik[3], Some(&ik[2]), offset(0.0, 0.25, 0.0), 0.15)
        .bone(&fk[0], Some(&control), offset(0.0, 0.15, 0.0), 0.6)
        .bone(&fk[1], Some(&fk[0]), offset(0.0, 0.6, 0.0), 0.6)
        .bone(&fk[2], Some(&fk[1]), offset(0.0, 0.6, 0.0), 0.25)
        .bone(&fk[3], Some(&fk[2]), offset(0.0, 0.25, 0.0), 0.15)
        .bone(&pole, Some("root"), offset(hip_x, 1.75, 0.8), 0.1)
        .two_bone_ik(&ik[0], &ik[1], &ik[2], Some(&pole))
}

/// Append the side-less single-joint hand pair.
fn add_hand(builder: ArmatureBuilder) -> ArmatureBuilder {
    builder
        .bone("hand_ik", Some("root"), offset(0.0, 2.8, 0.0), 0.2)
        .bone("hand_fk", Some("root"), offset(0.0, 2.8, 0.0), 0.2)
}

/// A root bone plus the complete left arm.
#[must_use]
pub fn left_arm_rig() -> Armature {
    let builder = ArmatureBuilder::new("left-arm").bone("root", None, Isometry3::identity(), 0.2);
    add_arm(builder, 'L', 0.4)
        .build()
        .expect("fixture rig is valid")
}

/// A root bone plus both arms, both legs, and the bare hand pair.
#[must_use]
pub fn biped_rig() -> Armature {
    let mut builder = ArmatureBuilder::new("biped").bone("root", None, Isometry3::identity(), 0.2);
    builder = add_arm(builder, 'L', 0.4);
    builder = add_arm(builder, 'R', -0.4);
    builder = add_leg(builder, 'L', 0.2);
    builder = add_leg(builder, 'R', -0.2);
    builder = add_hand(builder);
    builder.build().expect("fixture rig is valid")
}

/// Apply a deterministic random rotation to each named bone's channel, then
/// re-evaluate.
///
/// # Panics
///
/// Panics if a name is missing from the rig — fixtures are expected to
/// match the naming contract.
pub fn pose_bones(rig: &mut Armature, names: &[&str], seed: u64) {
    let mut rng = seeded_rng(seed);
    for name in names {
        let id = rig.find(name).expect("fixture bone exists");
        // x stays away from zero so the axis never degenerates.
        let axis = Unit::new_normalize(Vector3::new(
            rng.gen_range(0.2..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ));
        let angle = rng.gen_range(-0.8..0.8);
        rig.bone_mut(id)
            .set_rotation_quaternion(UnitQuaternion::from_axis_angle(&axis, angle));
    }
    rig.reevaluate();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use limber_core::types::LimbKind;

    #[test]
    fn left_arm_rig_has_all_contract_bones() {
        let rig = left_arm_rig();
        for name in LimbKind::ArmLeft
            .ik_chain()
            .iter()
            .chain(LimbKind::ArmLeft.fk_chain())
        {
            assert!(rig.find(name).is_some(), "missing {name}");
        }
        assert!(rig.find(LimbKind::ArmLeft.control_bone()).is_some());
        assert!(rig.find(LimbKind::ArmLeft.pole_target().unwrap()).is_some());
    }

    #[test]
    fn biped_rig_covers_every_limb_kind() {
        let rig = biped_rig();
        for kind in LimbKind::ALL {
            for name in kind.ik_chain().iter().chain(kind.fk_chain()) {
                assert!(rig.find(name).is_some(), "{kind:?} missing {name}");
            }
            assert!(rig.find(kind.control_bone()).is_some());
        }
    }

    #[test]
    fn rest_pose_is_self_consistent() {
        let rig = left_arm_rig();
        // The IK end-effector's rest head sits on the straight chain's tip,
        // so the constraint solve reproduces the rest pose.
        let forearm_tip = rig.bone_by_name("forearm_ik.L").unwrap().tip();
        let hand_head = rig
            .bone_by_name("hand_ik.L")
            .unwrap()
            .world_matrix()
            .translation
            .vector;
        assert!((forearm_tip - hand_head).norm() < 1e-4);
    }

    #[test]
    fn pose_bones_is_deterministic() {
        let mut a = left_arm_rig();
        let mut b = left_arm_rig();
        pose_bones(&mut a, LimbKind::ArmLeft.fk_chain(), 7);
        pose_bones(&mut b, LimbKind::ArmLeft.fk_chain(), 7);
        assert_eq!(a, b);
    }

    #[test]
    fn pose_bones_changes_the_pose() {
        let mut rig = left_arm_rig();
        let rest = rig.clone();
        pose_bones(&mut rig, LimbKind::ArmLeft.fk_chain(), 7);
        assert_ne!(rig, rest);
    }
}
