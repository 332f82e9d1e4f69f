//! Bidirectional pose transfer between a limb's IK and FK chains.
//!
//! Transforms are copied channel-for-channel, index-wise along the two
//! chains; the IK chain's channels double as the seed the rig's own solver
//! reads, so an exact copy is the whole job. The one extra step is the
//! FK-to-IK direction, which re-solves the pole target so the IK result
//! keeps the FK bend plane.

use limber_armature::{Armature, BoneId};
use limber_core::config::SwitchConfig;
use limber_core::error::SwitchError;
use limber_core::types::{LimbKind, SwitchDirection};
use limber_ik::solve_pole_position;

/// Every bone a switch will touch, resolved up front.
struct LimbBones {
    ik: Vec<BoneId>,
    fk: Vec<BoneId>,
    pole: Option<PoleBones>,
}

/// The pole-solve participants, only resolved for the FK-to-IK direction.
struct PoleBones {
    joint_a: BoneId,
    joint_b: BoneId,
    target: BoneId,
    fk_root: BoneId,
}

/// Copy one limb's pose between its chains and re-evaluate the rig.
///
/// All bones the direction needs are resolved before anything is written,
/// so a missing bone fails with the rig untouched.
pub fn switch_pose(
    arm: &mut Armature,
    kind: LimbKind,
    direction: SwitchDirection,
    config: &SwitchConfig,
) -> Result<(), SwitchError> {
    let bones = resolve_limb(arm, kind, direction)?;
    log::debug!(
        "{kind}: {direction:?} copy over {} joint pairs",
        bones.ik.len()
    );

    match direction {
        SwitchDirection::IkToFk => {
            copy_chain(arm, &bones.ik, &bones.fk);
            arm.reevaluate();
        }
        SwitchDirection::FkToIk => {
            copy_chain(arm, &bones.fk, &bones.ik);
            arm.reevaluate();

            if let Some(pole) = bones.pole {
                // The FK root's orientation is the reference the pole
                // solve steers the IK root joint toward.
                let reference = *arm.bone(pole.fk_root).world_matrix();
                let position = solve_pole_position(
                    arm,
                    pole.joint_a,
                    pole.joint_b,
                    pole.target,
                    &reference,
                    config.pole_probe_length,
                );
                arm.set_world_location(pole.target, &position);
                arm.reevaluate();
            }
        }
    }
    Ok(())
}

fn resolve(arm: &Armature, name: &str) -> Result<BoneId, SwitchError> {
    arm.find(name)
        .ok_or_else(|| SwitchError::MissingBone(name.to_owned()))
}

fn resolve_limb(
    arm: &Armature,
    kind: LimbKind,
    direction: SwitchDirection,
) -> Result<LimbBones, SwitchError> {
    let ik = kind
        .ik_chain()
        .iter()
        .map(|name| resolve(arm, name))
        .collect::<Result<Vec<_>, _>>()?;
    let fk = kind
        .fk_chain()
        .iter()
        .map(|name| resolve(arm, name))
        .collect::<Result<Vec<_>, _>>()?;

    let pole = match (direction, kind.pole_joints(), kind.pole_target()) {
        (SwitchDirection::FkToIk, Some((joint_a, joint_b)), Some(target)) => Some(PoleBones {
            joint_a: resolve(arm, joint_a)?,
            joint_b: resolve(arm, joint_b)?,
            target: resolve(arm, target)?,
            fk_root: fk[0],
        }),
        _ => None,
    };

    Ok(LimbBones { ik, fk, pole })
}

/// Verbatim channel copy, index-wise. The destination channel is switched
/// to quaternion mode by the write, so Euler-order mismatches between the
/// chains cannot distort the pose.
fn copy_chain(arm: &mut Armature, from: &[BoneId], to: &[BoneId]) {
    for (&src, &dst) in from.iter().zip(to) {
        let translation = arm.bone(src).translation();
        let rotation = arm.bone(src).rotation_quaternion();

        let bone = arm.bone_mut(dst);
        bone.set_translation(translation);
        bone.set_rotation_quaternion(rotation);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
