//! The host-facing toggle operation.
//!
//! One entry point wires the pieces together: gate on the interaction
//! context, classify the selection, read the control flag to learn which
//! chain currently owns the limb, hand the pose to the other chain, and
//! flip the flag. The flag write comes last so a failed copy never
//! changes the advertised mode.

use limber_armature::Armature;
use limber_core::config::SwitchConfig;
use limber_core::error::SwitchError;
use limber_core::types::{ContextMode, IK_FK_PROP, SwitchMode, SwitchReport};

use crate::classify::classify;
use crate::sync::switch_pose;

/// Toggle the selected limb between IK and FK.
///
/// A control flag that was never set reads as `0.0`, so fresh rigs start
/// in IK mode. On success the control bone carries the new mode's flag
/// value and the returned report names the limb and mode for the host's
/// notification area.
pub fn switch_ik_fk<S: AsRef<str>>(
    arm: &mut Armature,
    selection: &[S],
    context: ContextMode,
    config: &SwitchConfig,
) -> Result<SwitchReport, SwitchError> {
    if context != ContextMode::Pose {
        return Err(SwitchError::NotInPoseMode);
    }
    if selection.is_empty() {
        return Err(SwitchError::EmptySelection);
    }
    let kind = classify(selection).ok_or(SwitchError::UnknownLimb)?;

    let control = arm
        .find(kind.control_bone())
        .ok_or_else(|| SwitchError::MissingBone(kind.control_bone().to_owned()))?;
    let flag = arm.bone(control).custom_property(IK_FK_PROP).unwrap_or(0.0);
    let current = SwitchMode::from_flag(flag);

    switch_pose(arm, kind, current.toggle_direction(), config)?;

    let mode = current.toggled();
    arm.bone_mut(control)
        .set_custom_property(IK_FK_PROP, mode.flag_value());
    log::info!("switched {kind} to {mode}");
    Ok(SwitchReport { limb: kind, mode })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
