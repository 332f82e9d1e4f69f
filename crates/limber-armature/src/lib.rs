//! In-memory armature pose graph.
//!
//! The stand-in for a host application's rig: bones with rest transforms and
//! animated channels, world-matrix propagation, two-bone IK constraints, and
//! custom properties. Pose tools mutate channels, then call
//! [`Armature::reevaluate`] to propagate.

pub mod armature;
pub mod bone;
pub mod constraint;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use armature::{Armature, ArmatureBuilder, ArmatureError};
pub use bone::{Bone, BoneId, EulerOrder, RotationChannel};
pub use constraint::TwoBoneIk;
