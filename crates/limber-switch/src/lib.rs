//! IK/FK limb switching over an armature.
//!
//! The pieces, in call order: [`classify::classify`] turns a bone
//! selection into a limb kind, [`sync::switch_pose`] copies the pose
//! between that limb's chains (re-solving the pole target when IK takes
//! over), and [`switch::switch_ik_fk`] wraps both behind the control-flag
//! toggle hosts invoke.

pub mod classify;
pub mod switch;
pub mod sync;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use classify::classify;
pub use switch::switch_ik_fk;
pub use sync::switch_pose;
