//! Shared test fixtures for the limber workspace.
//!
//! Provides canonical limb rigs with the bone naming the switcher expects,
//! plus a seeded RNG so tests that pose bones stay deterministic.

pub mod rigs;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use rigs::{biped_rig, left_arm_rig, pose_bones};
pub use rng::seeded_rng;
