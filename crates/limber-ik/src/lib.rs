//! Pole-target solving for IK/FK snapping.
//!
//! When a pose is transferred onto an IK chain, the chain's bend plane is
//! still free to spin about the root-to-tip axis; the pole target pins it
//! down. This crate turns a reference orientation for the chain's root
//! joint back into a world-space pole position.

pub mod math;
pub mod pole;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use math::{perpendicular_vector, rotation_difference};
pub use pole::solve_pole_position;
