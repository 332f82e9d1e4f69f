// limber-core: Limb vocabulary, switch modes, errors, and configuration for
// the limber IK/FK switcher.

pub mod config;
pub mod error;
pub mod types;
