//! Error taxonomy for the switch operation and its configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Notification;

/// Top-level error type for the limber workspace.
#[derive(Debug, Error)]
pub enum LimberError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Switch error: {0}")]
    Switch(#[from] SwitchError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pole_probe_length: {0} (must be finite and > 0)")]
    InvalidProbeLength(f32),
}

/// Failures of the IK/FK switch operation.
///
/// All variants are recoverable user conditions: the armature is left
/// unchanged and the host shows the message in its notification area.
/// Preconditions are validated before any bone is written, so a failed call
/// never leaves a partially-copied pose.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// Invoked outside the pose-editing context.
    #[error("IK/FK switch requires pose mode")]
    NotInPoseMode,

    /// No bones selected.
    #[error("no bones selected")]
    EmptySelection,

    /// The selection matched none of the limb patterns.
    #[error("selection matches no known limb")]
    UnknownLimb,

    /// A chain bone required for the resolved direction is absent.
    #[error("missing bone: {0}")]
    MissingBone(String),
}

impl SwitchError {
    /// Notification for the host's message area.
    ///
    /// Every switch failure reports at error severity; info and warning are
    /// reserved for success reports and solver diagnostics.
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::error(self.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
