//! Switch configuration.
//!
//! The switch operation takes its tunables as an explicit parameter; nothing
//! reads ambient scene state. Hosts typically load this once from a small
//! TOML file next to the rig and pass it through unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_pole_probe_length() -> f32 {
    1.0
}

// ---------------------------------------------------------------------------
// SwitchConfig
// ---------------------------------------------------------------------------

/// Tunables for the IK/FK switch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Offset magnitude, in world units, used when probing candidate pole
    /// positions (default: 1.0). A fixed constant of the heuristic, not
    /// derived from rig scale.
    #[serde(default = "default_pole_probe_length")]
    pub pole_probe_length: f32,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            pole_probe_length: default_pole_probe_length(),
        }
    }
}

impl SwitchConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.pole_probe_length.is_finite() || self.pole_probe_length <= 0.0 {
            return Err(ConfigError::InvalidProbeLength(self.pole_probe_length));
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
