//! Environment configuration.

use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use armkit_core::pose::Workspace;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// ControlMode
// ---------------------------------------------------------------------------

/// Which action interface the environment exposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// 6D end-effector deltas; only the translation is applied.
    Raw,
    /// Primitive-selection logits plus per-primitive arguments.
    #[default]
    Primitive,
}

// ---------------------------------------------------------------------------
// EnvConfig
// ---------------------------------------------------------------------------

/// Configuration shared by the raw and primitive environments.
///
/// All fields have serde defaults, so a partial TOML file is enough:
///
/// ```
/// use armkit_env::config::EnvConfig;
///
/// let config: EnvConfig = toml::from_str("episode_len = 50").unwrap();
/// assert_eq!(config.episode_len, 50);
/// assert_eq!(config.image_width, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub control_mode: ControlMode,
    /// Multiplier applied to the clipped action vector in primitive mode.
    pub action_scale: f32,
    /// Steps per episode before truncation. `0` disables the limit.
    pub episode_len: u32,
    /// Observation image size after resize.
    pub image_width: u32,
    pub image_height: u32,
    /// Reachable box for the end effector, metres.
    pub workspace_low: [f32; 3],
    pub workspace_high: [f32; 3],
    /// Vertical clearance commanded during reset, metres.
    pub reset_lift: f32,
    /// Duration of each blocking pose move, seconds.
    pub motion_duration_s: f32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            control_mode: ControlMode::default(),
            action_scale: 1.0,
            episode_len: 5,
            image_width: 64,
            image_height: 64,
            workspace_low: [0.191_476_76, -0.249_889_93, 0.115_933_31],
            workspace_high: [0.489_357_49, 0.302_199_93, 0.6],
            reset_lift: 0.3,
            motion_duration_s: 5.0,
        }
    }
}

impl EnvConfig {
    /// Load from a TOML file and validate.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// The workspace box described by the bound fields.
    pub fn workspace(&self) -> Result<Workspace, ConfigError> {
        Workspace::new(
            Vector3::from(self.workspace_low),
            Vector3::from(self.workspace_high),
        )
        .map_err(|e| ConfigError::InvalidField {
            field: "workspace",
            reason: e.to_string(),
        })
    }

    /// Check scalar fields and bound ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.action_scale.is_finite() && self.action_scale > 0.0) {
            return Err(ConfigError::InvalidField {
                field: "action_scale",
                reason: format!("must be finite and positive, got {}", self.action_scale),
            });
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::InvalidField {
                field: "image_width/image_height",
                reason: "image dimensions must be nonzero".to_string(),
            });
        }
        if !(self.reset_lift.is_finite() && self.reset_lift >= 0.0) {
            return Err(ConfigError::InvalidField {
                field: "reset_lift",
                reason: format!("must be finite and non-negative, got {}", self.reset_lift),
            });
        }
        if !(self.motion_duration_s.is_finite() && self.motion_duration_s > 0.0) {
            return Err(ConfigError::InvalidField {
                field: "motion_duration_s",
                reason: format!("must be finite and positive, got {}", self.motion_duration_s),
            });
        }
        self.workspace()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
