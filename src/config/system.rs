//! System configuration - root configuration structure.

use serde::Deserialize;

use super::geometry::LinkageGeometry;
use super::joint::{JointConfig, JointId};
use super::safety::SafetyConfig;
use super::units::Millimeters;

/// Arm-level startup parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmConfig {
    /// Cartesian target preloaded before the first explicit move command.
    #[serde(rename = "initial_target_mm", default = "default_initial_target")]
    pub initial_target: [Millimeters; 2],
}

fn default_initial_target() -> [Millimeters; 2] {
    [Millimeters(0.0), Millimeters(150.0)]
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            initial_target: default_initial_target(),
        }
    }
}

/// The two joint configurations.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointsConfig {
    /// Joint on the negative-x side of the workspace frame.
    #[serde(default = "JointConfig::default_left")]
    pub left: JointConfig,

    /// Joint on the positive-x side of the workspace frame.
    #[serde(default = "JointConfig::default_right")]
    pub right: JointConfig,
}

impl Default for JointsConfig {
    fn default() -> Self {
        Self {
            left: JointConfig::default_left(),
            right: JointConfig::default_right(),
        }
    }
}

/// Root configuration structure from TOML.
///
/// Every section carries defaults matching the reference hardware, so an
/// empty document parses to a usable configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    /// Five-bar linkage dimensions.
    #[serde(default)]
    pub geometry: LinkageGeometry,

    /// Fence and workspace bounds.
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Arm-level startup parameters.
    #[serde(default)]
    pub arm: ArmConfig,

    /// Per-joint configurations.
    #[serde(default)]
    pub joints: JointsConfig,
}

impl SystemConfig {
    /// Get a joint configuration by identity.
    pub fn joint(&self, id: JointId) -> &JointConfig {
        match id {
            JointId::Left => &self.joints.left,
            JointId::Right => &self.joints.right,
        }
    }
}
