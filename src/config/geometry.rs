//! Linkage geometry configuration.

use serde::Deserialize;

use super::units::Millimeters;

/// Elbow configuration of the five-bar linkage.
///
/// The inverse kinematics has two real roots per joint; this selects which
/// one is used. Fixed per deployment by how the physical links are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ElbowMode {
    /// Elbows bend away from the workspace centerline.
    #[default]
    Outward,
    /// Elbows bend toward the workspace centerline.
    Inward,
}

impl ElbowMode {
    /// Sign applied to the elbow half-angle in the inverse solution.
    #[inline]
    pub const fn sign(self) -> f32 {
        match self {
            ElbowMode::Outward => 1.0,
            ElbowMode::Inward => -1.0,
        }
    }
}

/// Link dimensions of the five-bar mechanism.
///
/// Two motor axes sit `base_separation` apart along x. Each drives a
/// proximal link of `proximal_length`; the distal links of `distal_length`
/// close the loop at the pen point. All values are fixed at construction.
#[derive(Debug, Clone, Copy, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkageGeometry {
    /// Proximal link length (motor axis to elbow).
    #[serde(rename = "proximal_length_mm")]
    pub proximal_length: Millimeters,

    /// Distal link length (elbow to pen point).
    #[serde(rename = "distal_length_mm")]
    pub distal_length: Millimeters,

    /// Distance between the two motor axes along x.
    #[serde(rename = "base_separation_mm")]
    pub base_separation: Millimeters,

    /// Elbow root selection.
    #[serde(default)]
    pub elbow: ElbowMode,
}

impl LinkageGeometry {
    /// Farthest distance a single joint can reach from its own axis.
    #[inline]
    pub fn max_reach(&self) -> f32 {
        self.proximal_length.0 + self.distal_length.0
    }

    /// Closest distance a single joint can reach from its own axis.
    #[inline]
    pub fn min_reach(&self) -> f32 {
        libm::fabsf(self.proximal_length.0 - self.distal_length.0)
    }
}

impl Default for LinkageGeometry {
    fn default() -> Self {
        Self {
            proximal_length: Millimeters(100.0),
            distal_length: Millimeters(150.0),
            base_separation: Millimeters(60.0),
            elbow: ElbowMode::Outward,
        }
    }
}
