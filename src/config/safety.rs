//! Safety fence and workspace bounds configuration.

use serde::Deserialize;

use super::units::Millimeters;

/// Virtual fence and axis-aligned workspace bounds.
///
/// The fence is a horizontal line the pen point must stay above; crossing it
/// latches the control loop into its stopped state. The workspace bounds are
/// a coarse rectangle check applied before reachability.
#[derive(Debug, Clone, Copy, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyConfig {
    /// Minimum allowed y for the measured pen position.
    #[serde(rename = "fence_min_y_mm", default = "default_fence_min_y")]
    pub fence_min_y: Millimeters,

    /// Allowed x range, `[min, max]`.
    #[serde(rename = "workspace_x_mm", default = "default_workspace_x")]
    pub workspace_x: [Millimeters; 2],

    /// Allowed y range, `[min, max]`.
    #[serde(rename = "workspace_y_mm", default = "default_workspace_y")]
    pub workspace_y: [Millimeters; 2],
}

fn default_fence_min_y() -> Millimeters {
    Millimeters(10.0)
}

fn default_workspace_x() -> [Millimeters; 2] {
    [Millimeters(-200.0), Millimeters(200.0)]
}

fn default_workspace_y() -> [Millimeters; 2] {
    [Millimeters(0.0), Millimeters(280.0)]
}

impl SafetyConfig {
    /// Check whether a point lies inside the rectangular workspace bounds.
    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        x >= self.workspace_x[0].0
            && x <= self.workspace_x[1].0
            && y >= self.workspace_y[0].0
            && y <= self.workspace_y[1].0
    }

    /// Check whether a measured y-coordinate violates the fence.
    #[inline]
    pub fn below_fence(&self, y: f32) -> bool {
        y < self.fence_min_y.0
    }

    /// Check that both ranges are ordered (min < max).
    pub fn ranges_valid(&self) -> bool {
        self.workspace_x[0].0 < self.workspace_x[1].0
            && self.workspace_y[0].0 < self.workspace_y[1].0
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            fence_min_y: default_fence_min_y(),
            workspace_x: default_workspace_x(),
            workspace_y: default_workspace_y(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let safety = SafetyConfig::default();
        assert!(safety.in_bounds(0.0, 150.0));
        assert!(safety.in_bounds(-200.0, 0.0));
        assert!(!safety.in_bounds(-201.0, 150.0));
        assert!(!safety.in_bounds(0.0, 281.0));
    }

    #[test]
    fn test_fence() {
        let safety = SafetyConfig::default();
        assert!(safety.below_fence(9.9));
        assert!(!safety.below_fence(10.0));
        assert!(!safety.below_fence(150.0));
    }

    #[test]
    fn test_parse_from_toml() {
        let safety: SafetyConfig = toml::from_str(
            r#"
fence_min_y_mm = 25.0
workspace_x_mm = [-100.0, 100.0]
workspace_y_mm = [20.0, 200.0]
"#,
        )
        .unwrap();
        assert_eq!(safety.fence_min_y.0, 25.0);
        assert!(safety.below_fence(24.0));
        assert!(!safety.in_bounds(0.0, 10.0));
        assert!(safety.ranges_valid());
    }
}
