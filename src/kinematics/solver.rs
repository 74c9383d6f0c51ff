//! Five-bar linkage geometry solver.
//!
//! Pure functions of the link dimensions: no state, no hardware. Angles
//! cross the API in degrees; trigonometry happens in radians via libm so
//! results are identical with and without `std`.

use libm::{acosf, atan2f, cosf, fabsf, sinf, sqrtf};

use crate::config::units::Degrees;
use crate::config::{LinkageGeometry, SafetyConfig};
use crate::error::KinematicsError;

/// A point in the planar workspace, in millimeters.
///
/// The frame is centered between the two motor axes: the left axis sits at
/// (-D/2, 0), the right at (+D/2, 0), and +y points into the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CartesianPoint {
    /// Horizontal offset from the midpoint between the motors.
    pub x: f32,
    /// Distance into the workspace.
    pub y: f32,
}

impl CartesianPoint {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The pair of motor shaft angles that places the pen at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointAngles {
    /// Left motor angle, measured counterclockwise from +x.
    pub theta1: Degrees,
    /// Right motor angle, measured counterclockwise from +x.
    pub theta2: Degrees,
}

/// Geometry solver for the planar five-bar mechanism.
///
/// Each motor drives a proximal link of length L1 whose far end (the elbow)
/// connects through a distal link of length L2 to the shared pen point.
#[derive(Debug, Clone, Copy)]
pub struct LinkageSolver {
    l1: f32,
    l2: f32,
    half_base: f32,
    elbow_sign: f32,
}

impl LinkageSolver {
    /// Create a solver from the configured link dimensions.
    pub fn new(geometry: LinkageGeometry) -> Self {
        Self {
            l1: geometry.proximal_length.0,
            l2: geometry.distal_length.0,
            half_base: geometry.base_separation.0 / 2.0,
            elbow_sign: geometry.elbow.sign(),
        }
    }

    /// Solve inverse kinematics: find the motor angles that place the pen
    /// at `target`.
    ///
    /// Each axis is solved in its own local frame by the law of cosines.
    /// The elbow configuration is fixed by the geometry's [`ElbowMode`];
    /// only that root is ever produced.
    ///
    /// [`ElbowMode`]: crate::config::ElbowMode
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::Unreachable`] if either axis would need
    /// the links fully stretched past L1+L2 or folded inside |L1-L2|.
    pub fn inverse(&self, target: CartesianPoint) -> Result<JointAngles, KinematicsError> {
        let unreachable = KinematicsError::Unreachable {
            x: target.x,
            y: target.y,
        };

        let (alpha_left, beta_left) = self
            .bearing_and_elbow(target.x + self.half_base, target.y)
            .ok_or(unreachable.clone())?;
        let (alpha_right, beta_right) = self
            .bearing_and_elbow(target.x - self.half_base, target.y)
            .ok_or(unreachable)?;

        // The elbows mirror each other, so the half-angle enters with
        // opposite signs on the two sides.
        Ok(JointAngles {
            theta1: Degrees::from_radians(alpha_left + self.elbow_sign * beta_left),
            theta2: Degrees::from_radians(alpha_right - self.elbow_sign * beta_right),
        })
    }

    /// Solve forward kinematics: find the pen point implied by a pair of
    /// measured motor angles.
    ///
    /// Intersects the two distal circles (radius L2 around each elbow). Of
    /// the two intersection points, the one with the larger y-coordinate is
    /// returned; that is the forward-facing solution for this mechanism's
    /// mounting orientation.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::Degenerate`] if the elbows coincide or sit
    /// farther apart than 2 L2, in which case no real pen position exists.
    pub fn forward(
        &self,
        theta1: Degrees,
        theta2: Degrees,
    ) -> Result<CartesianPoint, KinematicsError> {
        let t1 = theta1.to_radians();
        let t2 = theta2.to_radians();

        let e1x = -self.half_base + self.l1 * cosf(t1);
        let e1y = self.l1 * sinf(t1);
        let e2x = self.half_base + self.l1 * cosf(t2);
        let e2y = self.l1 * sinf(t2);

        let dx = e2x - e1x;
        let dy = e2y - e1y;
        let dist_sq = dx * dx + dy * dy;
        let dist = sqrtf(dist_sq);

        if dist == 0.0 || dist > 2.0 * self.l2 {
            return Err(KinematicsError::Degenerate { separation: dist });
        }

        // Both circles share radius L2, so the chord midpoint lies halfway
        // along the elbow-to-elbow line.
        let a = dist_sq / (2.0 * dist);
        let h = sqrtf((self.l2 * self.l2 - a * a).max(0.0));

        let mx = e1x + a * dx / dist;
        let my = e1y + a * dy / dist;

        let first = CartesianPoint::new(mx - h * dy / dist, my + h * dx / dist);
        let second = CartesianPoint::new(mx + h * dy / dist, my - h * dx / dist);

        Ok(if first.y >= second.y { first } else { second })
    }

    /// Check whether both axes can reach `target` without stretching or
    /// folding past their limits.
    pub fn is_reachable(&self, target: CartesianPoint) -> bool {
        self.axis_in_reach(target.x + self.half_base, target.y)
            && self.axis_in_reach(target.x - self.half_base, target.y)
    }

    /// Check whether `target` lies inside the rectangular workspace bounds
    /// and is reachable by both axes.
    pub fn is_in_workspace(&self, target: CartesianPoint, safety: &SafetyConfig) -> bool {
        safety.in_bounds(target.x, target.y) && self.is_reachable(target)
    }

    /// Base bearing and elbow half-angle for one axis, in radians, with the
    /// target expressed in that axis's local frame.
    fn bearing_and_elbow(&self, dx: f32, dy: f32) -> Option<(f32, f32)> {
        let dist = sqrtf(dx * dx + dy * dy);

        if dist > self.l1 + self.l2 || dist < fabsf(self.l1 - self.l2) {
            return None;
        }

        let alpha = atan2f(dy, dx);
        let cos_beta = (self.l1 * self.l1 + dist * dist - self.l2 * self.l2)
            / (2.0 * self.l1 * dist);
        let beta = acosf(cos_beta.min(1.0).max(-1.0));

        Some((alpha, beta))
    }

    fn axis_in_reach(&self, dx: f32, dy: f32) -> bool {
        let dist = sqrtf(dx * dx + dy * dy);
        dist <= self.l1 + self.l2 && dist >= fabsf(self.l1 - self.l2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Millimeters;
    use crate::config::ElbowMode;

    fn reference_solver() -> LinkageSolver {
        LinkageSolver::new(LinkageGeometry::default())
    }

    fn custom_solver(l1: f32, l2: f32, d: f32, elbow: ElbowMode) -> LinkageSolver {
        LinkageSolver::new(LinkageGeometry {
            proximal_length: Millimeters(l1),
            distal_length: Millimeters(l2),
            base_separation: Millimeters(d),
            elbow,
        })
    }

    #[test]
    fn test_center_target_gives_mirror_pair() {
        let solver = reference_solver();
        let angles = solver.inverse(CartesianPoint::new(0.0, 150.0)).unwrap();

        // A target on the symmetry axis must produce mirrored shafts:
        // theta2 = 180 - theta1.
        let sum = angles.theta1.value() + angles.theta2.value();
        assert!((sum - 180.0).abs() < 0.01, "sum was {}", sum);
        assert!(angles.theta1.value() > 90.0);
        assert!(angles.theta2.value() < 90.0);
    }

    #[test]
    fn test_roundtrip_reproduces_target() {
        let solver = reference_solver();
        let targets = [
            CartesianPoint::new(0.0, 150.0),
            CartesianPoint::new(40.0, 120.0),
            CartesianPoint::new(-55.0, 180.0),
            CartesianPoint::new(10.0, 220.0),
        ];

        for target in targets {
            let angles = solver.inverse(target).unwrap();
            let point = solver.forward(angles.theta1, angles.theta2).unwrap();
            assert!(
                (point.x - target.x).abs() < 0.01 && (point.y - target.y).abs() < 0.01,
                "({}, {}) came back as ({}, {})",
                target.x,
                target.y,
                point.x,
                point.y
            );
        }
    }

    #[test]
    fn test_roundtrip_inward_elbow() {
        let solver = custom_solver(100.0, 150.0, 60.0, ElbowMode::Inward);
        let target = CartesianPoint::new(15.0, 140.0);

        let angles = solver.inverse(target).unwrap();
        let point = solver.forward(angles.theta1, angles.theta2).unwrap();
        assert!((point.x - target.x).abs() < 0.01);
        assert!((point.y - target.y).abs() < 0.01);
    }

    #[test]
    fn test_too_far_is_unreachable() {
        let solver = reference_solver();
        // 260 mm from the left axis exceeds L1 + L2 = 250.
        let result = solver.inverse(CartesianPoint::new(0.0, 260.0));
        assert!(matches!(
            result,
            Err(KinematicsError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_too_close_is_unreachable() {
        let solver = reference_solver();
        // 20 mm from the left axis is inside |L1 - L2| = 50.
        let result = solver.inverse(CartesianPoint::new(-30.0, 20.0));
        assert!(matches!(
            result,
            Err(KinematicsError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_coincident_elbows_degenerate() {
        // Zero base separation and equal shaft angles put both elbows on
        // the same point, which has no unique intersection.
        let solver = custom_solver(100.0, 150.0, 0.0, ElbowMode::Outward);
        let result = solver.forward(Degrees(90.0), Degrees(90.0));
        assert!(matches!(
            result,
            Err(KinematicsError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_split_elbows_degenerate() {
        // Short distal links cannot close the loop when the elbows point
        // away from each other.
        let solver = custom_solver(100.0, 40.0, 60.0, ElbowMode::Outward);
        let result = solver.forward(Degrees(180.0), Degrees(0.0));
        assert!(matches!(
            result,
            Err(KinematicsError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_forward_picks_larger_y() {
        let solver = reference_solver();
        let angles = solver.inverse(CartesianPoint::new(0.0, 150.0)).unwrap();
        let point = solver.forward(angles.theta1, angles.theta2).unwrap();

        // The mirrored solution for these shafts sits below the elbows;
        // the solver must return the forward-facing one.
        assert!(point.y > 0.0);
        assert!((point.y - 150.0).abs() < 0.01);
    }

    #[test]
    fn test_workspace_check() {
        let solver = reference_solver();
        let safety = SafetyConfig::default();

        assert!(solver.is_in_workspace(CartesianPoint::new(0.0, 150.0), &safety));
        // Reachable by the links but outside the rectangle.
        assert!(solver.is_reachable(CartesianPoint::new(-205.0, 50.0)));
        assert!(!solver.is_in_workspace(CartesianPoint::new(-205.0, 50.0), &safety));
        // Inside the rectangle but beyond the links.
        assert!(!solver.is_in_workspace(CartesianPoint::new(0.0, 255.0), &safety));
    }
}
