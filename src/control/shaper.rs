//! Feedforward synthesis from a raw position target.

use crate::config::units::{Degrees, DegreesPerSec, DegreesPerSecSquared};

/// Single-pole low-pass weight applied to the raw velocity estimate.
const VELOCITY_FILTER_ALPHA: f32 = 0.7;

/// One cycle's smoothed trajectory reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    /// Target position (passed through unmodified).
    pub position: Degrees,

    /// Filtered target velocity, within the configured maximum.
    pub velocity: DegreesPerSec,

    /// Derivative of the filtered velocity, within the configured maximum.
    pub acceleration: DegreesPerSecSquared,
}

/// Synthesizes bounded velocity and acceleration feedforward from a raw,
/// possibly step-like, target angle.
///
/// The velocity estimate is low-pass filtered before differentiating it
/// into an acceleration, so the two stay consistent with each other and the
/// feedforward path never asks the actuator for more than its limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryShaper {
    previous_target: f32,
    previous_velocity: f32,
}

impl TrajectoryShaper {
    /// Create a shaper with zeroed history.
    pub const fn new() -> Self {
        Self {
            previous_target: 0.0,
            previous_velocity: 0.0,
        }
    }

    /// Produce this cycle's setpoint from the raw target.
    ///
    /// The raw velocity `(target - previous) / dt` is clamped to
    /// `max_velocity`, low-pass filtered, then differentiated and clamped to
    /// `max_acceleration`. A non-positive `dt` leaves the filter state
    /// untouched and reports the previous velocity with zero acceleration.
    pub fn update(
        &mut self,
        target: Degrees,
        dt: f32,
        max_velocity: DegreesPerSec,
        max_acceleration: DegreesPerSecSquared,
    ) -> Setpoint {
        if dt <= 0.0 {
            return Setpoint {
                position: target,
                velocity: DegreesPerSec(self.previous_velocity),
                acceleration: DegreesPerSecSquared(0.0),
            };
        }

        let raw_velocity = ((target.value() - self.previous_target) / dt)
            .clamp(-max_velocity.value(), max_velocity.value());

        let velocity = VELOCITY_FILTER_ALPHA * raw_velocity
            + (1.0 - VELOCITY_FILTER_ALPHA) * self.previous_velocity;

        let acceleration = ((velocity - self.previous_velocity) / dt)
            .clamp(-max_acceleration.value(), max_acceleration.value());

        self.previous_target = target.value();
        self.previous_velocity = velocity;

        Setpoint {
            position: target,
            velocity: DegreesPerSec(velocity),
            acceleration: DegreesPerSecSquared(acceleration),
        }
    }

    /// Re-base the filter on `current_target` and zero the velocity history.
    ///
    /// Called when tracking (re)starts so a stale previous target cannot
    /// produce a spurious velocity spike on the first cycle.
    pub fn reset(&mut self, current_target: Degrees) {
        self.previous_target = current_target.value();
        self.previous_velocity = 0.0;
    }
}
