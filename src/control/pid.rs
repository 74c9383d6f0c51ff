//! PID position feedback fused with trajectory feedforward.

use crate::config::units::{Degrees, Rpm};
use crate::config::PidGains;

use super::shaper::Setpoint;

/// Per-joint velocity command source: PID on position error plus
/// velocity/acceleration feedforward from the trajectory shaper.
///
/// State is limited to the integrator and the previous error sample.
/// [`reset`] must be called whenever control is paused and resumed so the
/// derivative term does not spike on the first cycle back.
///
/// [`reset`]: PositionController::reset
#[derive(Debug, Clone, Copy)]
pub struct PositionController {
    gains: PidGains,
    integral: f32,
    previous_error: f32,
}

impl PositionController {
    /// Create a controller with the given gains and zeroed state.
    pub const fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Compute one cycle's velocity command.
    ///
    /// The integral is clamped after accumulation so that its contribution
    /// alone never exceeds the output ceiling; the combined output is
    /// clamped to the same ceiling. A non-positive `dt` contributes only the
    /// proportional and feedforward terms (no accumulation, no division).
    pub fn update(&mut self, setpoint: Setpoint, measured: Degrees, dt: f32) -> Rpm {
        let error = setpoint.position.value() - measured.value();

        let p = self.gains.kp * error;

        let (i, d) = if dt > 0.0 {
            self.integral += error * dt;
            if self.gains.ki > 0.0 {
                let bound = self.gains.max_output.value() / self.gains.ki;
                self.integral = self.integral.clamp(-bound, bound);
            }

            let i = self.gains.ki * self.integral;
            let d = self.gains.kd * (error - self.previous_error) / dt;
            (i, d)
        } else {
            (0.0, 0.0)
        };

        // Degrees/second to RPM, scaled by the velocity feedforward gain.
        let ff_velocity = (setpoint.velocity.value() / 360.0) * 60.0 * self.gains.kv;
        let ff_acceleration = setpoint.acceleration.value() * self.gains.ka;

        self.previous_error = error;

        let output = p + i + d + ff_velocity + ff_acceleration;
        let max = self.gains.max_output.value();
        Rpm(output.clamp(-max, max))
    }

    /// Zero the integrator and previous-error memory.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }
}
