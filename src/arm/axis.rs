//! Per-joint control stack.

use crate::config::units::{Degrees, DegreesPerSec, DegreesPerSecSquared, Rpm};
use crate::config::JointConfig;
use crate::control::{PositionController, TrajectoryShaper};
use crate::encoder::{EncoderChannel, QuadratureCounter};
use crate::error::MotorError;
use crate::motor::{MotorChannel, MotorDrive};

/// One joint's complete control chain: encoder in, motor command out.
///
/// # Generic Parameters
///
/// * `C` - Quadrature counter peripheral feeding the encoder channel
/// * `D` - Motor drive strategy receiving velocity commands
#[derive(Debug)]
pub struct JointAxis<C, D> {
    encoder: EncoderChannel<C>,
    shaper: TrajectoryShaper,
    controller: PositionController,
    motor: MotorChannel<D>,
    max_velocity: DegreesPerSec,
    max_acceleration: DegreesPerSecSquared,
}

impl<C, D> JointAxis<C, D>
where
    C: QuadratureCounter,
    D: MotorDrive,
{
    /// Assembles an axis from its peripherals and joint configuration.
    ///
    /// The motor starts disabled; call [`enable`](Self::enable) (or let the
    /// control loop do it) before commands reach the hardware.
    pub fn new(counter: C, drive: D, config: &JointConfig) -> Result<Self, MotorError> {
        Ok(Self {
            encoder: EncoderChannel::new(counter, config),
            shaper: TrajectoryShaper::new(),
            controller: PositionController::new(config.gains),
            motor: MotorChannel::new(drive)?,
            max_velocity: config.max_velocity,
            max_acceleration: config.max_acceleration,
        })
    }

    /// Reads the counter and refreshes the angle and velocity estimates.
    pub fn sample(&mut self, now_ms: u32) {
        self.encoder.sample(now_ms);
    }

    /// Runs one closed-loop cycle toward `target` and commands the motor.
    pub fn track(&mut self, target: Degrees, dt: f32) -> Result<(), MotorError> {
        let setpoint = self
            .shaper
            .update(target, dt, self.max_velocity, self.max_acceleration);
        let command = self.controller.update(setpoint, self.encoder.angle(), dt);
        self.motor.command(command)
    }

    /// Re-bases the shaper and controller on the measured angle.
    ///
    /// Called when tracking (re)starts so stale filter and integrator state
    /// cannot produce a command spike on the first cycle.
    pub fn rebase(&mut self) {
        self.shaper.reset(self.encoder.angle());
        self.controller.reset();
    }

    /// Commands a velocity directly, bypassing shaping and feedback.
    pub fn command(&mut self, rpm: Rpm) -> Result<(), MotorError> {
        self.motor.command(rpm)
    }

    /// Enables the motor and re-applies the stored command.
    pub fn enable(&mut self) -> Result<(), MotorError> {
        self.motor.enable()
    }

    /// Disables the motor and clears the stored command.
    pub fn disable(&mut self) -> Result<(), MotorError> {
        self.motor.disable()
    }

    /// Measured output-shaft angle.
    #[inline]
    pub fn angle(&self) -> Degrees {
        self.encoder.angle()
    }

    /// Measured output-shaft velocity.
    #[inline]
    pub fn velocity(&self) -> Rpm {
        self.encoder.velocity()
    }

    /// Most recent velocity command.
    #[inline]
    pub fn command_rpm(&self) -> Rpm {
        self.motor.command_rpm()
    }

    /// Whether the motor is currently enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.motor.is_enabled()
    }

    /// Rated maximum speed of the motor.
    #[inline]
    pub fn max_rpm(&self) -> Rpm {
        self.motor.max_rpm()
    }
}
