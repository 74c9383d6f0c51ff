//! Pulse-frequency drive strategy.
//!
//! This motor family takes speed as a clock frequency on a dedicated pulse
//! input: `freq = |rpm| * pulses_per_rev / 60`. A START line enables the
//! power stage and a DIR line selects rotation direction.

use embedded_hal::digital::OutputPin;

use crate::config::units::Rpm;
use crate::error::MotorError;

use super::{Direction, MotorDrive};

/// Variable-frequency pulse generator feeding a motor's clock input.
///
/// `embedded-hal` 1.0 has no frequency-output abstraction, so drives that
/// speak pulse frequency take one of these. Implementations typically
/// reprogram a timer's auto-reload register and keep a 50% compare value.
pub trait PulseTrain {
    /// Error type returned by generator operations.
    type Error;

    /// Emit pulses at `hz` until reprogrammed or idled.
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Stop emitting pulses.
    fn set_idle(&mut self) -> Result<(), Self::Error>;
}

/// Drive strategy for pulse-frequency motors.
///
/// Generic over:
/// - `GEN`: pulse generator (must implement [`PulseTrain`])
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `EN`: START pin type (must implement `OutputPin`)
pub struct FrequencyDrive<GEN, DIR, EN>
where
    GEN: PulseTrain,
    DIR: OutputPin,
    EN: OutputPin,
{
    /// Pulse generator driving the motor's clock input.
    generator: GEN,

    /// DIR pin.
    direction_pin: DIR,

    /// START pin (high = enabled).
    enable_pin: EN,

    /// Command pulses per motor shaft revolution.
    pulses_per_rev: u32,

    /// Frequency floor; lower commands would stall the generator.
    min_frequency_hz: u32,

    /// Rated maximum speed.
    max_rpm: Rpm,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
}

impl<GEN, DIR, EN> FrequencyDrive<GEN, DIR, EN>
where
    GEN: PulseTrain,
    DIR: OutputPin,
    EN: OutputPin,
{
    /// Create a frequency drive over the given generator and pins.
    pub fn new(
        generator: GEN,
        direction_pin: DIR,
        enable_pin: EN,
        pulses_per_rev: u32,
        min_frequency_hz: u32,
        max_rpm: Rpm,
        invert_direction: bool,
    ) -> Self {
        Self {
            generator,
            direction_pin,
            enable_pin,
            pulses_per_rev,
            min_frequency_hz,
            max_rpm,
            current_direction: None,
            invert_direction,
        }
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), MotorError> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Clockwise => !self.invert_direction,
            Direction::CounterClockwise => self.invert_direction,
        };

        if pin_high {
            self.direction_pin
                .set_high()
                .map_err(|_| MotorError::PinError)?;
        } else {
            self.direction_pin
                .set_low()
                .map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }
}

impl<GEN, DIR, EN> MotorDrive for FrequencyDrive<GEN, DIR, EN>
where
    GEN: PulseTrain,
    DIR: OutputPin,
    EN: OutputPin,
{
    fn apply(&mut self, rpm: Rpm) -> Result<(), MotorError> {
        let clamped = rpm
            .value()
            .clamp(-self.max_rpm.value(), self.max_rpm.value());

        // Zero command idles the pulse output; direction is left alone.
        if clamped == 0.0 {
            return self.generator.set_idle().map_err(|_| MotorError::OutputError);
        }

        self.set_direction(Direction::from_velocity(clamped))?;

        // RPM to pulse frequency, floored so the generator never stalls.
        let frequency_hz =
            (libm::fabsf(clamped) * self.pulses_per_rev as f32 / 60.0) as u32;
        let frequency_hz = frequency_hz.max(self.min_frequency_hz);

        self.generator
            .set_frequency(frequency_hz)
            .map_err(|_| MotorError::OutputError)
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), MotorError> {
        if enabled {
            self.enable_pin.set_high().map_err(|_| MotorError::PinError)
        } else {
            self.enable_pin.set_low().map_err(|_| MotorError::PinError)?;
            self.generator.set_idle().map_err(|_| MotorError::OutputError)
        }
    }

    fn max_rpm(&self) -> Rpm {
        self.max_rpm
    }
}
