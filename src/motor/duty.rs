//! Inverted duty-cycle drive strategy.
//!
//! This motor family reads speed from PWM duty with inverted polarity: full
//! duty is stop, zero duty is full rated speed. A BRAKE line gates motion
//! independent of duty and is active-low (high = run).

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::units::Rpm;
use crate::error::MotorError;

use super::{Direction, MotorDrive};

/// Drive strategy for inverted duty-cycle motors.
///
/// Generic over:
/// - `PWM`: speed output (must implement `SetDutyCycle`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `BRAKE`: BRAKE pin type (must implement `OutputPin`)
pub struct DutyCycleDrive<PWM, DIR, BRAKE>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
    BRAKE: OutputPin,
{
    /// Speed PWM output.
    pwm: PWM,

    /// DIR pin.
    direction_pin: DIR,

    /// BRAKE pin (low = brake, high = run).
    brake_pin: BRAKE,

    /// Rated maximum speed (the zero-duty end of the scale).
    max_rpm: Rpm,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,
}

impl<PWM, DIR, BRAKE> DutyCycleDrive<PWM, DIR, BRAKE>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
    BRAKE: OutputPin,
{
    /// Create a duty-cycle drive over the given PWM output and pins.
    pub fn new(
        pwm: PWM,
        direction_pin: DIR,
        brake_pin: BRAKE,
        max_rpm: Rpm,
        invert_direction: bool,
    ) -> Self {
        Self {
            pwm,
            direction_pin,
            brake_pin,
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

impl<PWM, DIR, BRAKE> MotorDrive for DutyCycleDrive<PWM, DIR, BRAKE>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
    BRAKE: OutputPin,
{
    fn apply(&mut self, rpm: Rpm) -> Result<(), MotorError> {
        let clamped = rpm
            .value()
            .clamp(-self.max_rpm.value(), self.max_rpm.value());

        self.set_direction(Direction::from_velocity(clamped))?;

        let ratio = libm::fabsf(clamped) / self.max_rpm.value();
        let max_duty = self.pwm.max_duty_cycle();

        // Inverted encoding: full duty is stop, zero duty is full speed.
        let duty = (max_duty as f32 * (1.0 - ratio)) as u16;
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| MotorError::OutputError)
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), MotorError> {
        if enabled {
            self.brake_pin.set_high().map_err(|_| MotorError::PinError)
        } else {
            self.brake_pin.set_low().map_err(|_| MotorError::PinError)?;

            // Park the compare value at the stop encoding.
            let max_duty = self.pwm.max_duty_cycle();
            self.pwm
                .set_duty_cycle(max_duty)
                .map_err(|_| MotorError::OutputError)
        }
    }

    fn max_rpm(&self) -> Rpm {
        self.max_rpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FakePwm {
        duty: u16,
    }

    impl FakePwm {
        fn new() -> Self {
            Self { duty: 0 }
        }
    }

    impl embedded_hal::pwm::ErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    fn test_drive() -> DutyCycleDrive<FakePwm, FakePin, FakePin> {
        DutyCycleDrive::new(
            FakePwm::new(),
            FakePin::default(),
            FakePin::default(),
            Rpm(6300.0),
            false,
        )
    }

    #[test]
    fn test_duty_is_inverted() {
        let mut drive = test_drive();

        // Half of max RPM parks the compare value at half duty.
        drive.apply(Rpm(3150.0)).unwrap();
        assert_eq!(drive.pwm.duty, 500);

        // Zero command is full duty (stop encoding).
        drive.apply(Rpm(0.0)).unwrap();
        assert_eq!(drive.pwm.duty, 1000);

        // Full rated speed is zero duty.
        drive.apply(Rpm(6300.0)).unwrap();
        assert_eq!(drive.pwm.duty, 0);
    }

    #[test]
    fn test_command_clamped_to_max_rpm() {
        let mut drive = test_drive();
        drive.apply(Rpm(10000.0)).unwrap();
        assert_eq!(drive.pwm.duty, 0);
    }

    #[test]
    fn test_direction_pin_follows_sign() {
        let mut drive = test_drive();

        drive.apply(Rpm(1000.0)).unwrap();
        assert!(drive.direction_pin.high);

        drive.apply(Rpm(-1000.0)).unwrap();
        assert!(!drive.direction_pin.high);

        // Magnitude encodes identically in both directions.
        let forward_duty = {
            drive.apply(Rpm(1000.0)).unwrap();
            drive.pwm.duty
        };
        drive.apply(Rpm(-1000.0)).unwrap();
        assert_eq!(drive.pwm.duty, forward_duty);
    }

    #[test]
    fn test_disable_brakes_and_parks_duty() {
        let mut drive = test_drive();
        drive.set_enabled(true).unwrap();
        assert!(drive.brake_pin.high);

        drive.apply(Rpm(2000.0)).unwrap();
        drive.set_enabled(false).unwrap();
        assert!(!drive.brake_pin.high);
        assert_eq!(drive.pwm.duty, 1000);
    }
}
