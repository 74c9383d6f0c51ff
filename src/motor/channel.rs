//! Per-joint command gating over a drive strategy.

use crate::config::units::Rpm;
use crate::error::MotorError;

use super::MotorDrive;

/// Command state for one joint's motor.
///
/// Stores the last commanded velocity and an enabled flag. Commands reach
/// the drive only while enabled; enabling re-applies the stored command so
/// a speed set while stopped takes effect on start. Disabling zeroes the
/// stored command and leaves the drive in its idle encoding.
#[derive(Debug)]
pub struct MotorChannel<D> {
    drive: D,
    command_rpm: Rpm,
    enabled: bool,
}

impl<D: MotorDrive> MotorChannel<D> {
    /// Wrap a drive, forcing it into the disabled state.
    pub fn new(mut drive: D) -> Result<Self, MotorError> {
        drive.set_enabled(false)?;
        Ok(Self {
            drive,
            command_rpm: Rpm(0.0),
            enabled: false,
        })
    }

    /// Record a velocity command and forward it to the drive while enabled.
    pub fn command(&mut self, rpm: Rpm) -> Result<(), MotorError> {
        self.command_rpm = rpm;
        if self.enabled {
            self.drive.apply(rpm)?;
        }
        Ok(())
    }

    /// Enable the drive and re-apply the stored command.
    pub fn enable(&mut self) -> Result<(), MotorError> {
        self.enabled = true;
        self.drive.set_enabled(true)?;
        self.drive.apply(self.command_rpm)
    }

    /// Zero the stored command and put the drive in its idle encoding.
    pub fn disable(&mut self) -> Result<(), MotorError> {
        self.enabled = false;
        self.command_rpm = Rpm(0.0);
        self.drive.set_enabled(false)
    }

    /// Whether commands currently reach the drive.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last commanded velocity.
    #[inline]
    pub fn command_rpm(&self) -> Rpm {
        self.command_rpm
    }

    /// Rated maximum speed of the underlying drive.
    #[inline]
    pub fn max_rpm(&self) -> Rpm {
        self.drive.max_rpm()
    }
}
