//! Fixed-rate control loop over both joints.

use crate::config::units::{Degrees, Millimeters, Rpm};
use crate::config::{validate_config, JointId, SafetyConfig, SystemConfig};
use crate::encoder::QuadratureCounter;
use crate::error::{MotorError, Result};
use crate::kinematics::{CartesianPoint, JointAngles, LinkageSolver};
use crate::motor::MotorDrive;

use super::axis::JointAxis;

/// Operating state of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmState {
    /// Motors disabled, no active target. Encoders are still sampled.
    Idle,
    /// Closed-loop Cartesian tracking of the stored target.
    Tracking,
    /// Latched safety stop. Motors stay disabled and targets are ignored
    /// until [`ControlLoop::resume`] is called.
    Stopped,
    /// Characterization session: stored test speeds drive the motors
    /// directly and the tracking pipeline is bypassed.
    TestOverride,
}

/// Per-joint slice of a status snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointStatus {
    /// Measured output-shaft angle.
    pub angle: Degrees,
    /// Measured output-shaft velocity.
    pub velocity: Rpm,
    /// Most recent motor command.
    pub command: Rpm,
}

/// Snapshot of the whole arm at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmStatus {
    /// Current loop state.
    pub state: ArmState,
    /// Left joint measurements and command.
    pub left: JointStatus,
    /// Right joint measurements and command.
    pub right: JointStatus,
    /// Pen position from forward kinematics of the measured angles, or
    /// `None` when the measured pose has no solution.
    pub position: Option<CartesianPoint>,
}

/// Both joints, the linkage solver, and the safety fence behind a single
/// fixed-rate entry point.
///
/// Call [`tick`](Self::tick) once per control period (1 ms on the
/// reference hardware). Every tick samples both encoders regardless of
/// state; only [`Tracking`](ArmState::Tracking) runs the kinematics and
/// control pipeline, and only [`TestOverride`](ArmState::TestOverride)
/// forwards the stored test speeds.
///
/// # Generic Parameters
///
/// * `LC`/`RC` - Quadrature counters for the left and right encoders
/// * `LD`/`RD` - Drive strategies for the left and right motors
///
/// # Example
///
/// ```rust,ignore
/// use fivebar_motion::arm::ControlLoop;
/// use fivebar_motion::config::{Millimeters, SystemConfig};
///
/// let config = SystemConfig::default();
/// let mut arm = ControlLoop::new(&config, lc, ld, rc, rd)?;
///
/// arm.set_target_position(Millimeters(40.0), Millimeters(160.0))?;
/// loop {
///     arm.tick(0.001)?;
///     // wait for the next 1 ms boundary
/// }
/// ```
#[derive(Debug)]
pub struct ControlLoop<LC, LD, RC, RD> {
    solver: LinkageSolver,
    safety: SafetyConfig,
    left: JointAxis<LC, LD>,
    right: JointAxis<RC, RD>,
    state: ArmState,
    target: CartesianPoint,
    /// Last joint-space solution of the Cartesian target. Held across
    /// unreachable targets so the arm stands still instead of lurching.
    held_targets: Option<JointAngles>,
    test_speeds: (Rpm, Rpm),
    clock_ms: u32,
}

impl<LC, LD, RC, RD> ControlLoop<LC, LD, RC, RD>
where
    LC: QuadratureCounter,
    LD: MotorDrive,
    RC: QuadratureCounter,
    RD: MotorDrive,
{
    /// Validates the configuration and assembles the loop in [`ArmState::Idle`].
    ///
    /// Both motors start disabled. The initial Cartesian target comes from
    /// the configuration but is not tracked until
    /// [`set_target_position`](Self::set_target_position) is called.
    pub fn new(
        config: &SystemConfig,
        left_counter: LC,
        left_drive: LD,
        right_counter: RC,
        right_drive: RD,
    ) -> Result<Self> {
        validate_config(config)?;

        let [x, y] = config.arm.initial_target;

        Ok(Self {
            solver: LinkageSolver::new(config.geometry),
            safety: config.safety,
            left: JointAxis::new(left_counter, left_drive, &config.joints.left)?,
            right: JointAxis::new(right_counter, right_drive, &config.joints.right)?,
            state: ArmState::Idle,
            target: CartesianPoint::new(x.0, y.0),
            held_targets: None,
            test_speeds: (Rpm(0.0), Rpm(0.0)),
            clock_ms: 0,
        })
    }

    /// Runs one control cycle.
    ///
    /// `dt` is the elapsed time since the previous tick in seconds. The
    /// internal millisecond clock advances by the rounded equivalent, so
    /// repeated nominal periods do not drift from f32 truncation.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.clock_ms = self.clock_ms.wrapping_add((dt * 1000.0 + 0.5) as u32);
        self.left.sample(self.clock_ms);
        self.right.sample(self.clock_ms);

        match self.state {
            ArmState::Idle | ArmState::Stopped => Ok(()),
            ArmState::TestOverride => {
                let (left_rpm, right_rpm) = self.test_speeds;
                self.left.command(left_rpm)?;
                self.right.command(right_rpm)?;
                Ok(())
            }
            ArmState::Tracking => self.tick_tracking(dt),
        }
    }

    fn tick_tracking(&mut self, dt: f32) -> Result<()> {
        let targets = match self.solver.inverse(self.target) {
            Ok(angles) => {
                self.held_targets = Some(angles);
                angles
            }
            // Unreachable target: hold the last solvable joint targets,
            // or the measured pose before any solve has succeeded.
            Err(_) => self.held_targets.unwrap_or(JointAngles {
                theta1: self.left.angle(),
                theta2: self.right.angle(),
            }),
        };

        // Fence check on the measured pose. A degenerate measured pose has
        // no pen position to compare, so the check is skipped rather than
        // treated as a violation.
        if let Ok(position) = self.solver.forward(self.left.angle(), self.right.angle()) {
            if self.safety.below_fence(position.y) {
                self.stop()?;
                return Ok(());
            }
        }

        self.left.track(targets.theta1, dt)?;
        self.right.track(targets.theta2, dt)?;
        Ok(())
    }

    /// Stores a new Cartesian target and enters [`ArmState::Tracking`].
    ///
    /// Shapers and controllers are re-based on the measured angles first,
    /// so the transition never replays stale filter state. Ignored while
    /// stopped (the latch holds until [`resume`](Self::resume)) and during
    /// a test session; check [`state`](Self::state) to observe the
    /// rejection.
    pub fn set_target_position(&mut self, x: Millimeters, y: Millimeters) -> Result<()> {
        match self.state {
            ArmState::Stopped | ArmState::TestOverride => Ok(()),
            ArmState::Idle | ArmState::Tracking => {
                self.target = CartesianPoint::new(x.0, y.0);
                self.left.rebase();
                self.right.rebase();
                self.left.enable()?;
                self.right.enable()?;
                self.state = ArmState::Tracking;
                Ok(())
            }
        }
    }

    /// Disables both motors and latches [`ArmState::Stopped`].
    ///
    /// The state latches before the pins are touched, so a failed disable
    /// can never leave the loop believing it is still tracking.
    pub fn stop(&mut self) -> Result<()> {
        self.state = ArmState::Stopped;
        self.left.disable()?;
        self.right.disable()?;
        Ok(())
    }

    /// Releases a latched stop, returning to [`ArmState::Idle`].
    ///
    /// Motors stay disabled; the target must be re-issued through
    /// [`set_target_position`](Self::set_target_position). Does nothing in
    /// any other state.
    pub fn resume(&mut self) {
        if self.state == ArmState::Stopped {
            self.state = ArmState::Idle;
        }
    }

    /// Enters [`ArmState::TestOverride`] with both motors enabled at zero
    /// speed.
    ///
    /// Test speeds always start at zero; anything stored by an earlier
    /// session has been cleared. Ignored while stopped and when already in
    /// a test session.
    pub fn enter_test_mode(&mut self) -> Result<()> {
        match self.state {
            ArmState::Stopped | ArmState::TestOverride => Ok(()),
            ArmState::Idle | ArmState::Tracking => {
                self.test_speeds = (Rpm(0.0), Rpm(0.0));
                self.left.command(Rpm(0.0))?;
                self.right.command(Rpm(0.0))?;
                self.left.enable()?;
                self.right.enable()?;
                self.state = ArmState::TestOverride;
                Ok(())
            }
        }
    }

    /// Leaves the test session: disables both motors, then returns to
    /// [`ArmState::Idle`]. Does nothing outside [`ArmState::TestOverride`].
    pub fn exit_test_mode(&mut self) -> Result<()> {
        if self.state != ArmState::TestOverride {
            return Ok(());
        }
        self.left.disable()?;
        self.right.disable()?;
        self.state = ArmState::Idle;
        Ok(())
    }

    /// Stores per-joint test speeds, applied on every tick while in
    /// [`ArmState::TestOverride`]. Entering a test session resets both to
    /// zero.
    pub fn set_test_speeds(&mut self, left: Rpm, right: Rpm) {
        self.test_speeds = (left, right);
    }

    /// Exclusive characterization access to the left axis and the loop
    /// clock. `Some` only during [`ArmState::TestOverride`].
    pub fn test_handle_left(&mut self) -> Option<TestHandle<'_, LC, LD>> {
        if self.state != ArmState::TestOverride {
            return None;
        }
        Some(TestHandle {
            axis: &mut self.left,
            clock_ms: &mut self.clock_ms,
        })
    }

    /// Exclusive characterization access to the right axis and the loop
    /// clock. `Some` only during [`ArmState::TestOverride`].
    pub fn test_handle_right(&mut self) -> Option<TestHandle<'_, RC, RD>> {
        if self.state != ArmState::TestOverride {
            return None;
        }
        Some(TestHandle {
            axis: &mut self.right,
            clock_ms: &mut self.clock_ms,
        })
    }

    /// Current loop state.
    #[inline]
    pub fn state(&self) -> ArmState {
        self.state
    }

    /// Stored Cartesian target.
    #[inline]
    pub fn target(&self) -> CartesianPoint {
        self.target
    }

    /// Internal clock, milliseconds since construction.
    #[inline]
    pub fn clock_ms(&self) -> u32 {
        self.clock_ms
    }

    /// Measured angle of one joint.
    pub fn angle(&self, joint: JointId) -> Degrees {
        match joint {
            JointId::Left => self.left.angle(),
            JointId::Right => self.right.angle(),
        }
    }

    /// Measured velocity of one joint.
    pub fn velocity(&self, joint: JointId) -> Rpm {
        match joint {
            JointId::Left => self.left.velocity(),
            JointId::Right => self.right.velocity(),
        }
    }

    /// Pen position from forward kinematics of the measured angles.
    pub fn cartesian_position(&self) -> Result<CartesianPoint> {
        Ok(self
            .solver
            .forward(self.left.angle(), self.right.angle())?)
    }

    /// Snapshot of state, per-joint measurements, and pen position.
    pub fn status(&self) -> ArmStatus {
        ArmStatus {
            state: self.state,
            left: JointStatus {
                angle: self.left.angle(),
                velocity: self.left.velocity(),
                command: self.left.command_rpm(),
            },
            right: JointStatus {
                angle: self.right.angle(),
                velocity: self.right.velocity(),
                command: self.right.command_rpm(),
            },
            position: self
                .solver
                .forward(self.left.angle(), self.right.angle())
                .ok(),
        }
    }
}

/// Exclusive access to one axis for characterization runs.
///
/// Handed out by [`ControlLoop::test_handle_left`] and
/// [`ControlLoop::test_handle_right`] only during
/// [`ArmState::TestOverride`]. The handle mutably borrows the loop, so the
/// scheduled control path cannot run while a characterization run owns the
/// axis, and the run advances the loop's own clock so velocity estimation
/// stays continuous afterward.
#[derive(Debug)]
pub struct TestHandle<'a, C, D> {
    axis: &'a mut JointAxis<C, D>,
    clock_ms: &'a mut u32,
}

impl<C, D> TestHandle<'_, C, D>
where
    C: QuadratureCounter,
    D: MotorDrive,
{
    /// Advances the shared loop clock.
    pub fn advance(&mut self, ms: u32) {
        *self.clock_ms = self.clock_ms.wrapping_add(ms);
    }

    /// Current loop time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u32 {
        *self.clock_ms
    }

    /// Samples the axis encoder at the current loop time.
    pub fn sample(&mut self) {
        self.axis.sample(*self.clock_ms);
    }

    /// Measured output-shaft angle.
    #[inline]
    pub fn angle(&self) -> Degrees {
        self.axis.angle()
    }

    /// Measured output-shaft velocity.
    #[inline]
    pub fn velocity(&self) -> Rpm {
        self.axis.velocity()
    }

    /// Commands a velocity directly.
    pub fn command(&mut self, rpm: Rpm) -> core::result::Result<(), MotorError> {
        self.axis.command(rpm)
    }

    /// Rated maximum speed of the axis motor.
    #[inline]
    pub fn max_rpm(&self) -> Rpm {
        self.axis.max_rpm()
    }
}
