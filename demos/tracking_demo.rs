//! Closed-loop Cartesian tracking example.
//!
//! Demonstrates loading an arm configuration from TOML, solving linkage
//! kinematics directly, and running the control loop against a simulated
//! pair of joints until the pen reaches a target, including what happens
//! when a target drags the pen through the safety fence.
//!
//! The motors and encoders are simulated, so this example runs without
//! real hardware.

use core::cell::Cell;

use fivebar_motion::arm::{ArmState, ControlLoop};
use fivebar_motion::config::units::{Millimeters, Rpm};
use fivebar_motion::config::{parse_config, JointId};
use fivebar_motion::encoder::QuadratureCounter;
use fivebar_motion::error::MotorError;
use fivebar_motion::kinematics::{CartesianPoint, LinkageSolver};
use fivebar_motion::motor::MotorDrive;

/// Control period of the simulated loop, in seconds.
const DT: f32 = 0.01;

/// Simulated joint: the drive stores the commanded motor speed and
/// `advance` integrates it into encoder pulses, as a motor with no load
/// inertia would.
struct SimJoint {
    pulses: Cell<f32>,
    rpm: Cell<f32>,
}

impl SimJoint {
    fn new() -> Self {
        Self {
            pulses: Cell::new(0.0),
            rpm: Cell::new(0.0),
        }
    }

    /// Integrate the commanded speed over `dt` seconds (400 quadrature
    /// counts per motor revolution).
    fn advance(&self, dt: f32) {
        let pulses_per_sec = self.rpm.get() * 400.0 / 60.0;
        self.pulses.set(self.pulses.get() + pulses_per_sec * dt);
    }
}

struct SimCounter<'a>(&'a SimJoint);

impl QuadratureCounter for SimCounter<'_> {
    fn count(&mut self) -> u32 {
        (self.0.pulses.get() as i64).rem_euclid(65_536) as u32
    }

    fn period(&self) -> u32 {
        65_535
    }

    fn reset(&mut self) {
        self.0.pulses.set(0.0);
    }
}

struct SimDrive<'a>(&'a SimJoint);

impl MotorDrive for SimDrive<'_> {
    fn apply(&mut self, rpm: Rpm) -> Result<(), MotorError> {
        self.0.rpm.set(rpm.value());
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), MotorError> {
        if !enabled {
            self.0.rpm.set(0.0);
        }
        Ok(())
    }

    fn max_rpm(&self) -> Rpm {
        Rpm(6300.0)
    }
}

fn main() {
    println!("=== Five-Bar Tracking Example ===\n");

    // Load and validate a configuration
    let toml_content = r#"
[geometry]
proximal_length_mm = 100.0
distal_length_mm = 150.0
base_separation_mm = 60.0
elbow = "outward"

[safety]
fence_min_y_mm = 10.0
workspace_x_mm = [-200.0, 200.0]
workspace_y_mm = [0.0, 280.0]

[arm]
initial_target_mm = [0.0, 150.0]

[joints.left]
name = "shoulder_left"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "pulse_frequency", pulses_per_rev = 400, min_frequency_hz = 100 }

[joints.right]
name = "shoulder_right"
encoder_ppr = 100.0
gear_ratio = 30.0
max_rpm = 6300.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 8.0, ki = 0.2, kd = 0.0, kv = 1.0, ka = 0.15, max_output = 4000.0 }
drive = { kind = "duty_cycle" }
"#;

    let config = parse_config(toml_content).expect("Failed to parse config");
    println!(
        "Configuration validated: links {}/{} mm, base {} mm, fence at y = {} mm",
        config.geometry.proximal_length.0,
        config.geometry.distal_length.0,
        config.geometry.base_separation.0,
        config.safety.fence_min_y.0,
    );

    // Solve kinematics directly
    println!("\n=== Linkage Solver ===");
    let solver = LinkageSolver::new(config.geometry);
    for (x, y) in [(0.0, 150.0), (60.0, 120.0), (-80.0, 180.0)] {
        let target = CartesianPoint::new(x, y);
        match solver.inverse(target) {
            Ok(angles) => {
                let back = solver
                    .forward(angles.theta1, angles.theta2)
                    .expect("solution should be consistent");
                println!(
                    "  ({:>6.1}, {:>6.1}) mm -> shafts ({:>7.2}, {:>7.2}) deg -> ({:>6.1}, {:>6.1}) mm",
                    x,
                    y,
                    angles.theta1.value(),
                    angles.theta2.value(),
                    back.x,
                    back.y,
                );
            }
            Err(e) => println!("  ({:>6.1}, {:>6.1}) mm -> {}", x, y, e),
        }
    }

    // Assemble the control loop over simulated joints
    let (left, right) = (SimJoint::new(), SimJoint::new());
    let mut arm = ControlLoop::new(
        &config,
        SimCounter(&left),
        SimDrive(&left),
        SimCounter(&right),
        SimDrive(&right),
    )
    .expect("Failed to assemble control loop");

    println!("\n=== Closed-Loop Tracking ===");
    let start = arm.cartesian_position().expect("zero pose is solvable");
    println!("Pen starts at ({:.1}, {:.1}) mm, state {:?}", start.x, start.y, arm.state());

    arm.set_target_position(Millimeters(0.0), Millimeters(150.0))
        .expect("target should be accepted");
    println!("Tracking target (0.0, 150.0) mm\n");

    println!("{:>7} {:>9} {:>9} {:>11} {:>11}", "time_s", "pen_x_mm", "pen_y_mm", "left_rpm", "right_rpm");
    for tick in 1..=1200 {
        left.advance(DT);
        right.advance(DT);
        arm.tick(DT).expect("tick failed");

        if tick % 200 == 0 {
            let status = arm.status();
            let pen = status.position.expect("measured pose is solvable");
            println!(
                "{:>7.1} {:>9.2} {:>9.2} {:>11.1} {:>11.1}",
                tick as f32 * DT,
                pen.x,
                pen.y,
                status.left.command.value(),
                status.right.command.value(),
            );
        }
    }

    let pen = arm.cartesian_position().expect("measured pose is solvable");
    println!(
        "\nAfter 12 s: pen at ({:.2}, {:.2}) mm, shafts ({:.2}, {:.2}) deg",
        pen.x,
        pen.y,
        arm.angle(JointId::Left).value(),
        arm.angle(JointId::Right).value(),
    );

    // Drag the pen toward the fence and watch the loop latch
    println!("\n=== Safety Fence ===");
    println!("Re-targeting to (120.0, 8.0) mm, below the {} mm fence", config.safety.fence_min_y.0);
    arm.set_target_position(Millimeters(120.0), Millimeters(8.0))
        .expect("target should be accepted");

    let mut tripped_after = None;
    for tick in 1..=3000 {
        left.advance(DT);
        right.advance(DT);
        arm.tick(DT).expect("tick failed");
        if arm.state() == ArmState::Stopped {
            tripped_after = Some(tick as f32 * DT);
            break;
        }
    }

    match tripped_after {
        Some(t) => {
            let pen = arm.cartesian_position().expect("measured pose is solvable");
            println!("Fence tripped after {:.2} s at pen y = {:.2} mm", t, pen.y);
            println!("State: {:?}, commands zeroed, targets ignored until resume", arm.state());
        }
        None => println!("Fence never tripped (unexpected for this target)"),
    }

    arm.resume();
    arm.set_target_position(Millimeters(0.0), Millimeters(150.0))
        .expect("target should be accepted");
    println!("Resumed; tracking (0.0, 150.0) mm again, state {:?}", arm.state());

    println!("\n=== Example Complete ===");
    println!("On hardware, back the loop with timer-encoder counters and PWM drives instead.");
}
