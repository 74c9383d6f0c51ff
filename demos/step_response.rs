//! Joint characterization example.
//!
//! Runs the characterization harness against a simulated joint: a step
//! response with full metrics, a sine-tracking run, a CSV export of the
//! sample log, and a proportional gain sweep. The control loop stays in
//! test mode for the whole session and returns to idle afterward.
//!
//! The motor and encoder are simulated, so this example runs without real
//! hardware.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use fivebar_motion::arm::{ArmState, ControlLoop};
use fivebar_motion::config::units::{Degrees, Rpm};
use fivebar_motion::config::SystemConfig;
use fivebar_motion::encoder::QuadratureCounter;
use fivebar_motion::error::MotorError;
use fivebar_motion::motor::MotorDrive;
use fivebar_motion::tuning::{CharacterizationHarness, PerformanceMetrics, DEFAULT_TEST_GAIN};

/// Simulated joint: the drive stores the commanded motor speed and the
/// delay integrates it into encoder pulses while the harness waits out
/// each sample period.
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
        Rpm(6000.0)
    }
}

/// Stands in for the sample-period timer: waiting is what moves the
/// simulated joint.
struct SimDelay<'a>(&'a SimJoint);

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance(ns as f32 / 1_000_000_000.0);
    }
}

fn print_metrics(m: &PerformanceMetrics) {
    println!("  Samples:            {}", m.num_samples);
    println!("  IAE:                {:.3} deg·s", m.iae);
    println!("  ISE:                {:.3} deg²·s", m.ise);
    println!("  ITAE:               {:.3} deg·s²", m.itae);
    println!("  Max error:          {:.3} deg", m.max_error.value());
    println!("  Steady-state error: {:.3} deg", m.steady_state_error.value());
    println!("  Overshoot:          {:.1} %", m.overshoot_percent);
    println!("  Rise time:          {:.0} ms", m.rise_time_ms);
    println!("  Settling time:      {:.0} ms", m.settling_time_ms);
    println!("  Peak time:          {:.0} ms", m.peak_time_ms);
    println!(
        "  Verdict:            stable = {}, oscillating = {}",
        m.is_stable, m.is_oscillating
    );
}

fn main() {
    println!("=== Joint Characterization Example ===\n");

    let config = SystemConfig::default();
    let (left, right) = (SimJoint::new(), SimJoint::new());
    let mut arm = ControlLoop::new(
        &config,
        SimCounter(&left),
        SimDrive(&left),
        SimCounter(&right),
        SimDrive(&right),
    )
    .expect("Failed to assemble control loop");

    arm.enter_test_mode().expect("Failed to enter test mode");
    println!("Loop state: {:?}", arm.state());
    println!("Default drive law: {} RPM per degree of error", DEFAULT_TEST_GAIN);

    {
        let handle = arm
            .test_handle_left()
            .expect("test mode grants the left handle");
        let mut harness = CharacterizationHarness::new(handle, SimDelay(&left));

        println!("\n=== Step Response (20 deg, 2 s) ===");
        let step = harness
            .run_step_test(Degrees(20.0), 2000)
            .expect("Step test failed");
        print_metrics(&step);

        println!("\n=== Sine Tracking (10 deg @ 0.5 Hz, 2 s) ===");
        let sine = harness
            .run_sine_test(Degrees(10.0), 0.5, 2000)
            .expect("Sine test failed");
        println!("  IAE:       {:.3} deg·s", sine.iae);
        println!("  Max error: {:.3} deg (tracking lag)", sine.max_error.value());

        println!("\n=== Sample Log (last run, CSV) ===");
        let mut csv = String::new();
        harness.export_csv(&mut csv).expect("CSV formatting failed");
        let mut lines = csv.lines();
        for line in lines.by_ref().take(4) {
            println!("  {}", line);
        }
        println!("  ... {} more rows", lines.count());

        println!("\n=== Gain Sweep (20 to 100 RPM/deg, 5 candidates) ===");
        let sweep = harness
            .run_gain_sweep(20.0, 100.0, 5)
            .expect("Gain sweep failed");
        println!(
            "  {:>8} {:>10} {:>10} {:>10} {:>8}",
            "gain", "iae", "sse_deg", "score", "stable"
        );
        for c in &sweep.candidates {
            println!(
                "  {:>8.1} {:>10.3} {:>10.3} {:>10.3} {:>8}",
                c.gain,
                c.iae,
                c.steady_state_error.value(),
                c.score,
                c.is_stable,
            );
        }
        println!(
            "  Best gain: {:.1} RPM/deg (score {:.3})",
            sweep.best_gain, sweep.best_score
        );
        println!(
            "  Harness drive law restored to {} RPM/deg",
            harness.test_gain()
        );

        let mut handle = harness.release();
        handle.command(Rpm(0.0)).expect("Failed to park the joint");
    }

    arm.exit_test_mode().expect("Failed to leave test mode");
    println!("\nLoop state: {:?}", arm.state());
    assert_eq!(arm.state(), ArmState::Idle);

    println!("\n=== Example Complete ===");
    println!("Feed the CSV into a plotting tool to inspect the response shape.");
}
