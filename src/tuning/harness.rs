//! Blocking characterization runs against a single joint.

use core::f32::consts::PI;

use embedded_hal::delay::DelayNs;
use libm::sinf;

use crate::arm::TestHandle;
use crate::config::units::{Degrees, Rpm};
use crate::encoder::QuadratureCounter;
use crate::error::{MotorError, Result, TuningError};
use crate::motor::MotorDrive;

use super::metrics::PerformanceMetrics;
use super::sample::{PerformanceSample, SampleLog};

/// Milliseconds between samples during a run.
pub const SAMPLE_PERIOD_MS: u32 = 10;

/// Default drive law, in RPM of command per degree of error.
pub const DEFAULT_TEST_GAIN: f32 = 50.0;

/// Most candidates a single gain sweep will evaluate.
pub const MAX_SWEEP_CANDIDATES: usize = 16;

const SWEEP_STEP: Degrees = Degrees(30.0);
const SWEEP_STEP_DURATION_MS: u32 = 3000;
const SWEEP_SETTLE_MS: u32 = 1000;
const SWEEP_INSTABILITY_PENALTY: f32 = 1000.0;

/// Step and sine response characterization for one joint.
///
/// Drives the joint with a plain proportional law toward an instantaneous
/// reference, sampling angle and velocity every [`SAMPLE_PERIOD_MS`] into a
/// bounded [`SampleLog`], and evaluates [`PerformanceMetrics`] over the
/// recording. This is a diagnostic instrument, not the production
/// controller: the simple law makes the measured response easy to reason
/// about when picking gains.
///
/// Construction consumes a [`TestHandle`], which only exists while its
/// [`ControlLoop`] is in
/// [`TestOverride`](crate::arm::ArmState::TestOverride); the scheduled
/// tracking path can therefore never fight a characterization run for the
/// motor. Runs block on the supplied delay and advance the loop's own
/// millisecond clock, so velocity estimation stays continuous when control
/// returns to the loop.
///
/// Every run ends by commanding zero velocity, including runs that fail
/// partway through.
///
/// [`ControlLoop`]: crate::arm::ControlLoop
///
/// # Example
///
/// ```rust,ignore
/// arm.enter_test_mode()?;
/// let handle = arm.test_handle_left().expect("test mode is active");
/// let mut harness = CharacterizationHarness::new(handle, delay);
///
/// let metrics = harness.run_step_test(Degrees(30.0), 3000)?;
/// println!("IAE {:.2}, overshoot {:.1}%", metrics.iae, metrics.overshoot_percent);
/// ```
#[derive(Debug)]
pub struct CharacterizationHarness<'a, C, D, DELAY> {
    handle: TestHandle<'a, C, D>,
    delay: DELAY,
    log: SampleLog,
    test_gain: f32,
}

/// Summary of one gain candidate evaluated by a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepCandidate {
    /// Proportional gain under test, RPM per degree.
    pub gain: f32,
    /// Integral of absolute error for this candidate's step run.
    pub iae: f32,
    /// Steady-state error for this candidate's step run.
    pub steady_state_error: Degrees,
    /// Cost of this candidate; lower is better.
    pub score: f32,
    /// Whether the candidate's run settled inside the stability limit.
    pub is_stable: bool,
}

/// Outcome of a gain sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepResult {
    /// Lowest-cost stable gain.
    pub best_gain: f32,
    /// Cost of the best gain.
    pub best_score: f32,
    /// Every candidate evaluated, in sweep order.
    pub candidates: heapless::Vec<SweepCandidate, MAX_SWEEP_CANDIDATES>,
}

impl<'a, C, D, DELAY> CharacterizationHarness<'a, C, D, DELAY>
where
    C: QuadratureCounter,
    D: MotorDrive,
    DELAY: DelayNs,
{
    /// Take exclusive ownership of a joint for characterization.
    pub fn new(handle: TestHandle<'a, C, D>, delay: DELAY) -> Self {
        Self {
            handle,
            delay,
            log: SampleLog::new(),
            test_gain: DEFAULT_TEST_GAIN,
        }
    }

    /// Proportional drive law currently in effect, RPM per degree.
    #[inline]
    pub fn test_gain(&self) -> f32 {
        self.test_gain
    }

    /// Replace the proportional drive law used by subsequent runs.
    pub fn set_test_gain(&mut self, rpm_per_degree: f32) {
        self.test_gain = rpm_per_degree;
    }

    /// Hold a step reference `step` away from the current angle for
    /// `duration_ms` and evaluate the response.
    ///
    /// # Errors
    ///
    /// Motor command failures abort the run; the evaluation itself can only
    /// fail with [`TuningError::InsufficientSamples`] when the duration
    /// covers fewer than ten sample periods.
    pub fn run_step_test(
        &mut self,
        step: Degrees,
        duration_ms: u32,
    ) -> Result<PerformanceMetrics> {
        self.handle.sample();
        let target = self.handle.angle() + step;
        self.run(duration_ms, |_| target)
    }

    /// Track a sinusoid centered on the current angle for `duration_ms`
    /// and evaluate the response.
    pub fn run_sine_test(
        &mut self,
        amplitude: Degrees,
        frequency_hz: f32,
        duration_ms: u32,
    ) -> Result<PerformanceMetrics> {
        self.handle.sample();
        let center = self.handle.angle();
        self.run(duration_ms, |elapsed_ms| {
            let t = elapsed_ms as f32 / 1000.0;
            center + Degrees(amplitude.value() * sinf(2.0 * PI * frequency_hz * t))
        })
    }

    /// Evaluate `steps` evenly spaced proportional gains from `start` to
    /// `end` inclusive, each with a 30 degree step run, and report the
    /// lowest-cost stable candidate.
    ///
    /// Each candidate's cost is `IAE + 2 * steadyStateError`, plus a flat
    /// penalty when the run was unstable or oscillating. The joint is given
    /// a settling pause after each run. The harness's own gain is restored
    /// afterward regardless of outcome.
    ///
    /// # Errors
    ///
    /// [`TuningError::InvalidSweepRange`] unless `start < end` and
    /// `2 <= steps <= MAX_SWEEP_CANDIDATES`;
    /// [`TuningError::NoStableCandidate`] when every candidate was unstable.
    pub fn run_gain_sweep(&mut self, start: f32, end: f32, steps: usize) -> Result<SweepResult> {
        if steps < 2 || steps > MAX_SWEEP_CANDIDATES || start >= end {
            return Err(TuningError::InvalidSweepRange { start, end, steps }.into());
        }

        let gain_step = (end - start) / (steps - 1) as f32;
        let saved_gain = self.test_gain;

        let mut candidates = heapless::Vec::new();
        let mut best: Option<(f32, f32)> = None;

        for i in 0..steps {
            let gain = start + i as f32 * gain_step;
            self.test_gain = gain;

            let metrics = match self.run_step_test(SWEEP_STEP, SWEEP_STEP_DURATION_MS) {
                Ok(metrics) => metrics,
                Err(e) => {
                    self.test_gain = saved_gain;
                    return Err(e);
                }
            };

            let mut score = metrics.iae + 2.0 * metrics.steady_state_error.value();
            if !metrics.is_stable || metrics.is_oscillating {
                score += SWEEP_INSTABILITY_PENALTY;
            }

            let improves = match best {
                Some((_, best_score)) => score < best_score,
                None => true,
            };
            if metrics.is_stable && improves {
                best = Some((gain, score));
            }

            // Cannot overflow: steps was validated against the capacity.
            let _ = candidates.push(SweepCandidate {
                gain,
                iae: metrics.iae,
                steady_state_error: metrics.steady_state_error,
                score,
                is_stable: metrics.is_stable,
            });

            // Let the joint settle at zero command before the next run.
            self.delay.delay_ms(SWEEP_SETTLE_MS);
            self.handle.advance(SWEEP_SETTLE_MS);
        }

        self.test_gain = saved_gain;

        let (best_gain, best_score) = best.ok_or(TuningError::NoStableCandidate)?;
        Ok(SweepResult {
            best_gain,
            best_score,
            candidates,
        })
    }

    /// Rows recorded by the most recent run, oldest first.
    #[inline]
    pub fn samples(&self) -> &[PerformanceSample] {
        self.log.samples()
    }

    /// Write the most recent run as CSV.
    pub fn export_csv<W: core::fmt::Write>(&self, out: &mut W) -> core::fmt::Result {
        self.log.export_csv(out)
    }

    /// Give the axis back, for further direct commands or another harness.
    pub fn release(self) -> TestHandle<'a, C, D> {
        self.handle
    }

    fn run<F>(&mut self, duration_ms: u32, reference: F) -> Result<PerformanceMetrics>
    where
        F: Fn(u32) -> Degrees,
    {
        self.log.clear();

        let outcome = self.drive(duration_ms, &reference);
        // The stop command goes out even when the run failed partway.
        let stopped = self.handle.command(Rpm(0.0));
        outcome?;
        stopped?;

        Ok(PerformanceMetrics::from_samples(
            self.log.samples(),
            SAMPLE_PERIOD_MS,
        )?)
    }

    fn drive<F>(&mut self, duration_ms: u32, reference: &F) -> core::result::Result<(), MotorError>
    where
        F: Fn(u32) -> Degrees,
    {
        let mut elapsed = 0;
        while elapsed < duration_ms {
            self.delay.delay_ms(SAMPLE_PERIOD_MS);
            self.handle.advance(SAMPLE_PERIOD_MS);
            elapsed += SAMPLE_PERIOD_MS;

            self.handle.sample();
            let target = reference(elapsed);
            let actual = self.handle.angle();
            let output = Rpm((target - actual).value() * self.test_gain);
            self.handle.command(output)?;

            self.log.record(
                self.handle.now_ms(),
                target,
                actual,
                output,
                self.handle.velocity(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    use crate::arm::ControlLoop;
    use crate::config::SystemConfig;
    use crate::error::Error;

    /// Shared state for a first-order simulated joint: the drive stores the
    /// commanded speed, the delay integrates it into encoder pulses.
    struct PlantState {
        pulses: Cell<f32>,
        rpm: Cell<f32>,
    }

    impl PlantState {
        fn new() -> Self {
            Self {
                pulses: Cell::new(0.0),
                rpm: Cell::new(0.0),
            }
        }

        /// Output-shaft angle implied by the accumulated pulses, for the
        /// default left joint (100 PPR, 50:1 gear).
        fn angle(&self) -> f32 {
            self.pulses.get() * 360.0 / 20_000.0
        }
    }

    struct PlantCounter<'a>(&'a PlantState);

    impl QuadratureCounter for PlantCounter<'_> {
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

    struct PlantDrive<'a>(&'a PlantState);

    impl MotorDrive for PlantDrive<'_> {
        fn apply(&mut self, rpm: Rpm) -> core::result::Result<(), MotorError> {
            self.0.rpm.set(rpm.value());
            Ok(())
        }

        fn set_enabled(&mut self, enabled: bool) -> core::result::Result<(), MotorError> {
            if !enabled {
                self.0.rpm.set(0.0);
            }
            Ok(())
        }

        fn max_rpm(&self) -> Rpm {
            Rpm(6000.0)
        }
    }

    /// Integrates the commanded motor speed into pulses while "waiting".
    struct PlantDelay<'a>(&'a PlantState);

    impl DelayNs for PlantDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            // 400 quadrature pulses per motor revolution.
            let pulses_per_sec = self.0.rpm.get() * 400.0 / 60.0;
            let dt = ns as f32 / 1e9;
            self.0.pulses.set(self.0.pulses.get() + pulses_per_sec * dt);
        }
    }

    /// Passes time without moving the plant: the motor never responds.
    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type PlantLoop<'a> = ControlLoop<PlantCounter<'a>, PlantDrive<'a>, PlantCounter<'a>, PlantDrive<'a>>;

    fn plant_loop<'a>(left: &'a PlantState, right: &'a PlantState) -> PlantLoop<'a> {
        ControlLoop::new(
            &SystemConfig::default(),
            PlantCounter(left),
            PlantDrive(left),
            PlantCounter(right),
            PlantDrive(right),
        )
        .unwrap()
    }

    #[test]
    fn test_step_test_converges_on_target() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        let metrics = harness.run_step_test(Degrees(30.0), 1000).unwrap();

        assert_eq!(metrics.num_samples, 100);
        assert!(metrics.is_stable);
        assert!(!metrics.is_oscillating);
        assert!(metrics.iae > 0.0);
        assert!((plant.angle() - 30.0).abs() < 0.5, "ended at {}", plant.angle());
        // The run always parks the motor.
        assert_eq!(plant.rpm.get(), 0.0);
    }

    #[test]
    fn test_step_test_records_every_period() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        harness.run_step_test(Degrees(10.0), 500).unwrap();

        let samples = harness.samples();
        assert_eq!(samples.len(), 50);
        assert_eq!(samples[0].timestamp_ms, 10);
        assert_eq!(samples[49].timestamp_ms, 500);
        for sample in samples {
            assert_eq!(sample.target, Degrees(10.0));
            let expected = sample.target - sample.actual;
            assert!((sample.error.value() - expected.value()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_csv_export_covers_the_run() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        harness.run_step_test(Degrees(5.0), 200).unwrap();

        let mut out = String::new();
        harness.export_csv(&mut out).unwrap();
        assert_eq!(out.lines().count(), 21);
        assert!(out.starts_with("Time_ms,"));
    }

    #[test]
    fn test_sine_with_zero_amplitude_holds_still() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        let metrics = harness.run_sine_test(Degrees(0.0), 0.5, 500).unwrap();

        assert_eq!(metrics.num_samples, 50);
        assert_eq!(metrics.iae, 0.0);
        assert!(metrics.is_stable);
        assert_eq!(plant.angle(), 0.0);
    }

    #[test]
    fn test_sine_test_tracks_with_bounded_lag() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        let metrics = harness.run_sine_test(Degrees(10.0), 0.25, 2000).unwrap();

        assert_eq!(metrics.num_samples, 200);
        assert!(metrics.iae > 0.0);
        // First-order plant at this gain lags roughly 2.5 degrees peak.
        assert!(metrics.max_error.value() < 5.0, "{}", metrics.max_error.value());
        assert!(metrics.is_stable);
        assert!(!metrics.is_oscillating);
    }

    #[test]
    fn test_short_run_reports_insufficient_samples() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        let result = harness.run_step_test(Degrees(10.0), 50);

        assert_eq!(
            result.unwrap_err(),
            Error::Tuning(TuningError::InsufficientSamples { got: 5 })
        );
        // Failed runs still park the motor.
        assert_eq!(plant.rpm.get(), 0.0);
    }

    #[test]
    fn test_long_run_saturates_the_log() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        let metrics = harness.run_step_test(Degrees(20.0), 12_000).unwrap();

        // 1200 cycles ran but only the first 1000 were kept.
        assert_eq!(metrics.num_samples, 1000);
        assert_eq!(harness.samples().len(), 1000);
    }

    #[test]
    fn test_gain_sweep_picks_lowest_cost_stable_gain() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        let sweep = harness.run_gain_sweep(10.0, 100.0, 4).unwrap();

        let gains: Vec<f32> = sweep.candidates.iter().map(|c| c.gain).collect();
        assert_eq!(gains, [10.0, 40.0, 70.0, 100.0]);
        assert!(sweep.candidates.iter().all(|c| c.is_stable));

        // On a first-order plant, faster proportional response strictly
        // shrinks the error integral.
        for pair in sweep.candidates.windows(2) {
            assert!(pair[1].score < pair[0].score);
        }
        assert_eq!(sweep.best_gain, 100.0);
        assert_eq!(sweep.best_score, sweep.candidates[3].score);

        // The sweep leaves the configured drive law untouched.
        assert_eq!(harness.test_gain(), DEFAULT_TEST_GAIN);
    }

    #[test]
    fn test_gain_sweep_rejects_bad_ranges() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));

        for (start, end, steps) in [
            (10.0, 100.0, 1),
            (10.0, 100.0, MAX_SWEEP_CANDIDATES + 1),
            (100.0, 10.0, 4),
            (50.0, 50.0, 4),
        ] {
            let result = harness.run_gain_sweep(start, end, steps);
            assert_eq!(
                result.unwrap_err(),
                Error::Tuning(TuningError::InvalidSweepRange { start, end, steps })
            );
        }
    }

    #[test]
    fn test_gain_sweep_on_dead_plant_finds_no_stable_candidate() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        // NoopDelay never integrates, so the joint ignores every command
        // and the 30 degree error persists through each candidate run.
        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), NoopDelay);
        let result = harness.run_gain_sweep(10.0, 100.0, 4);

        assert_eq!(
            result.unwrap_err(),
            Error::Tuning(TuningError::NoStableCandidate)
        );
        assert_eq!(harness.test_gain(), DEFAULT_TEST_GAIN);
    }

    #[test]
    fn test_release_returns_the_axis_handle() {
        let (plant, idle) = (PlantState::new(), PlantState::new());
        let mut arm = plant_loop(&plant, &idle);
        arm.enter_test_mode().unwrap();

        let mut harness =
            CharacterizationHarness::new(arm.test_handle_left().unwrap(), PlantDelay(&plant));
        harness.run_step_test(Degrees(10.0), 200).unwrap();

        let mut handle = harness.release();
        handle.command(Rpm(123.0)).unwrap();
        assert_eq!(plant.rpm.get(), 123.0);
    }
}
