//! Post-run evaluation of recorded characterization samples.

use libm::fabsf;

use crate::config::units::Degrees;
use crate::error::TuningError;

use super::sample::PerformanceSample;

/// Fewest samples a run must record before the integrals mean anything.
const MIN_SAMPLES: usize = 10;

/// Reference change below which a run is not treated as a step.
const STEP_DETECT_DEG: f32 = 1.0;

/// Settling band, as a percentage of the step size.
const SETTLING_THRESHOLD_PERCENT: f32 = 2.0;

/// Steady-state error above which the run is declared unstable.
const STABILITY_LIMIT_DEG: f32 = 5.0;

/// Error zero crossings in the final fifth of the run beyond which the
/// response is declared oscillating.
const OSCILLATION_CROSSINGS: usize = 5;

/// Time-domain quality figures for one characterization run.
///
/// The integral criteria treat smaller as better; step-shape figures are
/// zero for runs whose reference never moved more than a degree.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PerformanceMetrics {
    /// Integral of absolute error, deg·s.
    pub iae: f32,
    /// Integral of squared error, deg²·s.
    pub ise: f32,
    /// Time-weighted integral of absolute error, deg·s².
    pub itae: f32,
    /// Largest absolute error seen anywhere in the run.
    pub max_error: Degrees,
    /// Mean absolute error over the final 10% of the run.
    pub steady_state_error: Degrees,
    /// Peak excursion past the final value, as a percentage of the step.
    pub overshoot_percent: f32,
    /// 10% to 90% rise time in milliseconds, or zero when either threshold
    /// crossing was never captured.
    pub rise_time_ms: f32,
    /// Time after which the error stays inside a ±2% band of the step.
    pub settling_time_ms: f32,
    /// Time of the peak excursion relative to the first sample.
    pub peak_time_ms: f32,
    /// Steady-state error is inside the stability limit.
    pub is_stable: bool,
    /// The error kept changing sign through the final fifth of the run.
    pub is_oscillating: bool,
    /// Number of samples evaluated.
    pub num_samples: usize,
}

impl PerformanceMetrics {
    /// Evaluate a recorded run.
    ///
    /// `sample_period_ms` is the nominal spacing the integrals assume; the
    /// per-sample timestamps only enter the time-weighted figures.
    ///
    /// # Errors
    ///
    /// Returns [`TuningError::InsufficientSamples`] when fewer than ten
    /// samples were recorded.
    pub fn from_samples(
        samples: &[PerformanceSample],
        sample_period_ms: u32,
    ) -> Result<Self, TuningError> {
        if samples.len() < MIN_SAMPLES {
            return Err(TuningError::InsufficientSamples { got: samples.len() });
        }

        let dt = sample_period_ms as f32 / 1000.0;
        let t0 = samples[0].timestamp_ms;

        let mut iae = 0.0;
        let mut ise = 0.0;
        let mut itae = 0.0;
        let mut max_error = 0.0f32;

        for sample in samples {
            let err = fabsf(sample.error.value());
            let time_s = sample.timestamp_ms.wrapping_sub(t0) as f32 / 1000.0;

            iae += err * dt;
            ise += err * err * dt;
            itae += time_s * err * dt;
            max_error = max_error.max(err);
        }

        // Steady state: mean |error| over the final tenth of the run.
        let tail = &samples[samples.len() * 9 / 10..];
        let steady_state_error =
            tail.iter().map(|s| fabsf(s.error.value())).sum::<f32>() / tail.len() as f32;

        let step = StepShape::analyze(samples);

        // Oscillation: count error sign changes over the final fifth.
        let crossings = samples[samples.len() * 4 / 5..]
            .windows(2)
            .filter(|pair| pair[0].error.value() * pair[1].error.value() < 0.0)
            .count();

        Ok(Self {
            iae,
            ise,
            itae,
            max_error: Degrees(max_error),
            steady_state_error: Degrees(steady_state_error),
            overshoot_percent: step.overshoot_percent,
            rise_time_ms: step.rise_time_ms,
            settling_time_ms: step.settling_time_ms,
            peak_time_ms: step.peak_time_ms,
            is_stable: steady_state_error < STABILITY_LIMIT_DEG,
            is_oscillating: crossings > OSCILLATION_CROSSINGS,
            num_samples: samples.len(),
        })
    }
}

/// Step-response shape figures, all zero for non-step runs.
#[derive(Debug, Default)]
struct StepShape {
    overshoot_percent: f32,
    rise_time_ms: f32,
    settling_time_ms: f32,
    peak_time_ms: f32,
}

impl StepShape {
    fn analyze(samples: &[PerformanceSample]) -> Self {
        let mut shape = Self::default();

        let first = samples[0];
        let last = samples[samples.len() - 1];
        let initial = first.actual.value();
        let final_value = last.actual.value();
        let step = last.target.value() - initial;

        if fabsf(step) <= STEP_DETECT_DEG {
            return shape;
        }

        // Peak: the sample farthest from the initial position.
        let mut peak_value = final_value;
        let mut peak_index = samples.len() - 1;
        for (i, sample) in samples.iter().enumerate() {
            if fabsf(sample.actual.value() - initial) > fabsf(peak_value - initial) {
                peak_value = sample.actual.value();
                peak_index = i;
            }
        }
        shape.overshoot_percent = (peak_value - final_value) / step * 100.0;
        shape.peak_time_ms = samples[peak_index]
            .timestamp_ms
            .wrapping_sub(first.timestamp_ms) as f32;

        // Rise: first samples within tolerance of the 10% and 90% marks. The
        // tolerance window can be skipped entirely by a fast response, in
        // which case the rise time stays zero.
        let tolerance = fabsf(step * 0.05);
        let threshold_10 = initial + step * 0.1;
        let threshold_90 = initial + step * 0.9;
        let mut rise_start = None;
        let mut rise_end = None;
        for (i, sample) in samples.iter().enumerate() {
            let actual = sample.actual.value();
            if rise_start.is_none() && fabsf(actual - threshold_10) < tolerance {
                rise_start = Some(i);
            }
            if fabsf(actual - threshold_90) < tolerance {
                rise_end = Some(i);
                break;
            }
        }
        if let (Some(start), Some(end)) = (rise_start, rise_end) {
            if end > start {
                shape.rise_time_ms = samples[end]
                    .timestamp_ms
                    .wrapping_sub(samples[start].timestamp_ms)
                    as f32;
            }
        }

        // Settling: scanning backward, the latest sample still outside the
        // ±2% band marks the settling time.
        let band = fabsf(step) * SETTLING_THRESHOLD_PERCENT / 100.0;
        for sample in samples.iter().rev() {
            if fabsf(sample.error.value()) > band {
                shape.settling_time_ms =
                    sample.timestamp_ms.wrapping_sub(first.timestamp_ms) as f32;
                break;
            }
        }

        shape
    }
}
