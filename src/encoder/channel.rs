//! Per-joint encoder accumulation and velocity estimation.

use crate::config::units::{Degrees, Rpm};
use crate::config::JointConfig;

/// Hardware interface to one quadrature counter peripheral.
///
/// Implementations typically wrap a hardware timer in encoder mode (4x
/// decode). All operations are non-blocking register accesses; the control
/// task calls [`EncoderChannel::sample`] from its periodic tick.
pub trait QuadratureCounter {
    /// Read the current raw counter value.
    fn count(&mut self) -> u32;

    /// Value at which the counter wraps back to zero (the auto-reload
    /// value, so the counter range is `period + 1`).
    fn period(&self) -> u32;

    /// Reset the hardware counter to zero.
    fn reset(&mut self);
}

/// Accumulates quadrature counts into an unbounded signed pulse total and
/// derives output-shaft angle and velocity from it.
///
/// The raw counter wraps at the hardware period; [`update`] corrects the
/// per-sample delta for wraparound in either direction, which is valid as
/// long as less than half the counter range elapses between samples. The
/// control period must be chosen so this holds at the motor's top speed.
///
/// [`update`]: EncoderChannel::update
#[derive(Debug)]
pub struct EncoderChannel<C> {
    counter: C,

    /// Encoder counts per motor revolution after 4x quadrature decode.
    pulses_per_motor_rev: f32,

    /// Gear reduction between motor and output shaft.
    gear_ratio: f32,

    /// Wraparound-corrected cumulative count.
    total_pulse_count: i64,

    /// Raw counter value at the previous sample.
    last_raw_counter: u32,

    /// Output-shaft velocity estimate.
    measured_velocity: f32,

    /// Pulse total at the previous velocity sample.
    previous_pulse_count: i64,

    /// Timestamp of the previous velocity sample.
    last_sample_time_ms: u32,
}

impl<C> EncoderChannel<C> {
    /// Create a channel over `counter` using the joint's encoder constants.
    pub fn new(counter: C, config: &JointConfig) -> Self {
        Self {
            counter,
            pulses_per_motor_rev: config.pulses_per_motor_rev(),
            gear_ratio: config.gear_ratio,
            total_pulse_count: 0,
            last_raw_counter: 0,
            measured_velocity: 0.0,
            previous_pulse_count: 0,
            last_sample_time_ms: 0,
        }
    }

    /// Fold one raw counter reading into the channel state.
    ///
    /// The delta since the last reading is corrected for counter wraparound:
    /// a jump of more than half the range in either direction is taken to be
    /// a wrap, not real motion. The corrected delta accumulates into the
    /// pulse total.
    ///
    /// The velocity estimate is refreshed only when more than a millisecond
    /// has passed since the previous estimate, so a burst of closely spaced
    /// samples cannot blow up the division.
    pub fn update(&mut self, raw_counter: u32, counter_period: u32, now_ms: u32) {
        let range = counter_period as i64 + 1;
        let mut delta = raw_counter as i64 - self.last_raw_counter as i64;

        if delta > counter_period as i64 / 2 {
            delta -= range;
        } else if delta < -(counter_period as i64 / 2) {
            delta += range;
        }

        self.total_pulse_count += delta;
        self.last_raw_counter = raw_counter;

        let elapsed_ms = now_ms.wrapping_sub(self.last_sample_time_ms);
        if elapsed_ms > 1 {
            let dt = elapsed_ms as f32 / 1000.0;
            let pulse_delta = self.total_pulse_count - self.previous_pulse_count;
            let output_revs =
                pulse_delta as f32 / (self.pulses_per_motor_rev * self.gear_ratio);

            self.measured_velocity = (output_revs / dt) * 60.0;
            self.previous_pulse_count = self.total_pulse_count;
            self.last_sample_time_ms = now_ms;
        }
    }

    /// Output-shaft angle accumulated since the last reset.
    ///
    /// Returns zero when the encoder constants are misconfigured (zero PPR
    /// or gear ratio); [`validate_config`] rejects such configurations at
    /// startup.
    ///
    /// [`validate_config`]: crate::config::validate_config
    pub fn angle(&self) -> Degrees {
        if self.pulses_per_motor_rev == 0.0 || self.gear_ratio == 0.0 {
            return Degrees(0.0);
        }

        let output_revs =
            self.total_pulse_count as f32 / (self.pulses_per_motor_rev * self.gear_ratio);
        Degrees(output_revs * 360.0)
    }

    /// Most recent output-shaft velocity estimate.
    #[inline]
    pub fn velocity(&self) -> Rpm {
        Rpm(self.measured_velocity)
    }

    /// Wraparound-corrected cumulative pulse count.
    #[inline]
    pub fn total_pulse_count(&self) -> i64 {
        self.total_pulse_count
    }
}

impl<C: QuadratureCounter> EncoderChannel<C> {
    /// Read the hardware counter and fold the reading into the channel.
    pub fn sample(&mut self, now_ms: u32) {
        let raw = self.counter.count();
        let period = self.counter.period();
        self.update(raw, period, now_ms);
    }

    /// Zero all counters and re-base the velocity sampler on `now_ms`.
    pub fn reset(&mut self, now_ms: u32) {
        self.total_pulse_count = 0;
        self.previous_pulse_count = 0;
        self.measured_velocity = 0.0;
        self.last_sample_time_ms = now_ms;

        self.counter.reset();
        self.last_raw_counter = 0;
    }
}
