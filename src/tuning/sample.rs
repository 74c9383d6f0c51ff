//! In-memory recording of characterization runs.

use core::fmt;

use crate::config::units::{Degrees, Rpm};

/// Capacity of a run's sample buffer.
///
/// At the 10 ms sample period this covers a 10 s run; longer runs keep the
/// first ten seconds and drop the rest.
pub const MAX_SAMPLES: usize = 1000;

/// One row of a characterization run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PerformanceSample {
    /// Loop time when the row was recorded.
    pub timestamp_ms: u32,
    /// Instantaneous reference position.
    pub target: Degrees,
    /// Measured position.
    pub actual: Degrees,
    /// Position error, `target - actual`.
    pub error: Degrees,
    /// Velocity command sent to the motor on this cycle.
    pub output: Rpm,
    /// Measured velocity.
    pub velocity: Rpm,
}

/// Bounded buffer of [`PerformanceSample`] rows, oldest first.
///
/// Recording past capacity drops the new row rather than failing, so a
/// characterization run can always finish and report on what it captured.
#[derive(Debug, Default)]
pub struct SampleLog {
    samples: heapless::Vec<PerformanceSample, MAX_SAMPLES>,
}

impl SampleLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            samples: heapless::Vec::new(),
        }
    }

    /// Append one row, deriving the error from target and actual.
    ///
    /// Silently dropped once the buffer is full.
    pub fn record(
        &mut self,
        timestamp_ms: u32,
        target: Degrees,
        actual: Degrees,
        output: Rpm,
        velocity: Rpm,
    ) {
        let _ = self.samples.push(PerformanceSample {
            timestamp_ms,
            target,
            actual,
            error: target - actual,
            output,
            velocity,
        });
    }

    /// Discard all rows.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Recorded rows, oldest first.
    #[inline]
    pub fn samples(&self) -> &[PerformanceSample] {
        &self.samples
    }

    /// Number of recorded rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the log holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the log has reached capacity and is dropping new rows.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    /// Write the log as CSV: a fixed header row, then one line per sample
    /// with positions to three decimals and speeds to two.
    pub fn export_csv<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(
            out,
            "Time_ms,Target_deg,Actual_deg,Error_deg,Control_RPM,Velocity_RPM"
        )?;
        for sample in &self.samples {
            writeln!(
                out,
                "{},{:.3},{:.3},{:.3},{:.2},{:.2}",
                sample.timestamp_ms,
                sample.target.value(),
                sample.actual.value(),
                sample.error.value(),
                sample.output.value(),
                sample.velocity.value(),
            )?;
        }
        Ok(())
    }
}
