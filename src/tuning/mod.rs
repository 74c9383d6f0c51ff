//! Joint characterization and gain selection support.
//!
//! [`CharacterizationHarness`] runs blocking step and sine references
//! against one joint through a [`TestHandle`], recording every sample into
//! a bounded [`SampleLog`] and scoring the response as
//! [`PerformanceMetrics`]. A gain sweep repeats the step run across a range
//! of proportional gains and reports the best stable candidate.
//!
//! [`TestHandle`]: crate::arm::TestHandle

mod harness;
mod metrics;
mod sample;

pub use harness::{
    CharacterizationHarness, SweepCandidate, SweepResult, DEFAULT_TEST_GAIN,
    MAX_SWEEP_CANDIDATES, SAMPLE_PERIOD_MS,
};
pub use metrics::PerformanceMetrics;
pub use sample::{PerformanceSample, SampleLog, MAX_SAMPLES};
