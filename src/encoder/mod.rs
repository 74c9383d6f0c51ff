//! Encoder module for fivebar-motion.
//!
//! Converts raw quadrature counter reads into a monotonic pulse total,
//! output-shaft angle, and measured velocity.

mod channel;

pub use channel::{EncoderChannel, QuadratureCounter};
