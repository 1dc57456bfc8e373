//! Error types for nibble_dsp
//!
//! Only construction and configuration can fail. The per-sample path recovers
//! from numerical trouble locally and never returns an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    #[error("resampling kernel is degenerate (oversample {oversample}, quality {quality})")]
    DegenerateKernel { oversample: usize, quality: usize },

    #[error("invalid thresholds: low {low} V must be below high {high} V")]
    InvalidThresholds { low: f32, high: f32 },

    #[error("invalid debounce cutoff: {0} Hz")]
    InvalidCutoff(f32),

    #[error("invalid DC blocker half-life: {0} s")]
    InvalidHalfLife(f32),
}

pub type Result<T> = std::result::Result<T, Error>;
