pub mod config;
pub mod dsp; // Oversampling, edge detection and bit-logic primitives
pub mod error;
pub mod modules; // Bitfield, Bitmix and Nibbler processors

pub use config::ProcessorConfig;
pub use error::{Error, Result};

/// Largest block the audio callback renders in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Default oversampling factor.
pub const DEFAULT_OVERSAMPLE: usize = 8;
/// Default resampling kernel length, in host samples.
pub const DEFAULT_QUALITY: usize = 4;

pub(crate) const MIN_SAMPLE_RATE: f32 = 1_000.0;
pub(crate) const MAX_SAMPLE_RATE: f32 = 768_000.0;
