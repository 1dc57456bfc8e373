//! Alias-Suppression Debouncer
//!
//! A comparator driven by a signal that wiggles across its threshold emits a
//! burst of tiny pulses. Pulses shorter than a subsample period or two carry
//! almost all of their energy above the audio band and come back as aliasing.
//!
//! The debouncer only accepts a rising edge after the input has stayed high
//! for `hold` consecutive subsamples. Falling edges pass straight through, so
//! a gate can never be held open longer than its input.
//!
//! ```text
//!   input   ──┐ ┌┐ ┌────────────┐
//!             └─┘└─┘            └────
//!   output  ──┐       ┌─────────┐
//!             └───────┘         └────
//!                 |<-hold->|
//! ```
//!
//! # Hold Length
//!
//!   hold = max(1, round(sample_rate · N / cutoff))
//!
//! At 48 kHz with 8× oversampling and a 20 kHz cutoff that is 19 subsamples.

use super::LevelDetector;

/// Default pulse-length cutoff in Hz.
pub const DEFAULT_CUTOFF_HZ: f32 = 20_000.0;

#[derive(Debug, Clone)]
pub struct Debouncer {
    hold: u32,
    high_count: u32,
    output: bool,
}

impl Debouncer {
    pub fn new(hold: u32) -> Self {
        Self {
            hold: hold.max(1),
            high_count: 0,
            output: false,
        }
    }

    /// Build a debouncer for a stream running at `sample_rate · oversample`.
    pub fn with_cutoff(sample_rate: f32, oversample: usize, cutoff_hz: f32) -> Self {
        Self::new(hold_samples(sample_rate, oversample, cutoff_hz))
    }

    pub fn process_bool(&mut self, input: bool) -> bool {
        if input {
            self.high_count = self.high_count.saturating_add(1);
            if self.high_count >= self.hold {
                self.output = true;
            }
        } else {
            self.high_count = 0;
            self.output = false;
        }
        self.output
    }

    pub fn hold(&self) -> u32 {
        self.hold
    }

    /// Change the hold length. The running count is kept, so a gate already
    /// open stays open.
    pub fn set_hold(&mut self, hold: u32) {
        self.hold = hold.max(1);
    }

    pub fn output(&self) -> bool {
        self.output
    }
}

impl LevelDetector for Debouncer {
    /// Treats `x >= 0.5` as a high input.
    fn process(&mut self, x: f32) -> f32 {
        if self.process_bool(x >= 0.5) {
            1.0
        } else {
            0.0
        }
    }

    fn is_high(&self) -> bool {
        self.output
    }

    fn reset(&mut self) {
        self.high_count = 0;
        self.output = false;
    }
}

/// Subsamples an input must stay high before a rising edge is accepted.
pub fn hold_samples(sample_rate: f32, oversample: usize, cutoff_hz: f32) -> u32 {
    let hold = (sample_rate * oversample as f32 / cutoff_hz).round();
    if hold.is_finite() && hold >= 1.0 {
        hold.min(u32::MAX as f32) as u32
    } else {
        1
    }
}
