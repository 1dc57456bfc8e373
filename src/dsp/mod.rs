//! Low-level primitives used by the logic modules.
//!
//! Everything here is allocation-free once constructed and safe to call from
//! an audio callback. Components only do the signal math; the processors in
//! [`crate::modules`] wire them into oversampled signal paths.

/// 4-bit (+carry) shift register / accumulator.
pub mod accumulator;
/// Second-order antiderivative anti-aliasing.
pub mod adaa;
/// DC blocker and soft saturator for host-rate outputs.
pub mod conditioner;
/// Hold-time filter for rising transitions.
pub mod debounce;
/// Anti-alias strategies behind the [`LevelDetector`] interface.
pub mod detector;
/// Subsample-accurate Schmitt trigger.
pub mod edge;
/// Smoothed indicator brightness.
pub mod indicator;
/// Combinational AND/ADD/OR/XOR on nibbles.
pub mod logic;
/// Polyphase upsampler and decimator sharing one kernel.
pub mod resample;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use accumulator::{Accumulator, ClockMode, RegisterInput, Taps};
pub use adaa::{Adaa2, Antiderivative, Parity, Sawtooth, Step};
pub use conditioner::{clamp_input, saturate, DcBlocker, OutputConditioner};
pub use debounce::Debouncer;
pub use detector::{BitDetector, DetectorSettings, GateDetector, GateSample};
pub use edge::{EdgeSample, SubsampleSchmitt};
pub use indicator::Indicator;
pub use logic::{combine, combine_levels, LogicMode, LogicOutput, Nibble};
pub use resample::{Decimator, Kernel, Upsampler};

/// Smallest denominator the edge solver divides by.
pub(crate) const EDGE_EPSILON: f32 = 1e-6;

/*
| strategy      | gate inputs                    | generated bits                  |
| ------------- | ------------------------------ | ------------------------------- |
| None          | single-threshold comparator    | floor(x) mod 2                  |
| Debounce      | comparator + rising hold-off   | floor(x) mod 2 + rising hold    |
| Adaa          | 2nd-order ADAA of a step       | 2nd-order ADAA staircase        |
| AnalyticEdge  | quadratic-fit Schmitt trigger  | linear-fit fractional crossing  |

All four run per subsample inside the oversampled loop.
*/

/// How a discontinuous logic decision is band-limited.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntiAlias {
    None,
    Debounce,
    Adaa,
    #[default]
    AnalyticEdge,
}

impl AntiAlias {
    pub const ALL: [AntiAlias; 4] = [
        AntiAlias::None,
        AntiAlias::Debounce,
        AntiAlias::Adaa,
        AntiAlias::AnalyticEdge,
    ];

    /// Cycle to the next strategy (used by hosts with a single toggle).
    pub fn next(self) -> Self {
        match self {
            AntiAlias::None => AntiAlias::Debounce,
            AntiAlias::Debounce => AntiAlias::Adaa,
            AntiAlias::Adaa => AntiAlias::AnalyticEdge,
            AntiAlias::AnalyticEdge => AntiAlias::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AntiAlias::None => "none",
            AntiAlias::Debounce => "debounce",
            AntiAlias::Adaa => "adaa",
            AntiAlias::AnalyticEdge => "analytic edge",
        }
    }
}

/// Turns one subsample of a continuous signal into a logic level.
///
/// The returned level is the fraction of the subsample interval the signal
/// spent high, so a transition inside the interval shows up as a value
/// strictly between 0 and 1.
pub trait LevelDetector {
    fn process(&mut self, x: f32) -> f32;

    /// Latched logic state after the last `process` call.
    fn is_high(&self) -> bool;

    fn reset(&mut self);
}
