//! Bitwise Logic Core
//!
//! Two 4-bit words go in, one 4-bit word (plus a carry for ADD) comes out.
//! The operation is picked by two panel switches read as a 2-bit number:
//!
//! ```text
//!   A B   mode
//!   0 0   AND
//!   0 1   ADD   4-bit ripple add, wraps, carry reported
//!   1 0   OR
//!   1 1   XOR
//! ```
//!
//! [`combine_levels`] applies the same mode to fractional lane levels coming
//! out of the edge detectors, so a transition that happened mid-subsample
//! stays mid-subsample on the way out.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output voltage per step of a 4-bit word (16 steps span 10 V).
pub const VOLTS_PER_STEP: f32 = 10.0 / 16.0;

/// A 4-bit value. Construction masks to the low nibble.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Nibble(u8);

impl Nibble {
    pub const ZERO: Nibble = Nibble(0);

    pub fn new(value: u8) -> Self {
        Self(value & 0xF)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn bit(self, k: usize) -> bool {
        k < 4 && (self.0 >> k) & 1 == 1
    }

    pub fn bits(self) -> [bool; 4] {
        [self.bit(0), self.bit(1), self.bit(2), self.bit(3)]
    }

    pub fn from_bits(bits: [bool; 4]) -> Self {
        let value = bits
            .iter()
            .enumerate()
            .fold(0u8, |acc, (k, &b)| acc | ((b as u8) << k));
        Self(value)
    }

    /// Two's complement within 4 bits: `(16 − n) mod 16`.
    pub fn negated(self) -> Self {
        Self::new(16u8.wrapping_sub(self.0))
    }

    /// Step output voltage for this value.
    pub fn volts(self) -> f32 {
        self.0 as f32 * VOLTS_PER_STEP
    }
}

impl From<u8> for Nibble {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicMode {
    #[default]
    And,
    Add,
    Or,
    Xor,
}

impl LogicMode {
    pub fn from_switches(a: bool, b: bool) -> Self {
        match (a as u8) * 2 + b as u8 {
            0 => LogicMode::And,
            1 => LogicMode::Add,
            2 => LogicMode::Or,
            _ => LogicMode::Xor,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogicMode::And => "AND",
            LogicMode::Add => "ADD",
            LogicMode::Or => "OR",
            LogicMode::Xor => "XOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicOutput {
    pub nibble: Nibble,
    /// Only ever set by [`LogicMode::Add`].
    pub carry: bool,
}

pub fn combine(mode: LogicMode, a: Nibble, b: Nibble) -> LogicOutput {
    let (value, carry) = match mode {
        LogicMode::And => (a.0 & b.0, false),
        LogicMode::Or => (a.0 | b.0, false),
        LogicMode::Xor => (a.0 ^ b.0, false),
        LogicMode::Add => ripple_add(a.bits(), b.bits()),
    };
    LogicOutput {
        nibble: Nibble::new(value),
        carry,
    }
}

fn ripple_add(a: [bool; 4], b: [bool; 4]) -> (u8, bool) {
    let mut carry = false;
    let mut sum = 0u8;
    for k in 0..4 {
        let bit = a[k] ^ b[k] ^ carry;
        carry = (a[k] && b[k]) || (carry && (a[k] ^ b[k]));
        sum |= (bit as u8) << k;
    }
    (sum, carry)
}

/// Combine two groups of four lane levels in [0, 1].
///
/// AND, OR and XOR keep fractional levels (min, max, |a − b|). ADD is a
/// boolean adder, so its lanes are thresholded at ½ first. Returns the
/// output lanes and the carry level.
pub fn combine_levels(mode: LogicMode, a: [f32; 4], b: [f32; 4]) -> ([f32; 4], f32) {
    let mut out = [0.0; 4];
    match mode {
        LogicMode::And => {
            for k in 0..4 {
                out[k] = a[k].min(b[k]);
            }
            (out, 0.0)
        }
        LogicMode::Or => {
            for k in 0..4 {
                out[k] = a[k].max(b[k]);
            }
            (out, 0.0)
        }
        LogicMode::Xor => {
            for k in 0..4 {
                out[k] = (a[k] - b[k]).abs();
            }
            (out, 0.0)
        }
        LogicMode::Add => {
            let result = combine(mode, threshold(a), threshold(b));
            for (k, lane) in out.iter_mut().enumerate() {
                *lane = if result.nibble.bit(k) { 1.0 } else { 0.0 };
            }
            (out, if result.carry { 1.0 } else { 0.0 })
        }
    }
}

fn threshold(levels: [f32; 4]) -> Nibble {
    Nibble::from_bits(levels.map(|level| level >= 0.5))
}
