//! Output Conditioning
//!
//! Everything leaving a module passes through here at host rate, after the
//! decimator. Two stages:
//!
//! # DC Blocker
//!
//! A one-pole high-pass:
//!   y[n] = k · (x[n] + y[n−1] − x[n−1])
//!
//! `k` is derived from a half-life: after `halflife` samples a DC offset has
//! decayed to half its size.
//!   k = 2^(−1 / halflife_samples)
//!
//! Logic outputs are unipolar (0..10 V), so blocking is opt-in.
//!
//! # Soft Saturator
//!
//! Identity inside ±9 V. Beyond that a tanh knee bends the signal towards
//! ±10 V:
//!   f(x) = sign(x) · (9 + tanh(|x| − 9))    for |x| > 9
//!
//! Value and slope are continuous at the knee, so a clean 0..10 V gate only
//! loses a fraction of a volt at the very top.
//!
//! ```text
//!   out
//!   10 ┤            ___________
//!    9 ┤         __/
//!      │       ╱
//!      │     ╱
//!      │   ╱
//!      └─────────┬─────────→ in
//!               9
//! ```

use crate::error::{Error, Result};

/// Knee of the soft saturator, in volts.
pub const SATURATION_KNEE: f32 = 9.0;
/// Inputs are clamped to this range before any shaping.
pub const INPUT_CLAMP: f32 = 12.0;

#[inline]
pub fn saturate(x: f32) -> f32 {
    if !x.is_finite() {
        return 0.0;
    }
    let magnitude = x.abs();
    if magnitude <= SATURATION_KNEE {
        x
    } else {
        x.signum() * (SATURATION_KNEE + (magnitude - SATURATION_KNEE).tanh())
    }
}

/// Clamp a host input to ±12 V. Non-finite input reads as 0 V.
#[inline]
pub fn clamp_input(x: f32) -> f32 {
    if x.is_finite() {
        x.clamp(-INPUT_CLAMP, INPUT_CLAMP)
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct DcBlocker {
    k: f32,
    halflife_seconds: f32,
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new(sample_rate: f32, halflife_seconds: f32) -> Result<Self> {
        if !(halflife_seconds.is_finite() && halflife_seconds > 0.0) {
            return Err(Error::InvalidHalfLife(halflife_seconds));
        }
        let mut blocker = Self {
            k: 0.0,
            halflife_seconds,
            x1: 0.0,
            y1: 0.0,
        };
        blocker.set_sample_rate(sample_rate)?;
        Ok(blocker)
    }

    /// Recompute `k` for a new rate. The filter state is kept.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        crate::config::validate_sample_rate(sample_rate)?;
        let halflife_samples = sample_rate * self.halflife_seconds;
        self.k = 2f32.powf(-1.0 / halflife_samples);
        Ok(())
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.k * (x + self.y1 - self.x1);
        self.x1 = x;
        self.y1 = if y.is_finite() { y } else { 0.0 };
        self.y1
    }

    pub fn coefficient(&self) -> f32 {
        self.k
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// Optional DC blocking followed by soft saturation.
#[derive(Debug, Clone)]
pub struct OutputConditioner {
    dc: DcBlocker,
    dc_enabled: bool,
}

impl OutputConditioner {
    pub fn new(sample_rate: f32, halflife_seconds: f32, dc_enabled: bool) -> Result<Self> {
        Ok(Self {
            dc: DcBlocker::new(sample_rate, halflife_seconds)?,
            dc_enabled,
        })
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let x = if x.is_finite() { x } else { 0.0 };
        let x = if self.dc_enabled { self.dc.process(x) } else { x };
        saturate(x)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.dc.set_sample_rate(sample_rate)
    }

    pub fn set_dc_enabled(&mut self, enabled: bool) {
        if enabled != self.dc_enabled {
            self.dc.reset();
        }
        self.dc_enabled = enabled;
    }

    pub fn reset(&mut self) {
        self.dc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn saturate_is_identity_inside_knee() {
        for &x in &[-9.0, -4.5, 0.0, 3.3, 9.0] {
            assert_eq!(saturate(x), x);
        }
    }

    #[test]
    fn saturate_is_continuous_and_bounded() {
        assert_abs_diff_eq!(saturate(9.0001), 9.0001, epsilon = 1e-3);
        assert!(saturate(10.0) < 10.0 && saturate(10.0) > 9.5);
        assert!(saturate(1e6) <= 10.0);
        assert!(saturate(-1e6) >= -10.0);
        assert_eq!(saturate(-12.0), -saturate(12.0));
    }

    #[test]
    fn saturate_is_monotone() {
        let mut previous = saturate(-20.0);
        let mut x = -20.0;
        while x < 20.0 {
            x += 0.01;
            let y = saturate(x);
            assert!(y >= previous);
            previous = y;
        }
    }

    #[test]
    fn non_finite_becomes_zero() {
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(f32::INFINITY), 0.0);
        assert_eq!(clamp_input(f32::NEG_INFINITY), 0.0);
        assert_eq!(clamp_input(50.0), 12.0);
    }

    #[test]
    fn dc_blocker_removes_offset() {
        let mut dc = DcBlocker::new(48_000.0, 0.01).unwrap();
        let mut y = 0.0;
        for _ in 0..48_000 {
            y = dc.process(5.0);
        }
        assert!(y.abs() < 1e-3, "residual offset {}", y);
    }

    #[test]
    fn dc_blocker_halflife() {
        let mut dc = DcBlocker::new(48_000.0, 0.01).unwrap();
        // 480 samples after a step the output is half the step.
        let mut y = 0.0;
        for _ in 0..=480 {
            y = dc.process(1.0);
        }
        assert_abs_diff_eq!(y, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn dc_blocker_rejects_bad_settings() {
        assert!(DcBlocker::new(48_000.0, 0.0).is_err());
        assert!(DcBlocker::new(0.0, 0.01).is_err());

        let mut dc = DcBlocker::new(48_000.0, 0.01).unwrap();
        let k = dc.coefficient();
        assert!(dc.set_sample_rate(f32::NAN).is_err());
        assert_eq!(dc.coefficient(), k);
        dc.set_sample_rate(96_000.0).unwrap();
        assert!(dc.coefficient() > k);
    }

    #[test]
    fn conditioner_bypasses_dc_when_disabled() {
        let mut conditioner = OutputConditioner::new(48_000.0, 0.01, false).unwrap();
        for _ in 0..1000 {
            assert_eq!(conditioner.process(5.0), 5.0);
        }
        conditioner.set_dc_enabled(true);
        let mut y = 5.0;
        for _ in 0..48_000 {
            y = conditioner.process(5.0);
        }
        assert!(y.abs() < 1e-3);
    }
}
