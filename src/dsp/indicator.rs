//! Smoothed indicator brightness.
//!
//! Lights follow their target with a one-pole lag so audio-rate gates read as
//! a steady glow instead of flicker:
//!
//!   b += (target − b) · min(1, λ · dt)
//!
//! with λ = 30 s⁻¹ and dt the host sample period. Output stays in [0, 1].

/// Smoothing rate in 1/s.
pub const INDICATOR_LAMBDA: f32 = 30.0;

#[derive(Debug, Clone)]
pub struct Indicator {
    brightness: f32,
    coeff: f32,
}

impl Indicator {
    pub fn new(sample_rate: f32) -> Self {
        let mut indicator = Self {
            brightness: 0.0,
            coeff: 0.0,
        };
        indicator.set_sample_rate(sample_rate);
        indicator
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let coeff = INDICATOR_LAMBDA / sample_rate;
        self.coeff = if coeff.is_finite() {
            coeff.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Move one host sample towards `target` (clamped to [0, 1]).
    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        let target = if target.is_finite() {
            target.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.brightness += (target - self.brightness) * self.coeff;
        self.brightness = self.brightness.clamp(0.0, 1.0);
        self.brightness
    }

    /// Drive the light from a voltage, full brightness at `full_scale` volts.
    #[inline]
    pub fn process_volts(&mut self, volts: f32, full_scale: f32) -> f32 {
        self.process(volts / full_scale)
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn reset(&mut self) {
        self.brightness = 0.0;
    }
}
