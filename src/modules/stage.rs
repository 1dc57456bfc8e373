use crate::config::ProcessorConfig;
use crate::dsp::{
    clamp_input, Decimator, DetectorSettings, GateDetector, GateSample, OutputConditioner,
    Upsampler,
};
use crate::dsp::{AntiAlias, LevelDetector};
use crate::error::Result;

/// Host-rate input → `N` clamped subsamples.
pub struct InputStage<const N: usize, const Q: usize> {
    up: Upsampler<N, Q>,
}

impl<const N: usize, const Q: usize> InputStage<N, Q> {
    pub fn new() -> Result<Self> {
        Ok(Self {
            up: Upsampler::new()?,
        })
    }

    /// Unpatched inputs read as 0 V.
    #[inline]
    pub fn process(&mut self, x: Option<f32>) -> [f32; N] {
        self.up.upsample(x.map_or(0.0, clamp_input))
    }

    /// Upsample an already conditioned value, such as a quantizer level,
    /// without the ±12 V clamp. Non-finite values read as 0.
    #[inline]
    pub fn process_unclamped(&mut self, x: f32) -> [f32; N] {
        self.up.upsample(if x.is_finite() { x } else { 0.0 })
    }

    pub fn reset(&mut self) {
        self.up.reset();
    }
}

/// `N` subsamples → one conditioned host-rate output.
pub struct OutputStage<const N: usize, const Q: usize> {
    down: Decimator<N, Q>,
    conditioner: OutputConditioner,
}

impl<const N: usize, const Q: usize> OutputStage<N, Q> {
    pub fn new(config: &ProcessorConfig) -> Result<Self> {
        Ok(Self {
            down: Decimator::new()?,
            conditioner: OutputConditioner::new(
                config.sample_rate,
                config.dc_halflife_seconds,
                config.dc_block,
            )?,
        })
    }

    #[inline]
    pub fn process(&mut self, block: &[f32; N]) -> f32 {
        let y = self.down.decimate(block);
        self.conditioner.process(y)
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        self.conditioner.set_sample_rate(sample_rate)
    }

    pub fn set_dc_block(&mut self, enabled: bool) {
        self.conditioner.set_dc_enabled(enabled);
    }

    pub fn reset(&mut self) {
        self.down.reset();
        self.conditioner.reset();
    }
}

/// A gate input resolved at the subsample rate.
pub struct GateLane<const N: usize, const Q: usize> {
    input: InputStage<N, Q>,
    detector: GateDetector,
}

impl<const N: usize, const Q: usize> GateLane<N, Q> {
    pub fn new(anti_alias: AntiAlias, settings: &DetectorSettings) -> Result<Self> {
        Ok(Self {
            input: InputStage::new()?,
            detector: GateDetector::new(anti_alias, settings),
        })
    }

    pub fn process(&mut self, x: Option<f32>) -> [GateSample; N] {
        let block = self.input.process(x);
        block.map(|sample| self.detector.step(sample))
    }

    /// Latched state after the last subsample.
    pub fn is_high(&self) -> bool {
        self.detector.is_high()
    }

    pub fn set_anti_alias(&mut self, anti_alias: AntiAlias, settings: &DetectorSettings) {
        if self.detector.strategy() != anti_alias {
            self.detector = GateDetector::new(anti_alias, settings);
        }
    }

    pub fn set_hold(&mut self, hold: u32) {
        self.detector.set_hold(hold);
    }

    pub fn reset(&mut self) {
        self.input.reset();
        self.detector.reset();
    }
}
