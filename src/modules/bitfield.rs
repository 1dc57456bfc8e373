use crate::config::ProcessorConfig;
use crate::dsp::logic::VOLTS_PER_STEP;
use crate::dsp::resample::round_trip_latency;
use crate::dsp::{
    clamp_input, Adaa2, AntiAlias, Antiderivative, BitDetector, DetectorSettings, Indicator,
    LevelDetector, Sawtooth,
};
use crate::error::Result;
use crate::{DEFAULT_OVERSAMPLE, DEFAULT_QUALITY};

use super::stage::{InputStage, OutputStage};
use super::{LogicModule, GATE_HIGH_VOLTS, LEVELS_PER_VOLT};

/*
Bitfield
========

Quantizes a control voltage into a 4-bit number and puts each bit on its own
output.

    input ─┐
    cv ────┼─▶ mix ─▶ ×1.6 ─▶ upsample ─▶ bit k = floor(level / 2^k) mod 2 ─▶ out1..out8
    inject ┘                      │                                  └─▶ step
                                  └──────▶ level − floor(level) ─────────▶ saw

Unipolar range maps 0..10 V onto levels 0..16. Bipolar shifts the mix up by
5 V first, so −5..5 V covers the same 16 levels.

The generated bits are exactly the kind of hard discontinuity that aliases,
so they run through a `BitDetector` per bit at the subsample rate, fed
`level / 2^k`. The saw is the fractional part of the level, handled by a
second-order ADAA unless anti-aliasing is switched off.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitfieldParams {
    /// Input attenuator, 0..1.
    pub gain: f32,
    /// CV attenuator, 0..1.
    pub cv_depth: f32,
    pub bipolar: bool,
}

impl Default for BitfieldParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            cv_depth: 0.0,
            bipolar: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitfieldInputs {
    pub input: Option<f32>,
    pub cv: Option<f32>,
    pub inject: Option<f32>,
    pub params: BitfieldParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitfieldLights {
    /// Level bar, segment 0 at the bottom.
    pub level: [f32; 8],
    pub bits: [f32; 4],
    pub step: f32,
    pub saw: f32,
    pub input: f32,
    pub cv: f32,
    pub inject: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitfieldOutputs {
    /// out1, out2, out4, out8
    pub bits: [f32; 4],
    pub step: f32,
    pub saw: f32,
    pub lights: BitfieldLights,
}

pub struct Bitfield<const N: usize = DEFAULT_OVERSAMPLE, const Q: usize = DEFAULT_QUALITY> {
    config: ProcessorConfig,
    settings: DetectorSettings,
    input: InputStage<N, Q>,
    bits: [BitDetector; 4],
    saw: Adaa2<Sawtooth>,
    bit_out: [OutputStage<N, Q>; 4],
    step_out: OutputStage<N, Q>,
    saw_out: OutputStage<N, Q>,
    level_lights: [Indicator; 8],
    bit_lights: [Indicator; 4],
    // step, saw, input, cv, inject
    panel_lights: [Indicator; 5],
}

impl<const N: usize, const Q: usize> Bitfield<N, Q> {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let settings = DetectorSettings::from_config(&config, N);
        let rate = config.sample_rate;

        log::debug!(
            "bitfield: {}x oversampling, quality {}, {} at {} Hz",
            N,
            Q,
            config.anti_alias.name(),
            rate
        );

        Ok(Self {
            input: InputStage::new()?,
            bits: std::array::from_fn(|_| BitDetector::new(config.anti_alias, &settings)),
            saw: Adaa2::new(Sawtooth),
            bit_out: [
                OutputStage::new(&config)?,
                OutputStage::new(&config)?,
                OutputStage::new(&config)?,
                OutputStage::new(&config)?,
            ],
            step_out: OutputStage::new(&config)?,
            saw_out: OutputStage::new(&config)?,
            level_lights: std::array::from_fn(|_| Indicator::new(rate)),
            bit_lights: std::array::from_fn(|_| Indicator::new(rate)),
            panel_lights: std::array::from_fn(|_| Indicator::new(rate)),
            config,
            settings,
        })
    }

    /// Default configuration with the ADAA staircase on every bit, which is
    /// what the quantizer ships with. Gate-driven modules default to
    /// analytic edges instead.
    pub fn default_config() -> ProcessorConfig {
        ProcessorConfig::default().anti_alias(AntiAlias::Adaa)
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Quantizer level for a set of inputs, before upsampling.
    pub fn level(inputs: &BitfieldInputs) -> f32 {
        let params = &inputs.params;
        let mut volts = params.gain.clamp(0.0, 1.0) * clamp_input(inputs.input.unwrap_or(0.0))
            + params.cv_depth.clamp(0.0, 1.0) * clamp_input(inputs.cv.unwrap_or(0.0))
            + clamp_input(inputs.inject.unwrap_or(0.0));
        volts = clamp_input(volts);
        if params.bipolar {
            volts += 5.0;
        }
        volts * LEVELS_PER_VOLT
    }
}

/// Levels closer than this to an integer are treated as sitting on it.
const LEVEL_SNAP: f32 = 1e-4;

/// The upsampler reproduces a constant only to within rounding, so a voltage
/// on an exact step would otherwise flip between two codes every subsample.
#[inline]
fn snap_level(x: f32) -> f32 {
    let nearest = x.round();
    if (x - nearest).abs() < LEVEL_SNAP {
        nearest
    } else {
        x
    }
}

impl<const N: usize, const Q: usize> LogicModule for Bitfield<N, Q> {
    type Inputs = BitfieldInputs;
    type Outputs = BitfieldOutputs;

    fn process(&mut self, inputs: &BitfieldInputs) -> BitfieldOutputs {
        let level = Self::level(inputs);
        let levels = self.input.process_unclamped(level);
        let band_limit_saw = matches!(
            self.config.anti_alias,
            AntiAlias::Adaa | AntiAlias::AnalyticEdge
        );

        let mut bit_blocks = [[0.0f32; N]; 4];
        let mut step_block = [0.0f32; N];
        let mut saw_block = [0.0f32; N];

        for (j, &x) in levels.iter().enumerate() {
            let x = snap_level(x);
            let mut scale = 1.0;
            let mut step = 0.0;
            for (k, detector) in self.bits.iter_mut().enumerate() {
                let bit = detector.process(x / scale);
                bit_blocks[k][j] = bit * GATE_HIGH_VOLTS;
                step += bit * scale;
                scale *= 2.0;
            }
            step_block[j] = step * VOLTS_PER_STEP;

            // Keep the ADAA history current even while bypassed.
            let smooth = self.saw.process_sample(x);
            let saw = if band_limit_saw {
                smooth
            } else {
                Sawtooth.eval(x as f64) as f32
            };
            saw_block[j] = saw * GATE_HIGH_VOLTS;
        }

        let mut outputs = BitfieldOutputs::default();
        for k in 0..4 {
            outputs.bits[k] = self.bit_out[k].process(&bit_blocks[k]);
            outputs.lights.bits[k] =
                self.bit_lights[k].process_volts(outputs.bits[k], GATE_HIGH_VOLTS);
        }
        outputs.step = self.step_out.process(&step_block);
        outputs.saw = self.saw_out.process(&saw_block);

        for (i, light) in self.level_lights.iter_mut().enumerate() {
            outputs.lights.level[i] = light.process(level / 2.0 - i as f32);
        }
        let [step_light, saw_light, input_light, cv_light, inject_light] = &mut self.panel_lights;
        outputs.lights.step = step_light.process_volts(outputs.step, 15.0 * VOLTS_PER_STEP);
        outputs.lights.saw = saw_light.process_volts(outputs.saw, GATE_HIGH_VOLTS);
        outputs.lights.input =
            input_light.process_volts(inputs.input.unwrap_or(0.0).abs(), GATE_HIGH_VOLTS);
        outputs.lights.cv = cv_light.process_volts(inputs.cv.unwrap_or(0.0).abs(), GATE_HIGH_VOLTS);
        outputs.lights.inject =
            inject_light.process_volts(inputs.inject.unwrap_or(0.0).abs(), GATE_HIGH_VOLTS);

        outputs
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let stages = self
            .bit_out
            .iter_mut()
            .chain([&mut self.step_out, &mut self.saw_out]);
        for stage in stages {
            if let Err(err) = stage.set_sample_rate(sample_rate) {
                log::warn!("bitfield: ignoring sample rate change: {}", err);
                return;
            }
        }

        self.config.sample_rate = sample_rate;
        self.settings = DetectorSettings::from_config(&self.config, N);
        for detector in &mut self.bits {
            detector.set_hold(self.settings.hold_samples);
        }
        for light in self
            .level_lights
            .iter_mut()
            .chain(self.bit_lights.iter_mut())
            .chain(self.panel_lights.iter_mut())
        {
            light.set_sample_rate(sample_rate);
        }
        log::debug!("bitfield: sample rate {} Hz", sample_rate);
    }

    fn set_anti_alias(&mut self, anti_alias: AntiAlias) {
        if anti_alias == self.config.anti_alias {
            return;
        }
        self.config.anti_alias = anti_alias;
        self.bits = std::array::from_fn(|_| BitDetector::new(anti_alias, &self.settings));
        log::debug!("bitfield: anti-alias {}", anti_alias.name());
    }

    fn set_dc_block(&mut self, enabled: bool) {
        self.config.dc_block = enabled;
        for stage in self
            .bit_out
            .iter_mut()
            .chain([&mut self.step_out, &mut self.saw_out])
        {
            stage.set_dc_block(enabled);
        }
    }

    fn reset(&mut self) {
        self.input.reset();
        for detector in &mut self.bits {
            detector.reset();
        }
        self.saw.reset();
        for stage in self
            .bit_out
            .iter_mut()
            .chain([&mut self.step_out, &mut self.saw_out])
        {
            stage.reset();
        }
        for light in self
            .level_lights
            .iter_mut()
            .chain(self.bit_lights.iter_mut())
            .chain(self.panel_lights.iter_mut())
        {
            light.reset();
        }
    }

    fn latency(&self) -> f32 {
        round_trip_latency::<N, Q>()
    }
}
