use crate::config::ProcessorConfig;
use crate::dsp::logic::VOLTS_PER_STEP;
use crate::dsp::resample::round_trip_latency;
use crate::dsp::{combine_levels, AntiAlias, DetectorSettings, Indicator, LogicMode};
use crate::error::Result;
use crate::{DEFAULT_OVERSAMPLE, DEFAULT_QUALITY};

use super::stage::{GateLane, OutputStage};
use super::{LogicModule, GATE_HIGH_VOLTS};

/*
Bitmix
======

Eight gate inputs form two 4-bit words: lanes 0..3 are A (bits 1, 2, 4, 8),
lanes 4..7 are B. Each subsample the Bitwise Logic Core combines them and the
four result lanes come out as gates, plus a step output holding the whole
nibble.

    gate 0..3 ─▶ detect ─┐
                         ├─▶ AND / ADD / OR / XOR ─▶ lane 0..3 ─▶ ×10 V
    gate 4..7 ─▶ detect ─┘                        └─▶ Σ 2^k · lane ─▶ step

A lane whose enable switch is off reads as 0 V, not as its input.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmixParams {
    pub enabled: [bool; 8],
    pub mode_a: bool,
    pub mode_b: bool,
}

impl Default for BitmixParams {
    fn default() -> Self {
        Self {
            enabled: [true; 8],
            mode_a: false,
            mode_b: false,
        }
    }
}

impl BitmixParams {
    pub fn mode(&self) -> LogicMode {
        LogicMode::from_switches(self.mode_a, self.mode_b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitmixInputs {
    pub gates: [Option<f32>; 8],
    pub params: BitmixParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitmixLights {
    pub inputs: [f32; 8],
    pub lanes: [f32; 4],
    pub step: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BitmixOutputs {
    pub lanes: [f32; 4],
    pub step: f32,
    pub lights: BitmixLights,
}

pub struct Bitmix<const N: usize = DEFAULT_OVERSAMPLE, const Q: usize = DEFAULT_QUALITY> {
    config: ProcessorConfig,
    settings: DetectorSettings,
    gates: [GateLane<N, Q>; 8],
    lane_out: [OutputStage<N, Q>; 4],
    step_out: OutputStage<N, Q>,
    input_lights: [Indicator; 8],
    lane_lights: [Indicator; 4],
    step_light: Indicator,
}

impl<const N: usize, const Q: usize> Bitmix<N, Q> {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let settings = DetectorSettings::from_config(&config, N);
        let rate = config.sample_rate;

        let lane = || GateLane::<N, Q>::new(config.anti_alias, &settings);
        let gates = [
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
        ];

        log::debug!(
            "bitmix: {}x oversampling, quality {}, {} at {} Hz",
            N,
            Q,
            config.anti_alias.name(),
            rate
        );

        Ok(Self {
            gates,
            lane_out: [
                OutputStage::new(&config)?,
                OutputStage::new(&config)?,
                OutputStage::new(&config)?,
                OutputStage::new(&config)?,
            ],
            step_out: OutputStage::new(&config)?,
            input_lights: std::array::from_fn(|_| Indicator::new(rate)),
            lane_lights: std::array::from_fn(|_| Indicator::new(rate)),
            step_light: Indicator::new(rate),
            config,
            settings,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    fn output_stages(&mut self) -> impl Iterator<Item = &mut OutputStage<N, Q>> {
        self.lane_out.iter_mut().chain(std::iter::once(&mut self.step_out))
    }
}

impl<const N: usize, const Q: usize> LogicModule for Bitmix<N, Q> {
    type Inputs = BitmixInputs;
    type Outputs = BitmixOutputs;

    fn process(&mut self, inputs: &BitmixInputs) -> BitmixOutputs {
        let params = &inputs.params;
        let mode = params.mode();

        let mut levels = [[0.0f32; N]; 8];
        for (i, gate) in self.gates.iter_mut().enumerate() {
            let x = if params.enabled[i] {
                inputs.gates[i]
            } else {
                None
            };
            for (level, sample) in levels[i].iter_mut().zip(gate.process(x)) {
                *level = sample.level;
            }
        }

        let mut lane_blocks = [[0.0f32; N]; 4];
        let mut step_block = [0.0f32; N];
        for j in 0..N {
            let a = [levels[0][j], levels[1][j], levels[2][j], levels[3][j]];
            let b = [levels[4][j], levels[5][j], levels[6][j], levels[7][j]];
            let (lanes, _carry) = combine_levels(mode, a, b);

            let mut step = 0.0;
            for (k, &lane) in lanes.iter().enumerate() {
                lane_blocks[k][j] = lane * GATE_HIGH_VOLTS;
                step += lane * (1 << k) as f32;
            }
            step_block[j] = step * VOLTS_PER_STEP;
        }

        let mut outputs = BitmixOutputs::default();
        for k in 0..4 {
            outputs.lanes[k] = self.lane_out[k].process(&lane_blocks[k]);
            outputs.lights.lanes[k] =
                self.lane_lights[k].process_volts(outputs.lanes[k], GATE_HIGH_VOLTS);
        }
        outputs.step = self.step_out.process(&step_block);
        outputs.lights.step = self
            .step_light
            .process_volts(outputs.step, 15.0 * VOLTS_PER_STEP);

        for (i, light) in self.input_lights.iter_mut().enumerate() {
            let mean = levels[i].iter().sum::<f32>() / N as f32;
            outputs.lights.inputs[i] = light.process(mean);
        }

        outputs
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for stage in self.output_stages() {
            if let Err(err) = stage.set_sample_rate(sample_rate) {
                log::warn!("bitmix: ignoring sample rate change: {}", err);
                return;
            }
        }

        self.config.sample_rate = sample_rate;
        self.settings = DetectorSettings::from_config(&self.config, N);
        for gate in &mut self.gates {
            gate.set_hold(self.settings.hold_samples);
        }
        for light in self
            .input_lights
            .iter_mut()
            .chain(self.lane_lights.iter_mut())
            .chain(std::iter::once(&mut self.step_light))
        {
            light.set_sample_rate(sample_rate);
        }
        log::debug!("bitmix: sample rate {} Hz", sample_rate);
    }

    fn set_anti_alias(&mut self, anti_alias: AntiAlias) {
        self.config.anti_alias = anti_alias;
        for gate in &mut self.gates {
            gate.set_anti_alias(anti_alias, &self.settings);
        }
        log::debug!("bitmix: anti-alias {}", anti_alias.name());
    }

    fn set_dc_block(&mut self, enabled: bool) {
        self.config.dc_block = enabled;
        for stage in self.output_stages() {
            stage.set_dc_block(enabled);
        }
    }

    fn reset(&mut self) {
        for gate in &mut self.gates {
            gate.reset();
        }
        for stage in self.output_stages() {
            stage.reset();
        }
        for light in self
            .input_lights
            .iter_mut()
            .chain(self.lane_lights.iter_mut())
            .chain(std::iter::once(&mut self.step_light))
        {
            light.reset();
        }
    }

    fn latency(&self) -> f32 {
        round_trip_latency::<N, Q>()
    }
}
