use crate::config::ProcessorConfig;
use crate::dsp::accumulator::Taps;
use crate::dsp::logic::VOLTS_PER_STEP;
use crate::dsp::resample::round_trip_latency;
use crate::dsp::{
    Accumulator, AntiAlias, ClockMode, DetectorSettings, GateSample, Indicator, Nibble,
    RegisterInput,
};
use crate::error::Result;
use crate::{DEFAULT_OVERSAMPLE, DEFAULT_QUALITY};

use super::stage::{GateLane, OutputStage};
use super::{LogicModule, GATE_HIGH_VOLTS};

/*
Nibbler
=======

A 4-bit accumulator / shift register with gate-controlled addend.

    gate 1,2,4,8 ─┐ (OR add switches)
                  ├─▶ addend ─┐
    sub ──────────┘ (XOR sub) │      ┌─────────────┐
                              ├────▶ │ accumulator │──▶ out1..out8, carry, step
    clock, shift ─▶ edges ────┤      └─────────────┘──▶ offset step
    shift data ⊕ data xor ────┤
    carry in, reset ──────────┘

Every input is resolved at the subsample rate, and the register is stepped
once per subsample. When an edge latches the register, the outputs move from
the previous value to the new one weighted by the triggering detector's
level, which places the transition inside the subsample where the edge
actually happened.

Holding the shift gate high turns clock edges into shifts. In async mode a
rising shift edge latches on its own, and async is forced whenever the clock
input is unpatched.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NibblerParams {
    /// add1, add2, add4, add8
    pub add: [bool; 4],
    /// offset1, offset2
    pub offset: [bool; 2],
    pub subtract: bool,
    pub asynchronous: bool,
    pub reset_button: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NibblerInputs {
    /// gate1, gate2, gate4, gate8
    pub gates: [Option<f32>; 4],
    pub clock: Option<f32>,
    pub shift: Option<f32>,
    pub shift_data: Option<f32>,
    pub data_xor: Option<f32>,
    pub sub: Option<f32>,
    pub carry_in: Option<f32>,
    pub reset: Option<f32>,
    pub params: NibblerParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NibblerLights {
    pub bits: [f32; 4],
    pub carry: f32,
    pub step: f32,
    pub offset_step: f32,
    pub gates: [f32; 4],
    pub clock: f32,
    pub shift: f32,
    pub shift_data: f32,
    pub data_xor: f32,
    pub sub: f32,
    pub carry_in: f32,
    pub reset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NibblerOutputs {
    /// out1, out2, out4, out8
    pub bits: [f32; 4],
    pub carry: f32,
    pub step: f32,
    pub offset_step: f32,
    pub lights: NibblerLights,
}

// Lane order inside `Nibbler::lanes`.
const GATE: usize = 0;
const CLOCK: usize = 4;
const SHIFT: usize = 5;
const SHIFT_DATA: usize = 6;
const DATA_XOR: usize = 7;
const SUB: usize = 8;
const CARRY_IN: usize = 9;
const RESET: usize = 10;
const LANES: usize = 11;

// Output order inside `Nibbler::outs`: bits 0..3, then these.
const OUT_CARRY: usize = 4;
const OUT_STEP: usize = 5;
const OUT_OFFSET: usize = 6;
const OUTS: usize = 7;

pub struct Nibbler<const N: usize = DEFAULT_OVERSAMPLE, const Q: usize = DEFAULT_QUALITY> {
    config: ProcessorConfig,
    settings: DetectorSettings,
    lanes: [GateLane<N, Q>; LANES],
    register: Accumulator,
    previous: Taps,
    reset_button: bool,
    outs: [OutputStage<N, Q>; OUTS],
    out_lights: [Indicator; OUTS],
    lane_lights: [Indicator; LANES],
}

impl<const N: usize, const Q: usize> Nibbler<N, Q> {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let settings = DetectorSettings::from_config(&config, N);
        let rate = config.sample_rate;

        let lane = || GateLane::<N, Q>::new(config.anti_alias, &settings);
        let lanes = [
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
            lane()?,
        ];
        let out = || OutputStage::<N, Q>::new(&config);
        let outs = [out()?, out()?, out()?, out()?, out()?, out()?, out()?];

        log::debug!(
            "nibbler: {}x oversampling, quality {}, {} at {} Hz",
            N,
            Q,
            config.anti_alias.name(),
            rate
        );

        Ok(Self {
            lanes,
            register: Accumulator::new(),
            previous: Taps {
                main: 0,
                offset: Nibble::ZERO,
            },
            reset_button: false,
            outs,
            out_lights: std::array::from_fn(|_| Indicator::new(rate)),
            lane_lights: std::array::from_fn(|_| Indicator::new(rate)),
            config,
            settings,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Registered value, 0..=31 (bit 4 is the carry).
    pub fn held(&self) -> u8 {
        self.register.held()
    }

    pub fn register(&self) -> &Accumulator {
        &self.register
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn bit_level(value: u8, k: u32) -> f32 {
    ((value >> k) & 1) as f32
}

impl<const N: usize, const Q: usize> LogicModule for Nibbler<N, Q> {
    type Inputs = NibblerInputs;
    type Outputs = NibblerOutputs;

    fn process(&mut self, inputs: &NibblerInputs) -> NibblerOutputs {
        let params = &inputs.params;
        let mode = ClockMode::resolve(params.asynchronous, inputs.clock.is_some());

        let sources = [
            inputs.gates[0],
            inputs.gates[1],
            inputs.gates[2],
            inputs.gates[3],
            inputs.clock,
            inputs.shift,
            inputs.shift_data,
            inputs.data_xor,
            inputs.sub,
            inputs.carry_in,
            inputs.reset,
        ];
        let mut samples = [[GateSample {
            level: 0.0,
            high: false,
            rose: false,
            fell: false,
        }; N]; LANES];
        for ((lane, source), block) in self.lanes.iter_mut().zip(sources).zip(samples.iter_mut()) {
            *block = lane.process(source);
        }

        let button_rose = params.reset_button && !self.reset_button;
        self.reset_button = params.reset_button;

        let mut blocks = [[0.0f32; N]; OUTS];
        for j in 0..N {
            let lane = |index: usize| &samples[index][j];

            let addend = Nibble::from_bits(std::array::from_fn(|k| {
                params.add[k] || lane(GATE + k).high
            }));
            let clock = lane(CLOCK);
            let shift = lane(SHIFT);
            let reset = lane(RESET);
            let button = j == 0 && button_rose;

            let input = RegisterInput {
                addend,
                subtract: params.subtract ^ lane(SUB).high,
                carry_in: lane(CARRY_IN).high,
                shift_enable: shift.high,
                shift_data: lane(SHIFT_DATA).high,
                data_xor: lane(DATA_XOR).high,
                clock_edge: mode.triggers(clock.rose, shift.rose),
                reset_edge: reset.rose || button,
            };

            // Fraction of this subsample after the latching edge.
            let weight = if button {
                1.0
            } else if reset.rose {
                reset.level
            } else if input.clock_edge {
                if clock.rose {
                    clock.level
                } else {
                    shift.level
                }
            } else {
                1.0
            };

            let taps = self.register.tick(mode, &input, params.offset);
            let before = self.previous;
            for k in 0..4u32 {
                blocks[k as usize][j] =
                    lerp(bit_level(before.main, k), bit_level(taps.main, k), weight)
                        * GATE_HIGH_VOLTS;
            }
            blocks[OUT_CARRY][j] =
                lerp(bit_level(before.main, 4), bit_level(taps.main, 4), weight) * GATE_HIGH_VOLTS;
            blocks[OUT_STEP][j] = lerp(before.nibble().volts(), taps.nibble().volts(), weight);
            blocks[OUT_OFFSET][j] = lerp(before.offset.volts(), taps.offset.volts(), weight);
            self.previous = taps;
        }

        let mut values = [0.0f32; OUTS];
        for ((value, stage), block) in values.iter_mut().zip(&mut self.outs).zip(&blocks) {
            *value = stage.process(block);
        }

        let mut brightness = [0.0f32; OUTS];
        for (i, light) in self.out_lights.iter_mut().enumerate() {
            let full_scale = if i == OUT_STEP || i == OUT_OFFSET {
                15.0 * VOLTS_PER_STEP
            } else {
                GATE_HIGH_VOLTS
            };
            brightness[i] = light.process_volts(values[i], full_scale);
        }
        let mut inputs_lit = [0.0f32; LANES];
        for (i, light) in self.lane_lights.iter_mut().enumerate() {
            let mean = samples[i].iter().map(|s| s.level).sum::<f32>() / N as f32;
            inputs_lit[i] = light.process(mean);
        }

        NibblerOutputs {
            bits: [values[0], values[1], values[2], values[3]],
            carry: values[OUT_CARRY],
            step: values[OUT_STEP],
            offset_step: values[OUT_OFFSET],
            lights: NibblerLights {
                bits: [brightness[0], brightness[1], brightness[2], brightness[3]],
                carry: brightness[OUT_CARRY],
                step: brightness[OUT_STEP],
                offset_step: brightness[OUT_OFFSET],
                gates: [
                    inputs_lit[GATE],
                    inputs_lit[GATE + 1],
                    inputs_lit[GATE + 2],
                    inputs_lit[GATE + 3],
                ],
                clock: inputs_lit[CLOCK],
                shift: inputs_lit[SHIFT],
                shift_data: inputs_lit[SHIFT_DATA],
                data_xor: inputs_lit[DATA_XOR],
                sub: inputs_lit[SUB],
                carry_in: inputs_lit[CARRY_IN],
                reset: inputs_lit[RESET],
            },
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for stage in &mut self.outs {
            if let Err(err) = stage.set_sample_rate(sample_rate) {
                log::warn!("nibbler: ignoring sample rate change: {}", err);
                return;
            }
        }

        self.config.sample_rate = sample_rate;
        self.settings = DetectorSettings::from_config(&self.config, N);
        for lane in &mut self.lanes {
            lane.set_hold(self.settings.hold_samples);
        }
        for light in self.out_lights.iter_mut().chain(self.lane_lights.iter_mut()) {
            light.set_sample_rate(sample_rate);
        }
        log::debug!("nibbler: sample rate {} Hz", sample_rate);
    }

    fn set_anti_alias(&mut self, anti_alias: AntiAlias) {
        self.config.anti_alias = anti_alias;
        for lane in &mut self.lanes {
            lane.set_anti_alias(anti_alias, &self.settings);
        }
        log::debug!("nibbler: anti-alias {}", anti_alias.name());
    }

    fn set_dc_block(&mut self, enabled: bool) {
        self.config.dc_block = enabled;
        for stage in &mut self.outs {
            stage.set_dc_block(enabled);
        }
    }

    fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.reset();
        }
        self.register.reset();
        self.previous = Taps {
            main: 0,
            offset: Nibble::ZERO,
        };
        self.reset_button = false;
        for stage in &mut self.outs {
            stage.reset();
        }
        for light in self.out_lights.iter_mut().chain(self.lane_lights.iter_mut()) {
            light.reset();
        }
    }

    fn latency(&self) -> f32 {
        round_trip_latency::<N, Q>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pulse(nibbler: &mut Nibbler, inputs: &NibblerInputs, high: usize, low: usize) {
        let mut on = *inputs;
        on.clock = Some(10.0);
        let mut off = *inputs;
        off.clock = Some(0.0);
        for _ in 0..high {
            nibbler.process(&on);
        }
        for _ in 0..low {
            nibbler.process(&off);
        }
    }

    #[test]
    fn clocked_addition() {
        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let inputs = NibblerInputs {
            params: NibblerParams {
                add: [true, false, false, false],
                ..NibblerParams::default()
            },
            ..NibblerInputs::default()
        };
        for _ in 0..3 {
            pulse(&mut nibbler, &inputs, 10, 10);
        }
        assert_eq!(nibbler.held(), 3);
    }

    #[test]
    fn gate_sets_addend_bit() {
        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let inputs = NibblerInputs {
            gates: [None, None, Some(10.0), None],
            ..NibblerInputs::default()
        };
        pulse(&mut nibbler, &inputs, 10, 10);
        assert_eq!(nibbler.held(), 4);
    }

    #[test]
    fn sub_gate_flips_subtract_switch() {
        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let inputs = NibblerInputs {
            sub: Some(10.0),
            params: NibblerParams {
                add: [true, false, true, false],
                ..NibblerParams::default()
            },
            ..NibblerInputs::default()
        };
        pulse(&mut nibbler, &inputs, 10, 10);
        assert_eq!(nibbler.held(), 11);

        // switch and gate together cancel out
        let mut both = inputs;
        both.params.subtract = true;
        pulse(&mut nibbler, &both, 10, 10);
        assert_eq!(nibbler.held(), 16);
    }

    #[test]
    fn reset_button_clears_register() {
        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let mut inputs = NibblerInputs {
            params: NibblerParams {
                add: [true, true, false, false],
                ..NibblerParams::default()
            },
            ..NibblerInputs::default()
        };
        pulse(&mut nibbler, &inputs, 10, 10);
        assert_eq!(nibbler.held(), 3);

        inputs.params.reset_button = true;
        pulse(&mut nibbler, &inputs, 0, 1);
        assert_eq!(nibbler.held(), 0);
        // Holding the button does not keep resetting.
        pulse(&mut nibbler, &inputs, 10, 10);
        assert_eq!(nibbler.held(), 3);
    }

    #[test]
    fn sync_outputs_show_registered_value() {
        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let inputs = NibblerInputs {
            params: NibblerParams {
                add: [true, false, true, false],
                offset: [false, true],
                ..NibblerParams::default()
            },
            ..NibblerInputs::default()
        };
        pulse(&mut nibbler, &inputs, 10, 40);
        let mut off = inputs;
        off.clock = Some(0.0);
        let out = nibbler.process(&off);

        // held = 5: out1 and out4 high
        assert!(out.bits[0] > 9.0 && out.bits[2] > 9.0);
        assert!(out.bits[1].abs() < 1e-3 && out.bits[3].abs() < 1e-3);
        assert_abs_diff_eq!(out.step, 5.0 * VOLTS_PER_STEP, epsilon = 1e-3);
        // offset tap reads the pending sum 10, plus 4
        assert_abs_diff_eq!(out.offset_step, 14.0 * VOLTS_PER_STEP, epsilon = 1e-3);
    }

    #[test]
    fn carry_output_follows_overflow() {
        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let inputs = NibblerInputs {
            params: NibblerParams {
                add: [true, true, true, true],
                ..NibblerParams::default()
            },
            ..NibblerInputs::default()
        };
        // 15 + 15 = 30 = carry + 14
        pulse(&mut nibbler, &inputs, 10, 10);
        pulse(&mut nibbler, &inputs, 10, 40);
        let mut off = inputs;
        off.clock = Some(0.0);
        let out = nibbler.process(&off);
        assert_eq!(nibbler.held(), 30);
        assert!(out.carry > 9.0);
        assert_abs_diff_eq!(out.step, 14.0 * VOLTS_PER_STEP, epsilon = 1e-3);
    }

    #[test]
    fn every_strategy_counts_clocks() {
        for anti_alias in AntiAlias::ALL {
            let config = ProcessorConfig::default().anti_alias(anti_alias);
            let mut nibbler: Nibbler = Nibbler::new(config).unwrap();
            let inputs = NibblerInputs {
                params: NibblerParams {
                    add: [true, false, false, false],
                    ..NibblerParams::default()
                },
                ..NibblerInputs::default()
            };
            for _ in 0..7 {
                pulse(&mut nibbler, &inputs, 12, 12);
            }
            assert_eq!(nibbler.held(), 7, "{:?}", anti_alias);
        }
    }
}
