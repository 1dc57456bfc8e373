//! Audio side of the bench: device setup and the realtime callback.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use nibble_dsp::{
    modules::{Bitfield, BitfieldInputs, BitfieldOutputs, ControlMessage, LogicModule},
    ProcessorConfig, MAX_BLOCK_SIZE,
};

use super::ui::{ScopeFrame, UiApp, UiState};

/// Capacity of the scope queue, in host samples.
const SCOPE_QUEUE_SIZE: usize = 16_384;
/// Capacity of the control queue.
const CONTROL_QUEUE_SIZE: usize = 64;
/// Level of bit 0 on the speakers (10 V gate → this amplitude).
const MONITOR_GAIN: f32 = 0.02;

pub struct Bench {
    sweep_hz: f32,
}

impl Bench {
    pub fn new() -> Self {
        Self { sweep_hz: 55.0 }
    }

    /// Frequency of the 0..10 V ramp feeding the quantizer.
    pub fn sweep_hz(mut self, hz: f32) -> Self {
        self.sweep_hz = hz;
        self
    }

    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let processor_config = ProcessorConfig {
            sample_rate,
            ..Bitfield::<8, 4>::default_config()
        }
        .dc_block(true);
        let bitfield: Bitfield =
            Bitfield::new(processor_config).wrap_err("failed to build the quantizer")?;

        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_SIZE);
        let (scope_tx, scope_rx) = RingBuffer::<ScopeFrame>::new(SCOPE_QUEUE_SIZE);

        let mut voice = AudioVoice {
            bitfield,
            control_rx,
            scope_tx,
            phase: 0.0,
            increment: self.sweep_hz / sample_rate,
            inputs: vec![BitfieldInputs::default(); MAX_BLOCK_SIZE],
            outputs: vec![BitfieldOutputs::default(); MAX_BLOCK_SIZE],
        };

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| voice.render(data, channels),
            |err| eprintln!("audio stream error: {}", err),
            None,
        )?;
        stream.play()?;

        let state = UiState::new(processor_config, self.sweep_hz);
        let mut terminal = ratatui::init();
        let result = UiApp::new(scope_rx, control_tx, state).run(&mut terminal);
        ratatui::restore();
        result
    }
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the audio callback owns.
struct AudioVoice {
    bitfield: Bitfield,
    control_rx: Consumer<ControlMessage>,
    scope_tx: Producer<ScopeFrame>,
    phase: f32,
    increment: f32,
    // Pre-allocated so the callback never allocates
    inputs: Vec<BitfieldInputs>,
    outputs: Vec<BitfieldOutputs>,
}

impl AudioVoice {
    fn render(&mut self, data: &mut [f32], channels: usize) {
        self.bitfield.drain(&mut self.control_rx);

        let channels = channels.max(1);
        for block in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = block.len() / channels;

            for input in &mut self.inputs[..frames] {
                *input = BitfieldInputs {
                    input: Some(self.phase * 10.0),
                    ..BitfieldInputs::default()
                };
                self.phase += self.increment;
                if self.phase >= 1.0 {
                    self.phase -= 1.0;
                }
            }

            self.bitfield
                .render(&self.inputs[..frames], &mut self.outputs[..frames]);

            for (frame, out) in block.chunks_mut(channels).zip(&self.outputs[..frames]) {
                // Drop scope frames while the UI is behind.
                let _ = self.scope_tx.push(ScopeFrame {
                    bits: out.bits,
                    step: out.step,
                });

                let sample = out.bits[0] * MONITOR_GAIN;
                for s in frame.iter_mut() {
                    *s = sample;
                }
            }
        }
    }
}
