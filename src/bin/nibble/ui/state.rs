//! Shared state types for UI communication

use nibble_dsp::{dsp::AntiAlias, ProcessorConfig};

/// One host sample of quantizer output, sent from the audio thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScopeFrame {
    /// out1, out2, out4, out8 in volts
    pub bits: [f32; 4],
    pub step: f32,
}

/// What the UI believes the audio thread is running.
///
/// Only the UI thread changes it, right after queueing the matching
/// control message.
#[derive(Clone, Copy, Debug)]
pub struct UiState {
    pub sample_rate: f32,
    pub anti_alias: AntiAlias,
    pub dc_block: bool,
    pub sweep_hz: f32,
    /// Control messages that did not fit in the queue.
    pub dropped: u32,
}

impl UiState {
    pub fn new(config: ProcessorConfig, sweep_hz: f32) -> Self {
        Self {
            sample_rate: config.sample_rate,
            anti_alias: config.anti_alias,
            dc_block: config.dc_block,
            sweep_hz,
            dropped: 0,
        }
    }
}
