//! The three processors built from the [`crate::dsp`] primitives.
//!
//! Each module owns all of its state and is driven one host sample at a time
//! through [`LogicModule::process`]. Inside, every input is upsampled, the
//! logic runs once per subsample and each output is decimated and
//! conditioned on the way out.

pub mod bitfield;
pub mod bitmix;
pub mod message;
pub mod nibbler;
pub mod stage;

pub use bitfield::{Bitfield, BitfieldInputs, BitfieldOutputs, BitfieldParams};
pub use bitmix::{Bitmix, BitmixInputs, BitmixOutputs, BitmixParams};
pub use message::{ControlMessage, MessageReceiver};
pub use nibbler::{Nibbler, NibblerInputs, NibblerOutputs, NibblerParams};

use crate::dsp::AntiAlias;

/// Logic-high output voltage.
pub const GATE_HIGH_VOLTS: f32 = 10.0;
/// Bitfield quantization: 16 steps per 10 V.
pub const LEVELS_PER_VOLT: f32 = 16.0 / 10.0;

/// Core trait for the logic processors
///
/// Hosts call `process` once per host sample. Everything else is control
/// and must not be called concurrently with `process`.
pub trait LogicModule: Send {
    type Inputs;
    type Outputs;

    fn process(&mut self, inputs: &Self::Inputs) -> Self::Outputs;

    /// Invalid rates are logged and ignored.
    fn set_sample_rate(&mut self, sample_rate: f32);

    fn set_anti_alias(&mut self, anti_alias: AntiAlias);

    fn set_dc_block(&mut self, enabled: bool);

    /// Clear all filter, detector and register state.
    fn reset(&mut self);

    /// Delay from input to output in host samples.
    fn latency(&self) -> f32;

    fn apply(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SampleRate(rate) => self.set_sample_rate(rate),
            ControlMessage::AntiAlias(anti_alias) => self.set_anti_alias(anti_alias),
            ControlMessage::DcBlock(enabled) => self.set_dc_block(enabled),
            ControlMessage::Reset => self.reset(),
        }
    }

    /// Apply every pending control message. Call between samples.
    fn drain<R: MessageReceiver>(&mut self, rx: &mut R)
    where
        Self: Sized,
    {
        while let Some(message) = rx.pop() {
            self.apply(message);
        }
    }

    /// Process a run of samples.
    fn render(&mut self, inputs: &[Self::Inputs], outputs: &mut [Self::Outputs])
    where
        Self: Sized,
    {
        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            *output = self.process(input);
        }
    }
}

/// Allow boxed modules to be used as modules (for dynamic dispatch)
impl<I, O> LogicModule for Box<dyn LogicModule<Inputs = I, Outputs = O>> {
    type Inputs = I;
    type Outputs = O;

    fn process(&mut self, inputs: &I) -> O {
        (**self).process(inputs)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        (**self).set_sample_rate(sample_rate)
    }

    fn set_anti_alias(&mut self, anti_alias: AntiAlias) {
        (**self).set_anti_alias(anti_alias)
    }

    fn set_dc_block(&mut self, enabled: bool) {
        (**self).set_dc_block(enabled)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn latency(&self) -> f32 {
        (**self).latency()
    }
}
