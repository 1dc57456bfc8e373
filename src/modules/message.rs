#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::AntiAlias;

/// Control changes delivered to a running module from another thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    SampleRate(f32),
    AntiAlias(AntiAlias),
    DcBlock(bool),
    Reset,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// Plain queue for hosts without a realtime channel (and for tests).
impl MessageReceiver for std::collections::VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}
