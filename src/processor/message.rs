#[cfg(feature = "rtrb")]
use rtrb::Consumer;
use std::collections::VecDeque;

use crate::dsp::{lfo::LfoWaveform, modulate::StutterParam};

/// Control changes for the render thread. Values are validated before they are sent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    SetStutterEnabled(bool),
    Recapture,
    SetDurationMs(f32),
    SetRepeats(u32),
    SetRatio(f32),
    SetModulationDepth { param: StutterParam, depth: f32 },
    SetLfoEnabled(bool),
    SetLfoFrequency(f32),
    SetLfoWaveform(LfoWaveform),
    SetTempoSync(bool),
    SetSyncFactor(f32),
    /// `None` when the host cannot report a tempo.
    SetHostTempo(Option<f64>),
    SetTransportPlaying(bool),
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

/// Single-threaded hosts and tests can queue messages directly.
impl MessageReceiver for VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}

/// For a processor driven only through its own methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<ControlMessage> {
        None
    }
}
