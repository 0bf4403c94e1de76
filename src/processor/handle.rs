use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::Arc;

use crate::{
    config::{ConfigError, GlitchConfig, ParamError},
    dsp::{lfo::LfoWaveform, modulate::StutterParam},
    processor::{glitch::GlitchProcessor, message::ControlMessage, monitor::ProcessorMonitor},
    MAX_RATIO, MIN_DURATION_MS,
};

/// Slots in the control queue. Far more than a UI can produce between two callbacks.
pub const CONTROL_QUEUE_CAPACITY: usize = 256;

/// Accepted LFO rates, in Hz.
pub const LFO_FREQUENCY_RANGE: (f32, f32) = (0.01, 20.0);
/// Accepted tempo-sync factors, in cycles per beat.
pub const SYNC_FACTOR_RANGE: (f32, f32) = (1.0 / 64.0, 16.0);

/// Build a processor for the audio thread and the handle that controls it.
pub fn build(
    config: &GlitchConfig,
) -> Result<(GlitchProcessor<Consumer<ControlMessage>>, GlitchHandle), ConfigError> {
    let (tx, rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_CAPACITY);
    let processor = GlitchProcessor::new(config, rx)?;
    let handle = GlitchHandle {
        tx,
        monitor: Arc::clone(processor.monitor()),
    };
    Ok((processor, handle))
}

/// Control side of a [`GlitchProcessor`].
///
/// Every setter validates before queueing, so the render thread only ever
/// sees values it can use as-is. Nothing here blocks.
pub struct GlitchHandle {
    tx: Producer<ControlMessage>,
    monitor: Arc<ProcessorMonitor>,
}

impl GlitchHandle {
    pub fn set_stutter_enabled(&mut self, enabled: bool) -> Result<(), ParamError> {
        self.send(ControlMessage::SetStutterEnabled(enabled))
    }

    /// Freeze a fresh snapshot on the next block.
    pub fn recapture(&mut self) -> Result<(), ParamError> {
        self.send(ControlMessage::Recapture)
    }

    pub fn set_duration_ms(&mut self, ms: f32) -> Result<(), ParamError> {
        let max = self.monitor.max_duration_ms();
        check_range("duration_ms", ms, MIN_DURATION_MS, max)?;
        self.send(ControlMessage::SetDurationMs(ms))
    }

    pub fn set_repeats(&mut self, repeats: u32) -> Result<(), ParamError> {
        if repeats == 0 {
            return Err(ParamError::OutOfRange {
                name: "repeats",
                value: 0.0,
                min: 1.0,
                max: u32::MAX as f64,
            });
        }
        self.send(ControlMessage::SetRepeats(repeats))
    }

    /// Negative ratios play in reverse. Exactly 0 is rejected.
    pub fn set_ratio(&mut self, ratio: f32) -> Result<(), ParamError> {
        check_range("ratio", ratio, -MAX_RATIO, MAX_RATIO)?;
        if ratio == 0.0 {
            return Err(ParamError::ZeroRatio);
        }
        self.send(ControlMessage::SetRatio(ratio))
    }

    pub fn set_modulation_depth(
        &mut self,
        param: StutterParam,
        depth: f32,
    ) -> Result<(), ParamError> {
        check_range(param.name(), depth, 0.0, 1.0)?;
        self.send(ControlMessage::SetModulationDepth { param, depth })
    }

    /// Enabling captures the current values as the modulation centre.
    pub fn set_lfo_enabled(&mut self, enabled: bool) -> Result<(), ParamError> {
        self.send(ControlMessage::SetLfoEnabled(enabled))
    }

    pub fn set_lfo_frequency(&mut self, hz: f32) -> Result<(), ParamError> {
        let (min, max) = LFO_FREQUENCY_RANGE;
        check_range("lfo_frequency", hz, min, max)?;
        self.send(ControlMessage::SetLfoFrequency(hz))
    }

    pub fn set_lfo_waveform(&mut self, waveform: LfoWaveform) -> Result<(), ParamError> {
        self.send(ControlMessage::SetLfoWaveform(waveform))
    }

    pub fn set_tempo_sync(&mut self, enabled: bool) -> Result<(), ParamError> {
        self.send(ControlMessage::SetTempoSync(enabled))
    }

    pub fn set_sync_factor(&mut self, factor: f32) -> Result<(), ParamError> {
        let (min, max) = SYNC_FACTOR_RANGE;
        check_range("sync_factor", factor, min, max)?;
        self.send(ControlMessage::SetSyncFactor(factor))
    }

    /// Host tempo in BPM. `None`, or a tempo of 0 or below, means "unknown".
    pub fn set_host_tempo(&mut self, bpm: Option<f64>) -> Result<(), ParamError> {
        if let Some(value) = bpm {
            if !value.is_finite() {
                return Err(ParamError::NotFinite {
                    name: "host_tempo",
                    value,
                });
            }
        }
        self.send(ControlMessage::SetHostTempo(bpm.filter(|b| *b > 0.0)))
    }

    /// A stopped transport bypasses the stutter; capture keeps running.
    pub fn set_transport_playing(&mut self, playing: bool) -> Result<(), ParamError> {
        self.send(ControlMessage::SetTransportPlaying(playing))
    }

    /// Latest LFO output in [0, 1], for metering.
    pub fn current_oscillator_value(&self) -> f32 {
        self.monitor.oscillator_value()
    }

    pub fn monitor(&self) -> &ProcessorMonitor {
        &self.monitor
    }

    fn send(&mut self, msg: ControlMessage) -> Result<(), ParamError> {
        self.tx.push(msg).map_err(|_| {
            log::warn!("control queue full, dropping {:?}", msg);
            ParamError::QueueFull
        })
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite {
            name,
            value: value as f64,
        });
    }
    if value < min || value > max {
        return Err(ParamError::OutOfRange {
            name,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}
