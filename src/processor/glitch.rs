use std::sync::Arc;

use crate::{
    config::{ms_to_samples, ConfigError, GlitchConfig},
    dsp::{
        lfo::Lfo,
        modulate::{Modulatable, ModulationRouter, StutterParam},
        stutter::StutterBuffer,
    },
    processor::{
        message::{ControlMessage, MessageReceiver},
        monitor::ProcessorMonitor,
    },
};

/// One stutter buffer, one LFO, and the router between them.
///
/// Owned by the audio callback. Control changes arrive through `R` and are
/// applied at the top of the next `process` call; everything the control
/// side may want to read is published to the shared [`ProcessorMonitor`].
pub struct GlitchProcessor<R: MessageReceiver> {
    stutter: StutterBuffer,
    lfo: Lfo,
    router: ModulationRouter,
    rx: R,
    monitor: Arc<ProcessorMonitor>,

    sample_rate: f32,
    duration_ms: f32, // last user value, re-derived on configure
    stutter_requested: bool,
    transport_playing: bool,
}

impl<R: MessageReceiver> GlitchProcessor<R> {
    pub fn new(config: &GlitchConfig, rx: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut stutter = StutterBuffer::new(
            config.channels,
            config.sample_rate,
            config.max_duration_samples(),
        )?;
        stutter.set_duration_samples(config.duration_samples() as f32);
        stutter.set_repeats(config.repeats as f32);
        stutter.set_ratio(config.ratio);

        let mut lfo = Lfo::new(config.sample_rate)
            .with_waveform(config.lfo_waveform)
            .with_frequency(config.lfo_frequency);
        lfo.set_sync_factor(config.sync_factor);

        let router = ModulationRouter::new(stutter.min_duration_samples() as f32);

        log::info!(
            "glitch processor: {} ch @ {} Hz, max {} ms",
            config.channels,
            config.sample_rate,
            config.max_duration_ms
        );

        Ok(Self {
            stutter,
            lfo,
            router,
            rx,
            monitor: Arc::new(ProcessorMonitor::new(config.max_duration_ms)),
            sample_rate: config.sample_rate,
            duration_ms: config.duration_ms,
            stutter_requested: false,
            transport_playing: true,
        })
    }

    /// Resize for a new stream format. Allocates; call outside the audio callback.
    pub fn configure(
        &mut self,
        channels: usize,
        sample_rate: f32,
        max_duration_ms: f32,
    ) -> Result<(), ConfigError> {
        let max_duration = ms_to_samples(max_duration_ms, sample_rate);
        self.stutter.configure(channels, sample_rate, max_duration)?;

        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
        self.router
            .set_duration_floor(self.stutter.min_duration_samples() as f32);
        self.monitor.set_max_duration_ms(max_duration_ms);

        // The stored ms value is the source of truth across sample rates
        let duration = ms_to_samples(self.duration_ms, sample_rate) as f32;
        self.set_user_param(StutterParam::Duration, duration);
        Ok(())
    }

    /// Render one interleaved block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.apply(msg);
        }

        self.stutter
            .set_enabled(self.stutter_requested && self.transport_playing);

        let frames = block.len() / self.stutter.channels();
        if self.lfo.is_enabled() && frames > 0 {
            self.lfo.advance(frames);
            self.router.route(self.lfo.value(), &mut self.stutter);
        }

        self.stutter.process(block);

        self.monitor
            .publish(self.lfo.value(), self.lfo.is_enabled(), &self.stutter);
    }

    /// Apply a control change immediately, bypassing the queue.
    pub fn apply(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::SetStutterEnabled(enabled) => self.stutter_requested = enabled,
            ControlMessage::Recapture => self.stutter.request_recapture(),
            ControlMessage::SetDurationMs(ms) => {
                self.duration_ms = ms;
                let samples = ms_to_samples(ms, self.sample_rate) as f32;
                self.set_user_param(StutterParam::Duration, samples);
            }
            ControlMessage::SetRepeats(repeats) => {
                self.set_user_param(StutterParam::Repeats, repeats as f32)
            }
            ControlMessage::SetRatio(ratio) => self.set_user_param(StutterParam::Ratio, ratio),
            ControlMessage::SetModulationDepth { param, depth } => {
                self.router.set_depth(param, depth, &mut self.stutter)
            }
            ControlMessage::SetLfoEnabled(enabled) => {
                if enabled {
                    self.router.arm(&self.stutter);
                } else {
                    self.router.disarm(&mut self.stutter);
                }
                self.lfo.set_enabled(enabled);
            }
            ControlMessage::SetLfoFrequency(hz) => self.lfo.set_frequency(hz),
            ControlMessage::SetLfoWaveform(waveform) => self.lfo.set_waveform(waveform),
            ControlMessage::SetTempoSync(enabled) => self.lfo.set_sync_enabled(enabled),
            ControlMessage::SetSyncFactor(factor) => self.lfo.set_sync_factor(factor),
            ControlMessage::SetHostTempo(bpm) => self.lfo.set_tempo(bpm.unwrap_or(0.0)),
            ControlMessage::SetTransportPlaying(playing) => self.transport_playing = playing,
        }
    }

    /// A user edit. While modulation is armed it also becomes the new centre.
    fn set_user_param(&mut self, param: StutterParam, value: f32) {
        self.stutter.set_param(param, value);
        if self.router.is_armed() {
            // Store the clamped value the engine actually accepted
            self.router
                .set_original(param, self.stutter.get_param(param));
        }
    }

    /// Shared read side; clone the `Arc` for the control thread.
    pub fn monitor(&self) -> &Arc<ProcessorMonitor> {
        &self.monitor
    }

    pub fn stutter(&self) -> &StutterBuffer {
        &self.stutter
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    pub fn router(&self) -> &ModulationRouter {
        &self.router
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_transport_playing(&self) -> bool {
        self.transport_playing
    }
}
