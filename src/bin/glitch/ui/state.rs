//! Control-side copy of the parameters
//!
//! The UI keeps its own values and sends every change through the handle;
//! it never reads parameters back from the audio thread.

use glitch_dsp::{GlitchConfig, LfoWaveform, StutterParam, MAX_RATIO, MIN_DURATION_MS, MIN_RATIO};

const DURATION_STEP_MS: f32 = 10.0;
const RATIO_STEP: f32 = 0.1;
const DEPTH_STEP: f32 = 0.1;
const LFO_FREQUENCY_STEP: f32 = 1.25; // multiplicative
const BPM_STEP: f64 = 5.0;
const MAX_SYNC_EXPONENT: i32 = 4;

/// Static information gathered at startup
pub struct UiInit {
    pub sample_rate: f32,
    pub channels: usize,
    pub bpm: f64,
    pub config: GlitchConfig,
}

/// Everything the panel shows and the keys edit
#[derive(Clone, Debug)]
pub struct ControlState {
    pub stutter_enabled: bool,
    pub transport_playing: bool,
    pub duration_ms: f32,
    pub max_duration_ms: f32,
    pub repeats: u32,
    pub ratio: f32,
    pub depths: [f32; 3],
    pub selected: StutterParam,
    pub lfo_enabled: bool,
    pub lfo_frequency: f32,
    pub waveform: LfoWaveform,
    pub tempo_sync: bool,
    /// Sync factor is 2^exponent cycles per beat
    pub sync_exponent: i32,
    pub bpm: f64,
}

impl ControlState {
    pub fn new(init: &UiInit) -> Self {
        let config = &init.config;
        Self {
            stutter_enabled: false,
            transport_playing: true,
            duration_ms: config.duration_ms,
            max_duration_ms: config.max_duration_ms,
            repeats: config.repeats,
            ratio: config.ratio,
            depths: [0.0; 3],
            selected: StutterParam::Duration,
            lfo_enabled: false,
            lfo_frequency: config.lfo_frequency,
            waveform: config.lfo_waveform,
            tempo_sync: false,
            sync_exponent: config.sync_factor.log2().round() as i32,
            bpm: init.bpm,
        }
    }

    pub fn nudge_duration(&mut self, steps: f32) -> f32 {
        self.duration_ms = (self.duration_ms + steps * DURATION_STEP_MS)
            .clamp(MIN_DURATION_MS, self.max_duration_ms);
        self.duration_ms
    }

    pub fn nudge_repeats(&mut self, steps: i32) -> u32 {
        self.repeats = self.repeats.saturating_add_signed(steps).max(1);
        self.repeats
    }

    /// Steps through zero straight from +0.1 to -0.1.
    pub fn nudge_ratio(&mut self, steps: f32) -> f32 {
        let mut ratio = (self.ratio + steps * RATIO_STEP).clamp(-MAX_RATIO, MAX_RATIO);
        if ratio.abs() < MIN_RATIO * 0.5 {
            ratio = MIN_RATIO * steps.signum();
        }
        // Keep a tenth grid so repeated nudges do not drift
        self.ratio = (ratio * 10.0).round() / 10.0;
        self.ratio
    }

    pub fn nudge_depth(&mut self, steps: f32) -> f32 {
        let depth = &mut self.depths[self.selected.index()];
        *depth = ((*depth + steps * DEPTH_STEP).clamp(0.0, 1.0) * 10.0).round() / 10.0;
        *depth
    }

    pub fn scale_lfo_frequency(&mut self, up: bool) -> f32 {
        let factor = if up {
            LFO_FREQUENCY_STEP
        } else {
            1.0 / LFO_FREQUENCY_STEP
        };
        self.lfo_frequency = (self.lfo_frequency * factor).clamp(0.05, 10.0);
        self.lfo_frequency
    }

    pub fn next_waveform(&mut self) -> LfoWaveform {
        let all = LfoWaveform::ALL;
        let idx = all.iter().position(|&w| w == self.waveform).unwrap_or(0);
        self.waveform = all[(idx + 1) % all.len()];
        self.waveform
    }

    pub fn nudge_sync(&mut self, steps: i32) -> f32 {
        self.sync_exponent =
            (self.sync_exponent + steps).clamp(-MAX_SYNC_EXPONENT, MAX_SYNC_EXPONENT);
        self.sync_factor()
    }

    pub fn sync_factor(&self) -> f32 {
        2f32.powi(self.sync_exponent)
    }

    pub fn nudge_bpm(&mut self, steps: f64) -> f64 {
        self.bpm = (self.bpm + steps * BPM_STEP).clamp(20.0, 300.0);
        self.bpm
    }

    pub fn select_next(&mut self) {
        let all = StutterParam::ALL;
        self.selected = all[(self.selected.index() + 1) % all.len()];
    }
}
