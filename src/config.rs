//! Processor configuration and the error types raised outside the render path.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{dsp::lfo::LfoWaveform, dsp::modulate::StutterParam, MAX_CHANNELS, MIN_DURATION_MS};

/// Rejected (re)configuration. Raised before any buffer is sized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid channel count: {0} (must be 1..={max})", max = MAX_CHANNELS)]
    InvalidChannelCount(usize),

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    #[error("max duration of {max} samples is below the {min} sample minimum")]
    MaxDurationTooShort { max: usize, min: usize },

    #[error("invalid initial {param:?}: {value}")]
    InvalidInitialValue { param: StutterParam, value: f32 },
}

/// Rejected parameter change. The render path never sees an invalid value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("a playback ratio of exactly 0 has no defined rate")]
    ZeroRatio,

    #[error("control queue is full, message dropped")]
    QueueFull,
}

/// Everything needed to build a processor.
///
/// Defaults mirror a typical stereo session: one second of maximum stutter,
/// half a second active, three repeats at normal speed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GlitchConfig {
    pub channels: usize,
    pub sample_rate: f32,
    /// Upper bound for the stutter duration; sizes the snapshot and ring buffers.
    pub max_duration_ms: f32,
    pub duration_ms: f32,
    pub repeats: u32,
    pub ratio: f32,
    pub lfo_frequency: f32,
    pub lfo_waveform: LfoWaveform,
    /// Cycles per beat when the LFO follows host tempo.
    pub sync_factor: f32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44_100.0,
            max_duration_ms: 1000.0,
            duration_ms: 500.0,
            repeats: 3,
            ratio: 1.0,
            lfo_frequency: 0.5,
            lfo_waveform: LfoWaveform::Sine,
            sync_factor: 0.5,
        }
    }
}

impl GlitchConfig {
    pub fn max_duration_samples(&self) -> usize {
        ms_to_samples(self.max_duration_ms, self.sample_rate)
    }

    pub fn duration_samples(&self) -> usize {
        ms_to_samples(self.duration_ms, self.sample_rate)
    }

    /// Check the layout and the initial parameter values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_layout(self.channels, self.sample_rate)?;

        let min = min_duration_samples(self.sample_rate);
        let max = self.max_duration_samples();
        if max < min {
            return Err(ConfigError::MaxDurationTooShort { max, min });
        }

        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return Err(ConfigError::InvalidInitialValue {
                param: StutterParam::Duration,
                value: self.duration_ms,
            });
        }
        if self.repeats == 0 {
            return Err(ConfigError::InvalidInitialValue {
                param: StutterParam::Repeats,
                value: 0.0,
            });
        }
        if !self.ratio.is_finite() || self.ratio == 0.0 {
            return Err(ConfigError::InvalidInitialValue {
                param: StutterParam::Ratio,
                value: self.ratio,
            });
        }

        Ok(())
    }
}

/// Channel count and sample rate checks shared by every `configure`.
pub(crate) fn validate_layout(channels: usize, sample_rate: f32) -> Result<(), ConfigError> {
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(ConfigError::InvalidChannelCount(channels));
    }
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

/// Convert milliseconds to whole samples (truncating).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    (ms * sample_rate / 1000.0).max(0.0) as usize
}

/// The duration floor: `MIN_DURATION_MS` in samples, never below two samples.
#[inline]
pub fn min_duration_samples(sample_rate: f32) -> usize {
    ms_to_samples(MIN_DURATION_MS, sample_rate).max(2)
}
