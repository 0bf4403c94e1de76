//! Block-rate low frequency oscillator driving the stutter modulation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/*
Block-Rate LFO
==============

The LFO here is not an audio source. It produces ONE control value per
audio block, which the modulation router turns into new targets for the
stutter duration, repeat count and ratio. The stutter engine then ramps
toward those targets sample by sample, so the block-rate stepping never
reaches the output as a zipper.

Vocabulary
----------

  block rate    The LFO advances once per host callback. Its phase moves by
                one block's worth of time:

                    increment = 2π · frequency / (sample_rate / block_size)

                sample_rate / block_size is the number of blocks per second,
                so the increment is "radians per block".

  unipolar      Output lives in [0.0, 1.0]. Every waveform here is
                unipolar, because the router scales the stutter parameters
                by the value directly (0 = minimum, 1 = full original).

  tempo sync    The frequency follows the host tempo instead of the knob:

                    frequency = bpm / 60 · sync_factor

                sync_factor is cycles per beat. 0.5 at 120 BPM → 1 Hz, one
                cycle every two beats.


Waveforms
---------

  SINE      (sin(phase) + 1) / 2. Smooth push and pull on the stutter.

  SQUARE    0 for the first half cycle, 1 for the second. Flips the
            stutter between its minimum and its original settings.

  TRIANGLE  Linear up then down. Constant rate of change.

  SAW       Linear rise, snap back. One-directional sweeps.


Phase Convention
----------------

The value is computed from the phase at the START of the block, then the
phase advances. The first block after a reset therefore reports the value
at phase 0 (0.5 for the sine, 0.0 for the square). Phase wraps into
[0, 2π) by subtraction so no cycle is skipped at slow block rates.

Missing Tempo
-------------

A host that cannot report tempo hands us 0 BPM. A synced LFO with no tempo
keeps running at its free frequency instead of freezing.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoWaveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Saw,
}

impl LfoWaveform {
    pub const ALL: [LfoWaveform; 4] = [
        LfoWaveform::Sine,
        LfoWaveform::Square,
        LfoWaveform::Triangle,
        LfoWaveform::Saw,
    ];

    /// Unipolar value at `phase` (radians, expected in [0, 2π)).
    #[inline]
    pub fn value_at(self, phase: f64) -> f32 {
        match self {
            LfoWaveform::Sine => bipolar_to_unipolar(phase.sin() as f32),
            LfoWaveform::Square => {
                if phase < PI {
                    0.0
                } else {
                    1.0
                }
            }
            LfoWaveform::Triangle => {
                let t = (phase / TAU) as f32;
                if t < 0.5 {
                    t * 2.0
                } else {
                    2.0 - t * 2.0
                }
            }
            LfoWaveform::Saw => (phase / TAU) as f32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LfoWaveform::Sine => "sine",
            LfoWaveform::Square => "square",
            LfoWaveform::Triangle => "triangle",
            LfoWaveform::Saw => "saw",
        }
    }
}

pub struct Lfo {
    waveform: LfoWaveform,
    phase: f64,      // radians, [0, 2π)
    frequency: f64,  // free-running Hz
    sample_rate: f64,
    sync_enabled: bool,
    sync_factor: f64, // cycles per beat
    bpm: f64,         // 0 when the host reports no tempo
    enabled: bool,
    value: f32,
}

impl Lfo {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            waveform: LfoWaveform::Sine,
            phase: 0.0,
            frequency: 1.0,
            sample_rate: sample_rate as f64,
            sync_enabled: false,
            sync_factor: 0.5,
            bpm: 0.0,
            enabled: false,
            value: 0.0,
        }
    }

    pub fn with_waveform(mut self, waveform: LfoWaveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency as f64;
        self
    }

    /// Advance by one block of `block_size` samples and refresh the output value.
    pub fn advance(&mut self, block_size: usize) {
        self.value = self.waveform.value_at(self.phase);

        if block_size == 0 || self.sample_rate <= 0.0 {
            return;
        }

        let blocks_per_second = self.sample_rate / block_size as f64;
        self.phase += TAU * self.effective_frequency() / blocks_per_second;

        if self.phase >= TAU {
            self.phase -= TAU;
        }
        // Frequencies above the block rate can overshoot a whole cycle
        if !(0.0..TAU).contains(&self.phase) {
            self.phase = self.phase.rem_euclid(TAU);
        }
    }

    /// Frequency actually used by `advance`: tempo-derived when synced and a tempo is known.
    #[inline]
    pub fn effective_frequency(&self) -> f64 {
        if self.sync_enabled && self.bpm > 0.0 {
            self.bpm / 60.0 * self.sync_factor
        } else {
            self.frequency
        }
    }

    /// Last computed value in [0.0, 1.0].
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency as f64;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate as f64;
    }

    pub fn set_sync_enabled(&mut self, enabled: bool) {
        self.sync_enabled = enabled;
    }

    pub fn is_synced(&self) -> bool {
        self.sync_enabled
    }

    pub fn set_sync_factor(&mut self, factor: f32) {
        self.sync_factor = factor as f64;
    }

    /// Host tempo in BPM; 0 means "unknown".
    pub fn set_tempo(&mut self, bpm: f64) {
        self.bpm = bpm.max(0.0);
    }

    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase.rem_euclid(TAU);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Back to phase 0 with a cleared output.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.value = 0.0;
    }
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Convert unipolar signal (0.0 to 1.0) to bipolar (-1.0 to +1.0).
///
/// The ratio modulation swings around its original value, so it wants the
/// bipolar form.
#[inline]
pub fn unipolar_to_bipolar(unipolar: f32) -> f32 {
    (unipolar * 2.0) - 1.0
}

/// Number of blocks one LFO cycle takes.
///
/// # Example
/// ```
/// use glitch_dsp::dsp::lfo::blocks_per_period;
/// let blocks = blocks_per_period(1.0, 44_100.0, 512);
/// assert!((blocks - 86.13).abs() < 0.01);
/// ```
#[inline]
pub fn blocks_per_period(frequency_hz: f32, sample_rate: f32, block_size: usize) -> f32 {
    sample_rate / block_size as f32 / frequency_hz
}
