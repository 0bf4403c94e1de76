use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::dsp::stutter::StutterBuffer;

/// Values the render thread publishes once per block for the control side.
///
/// Written with `Release`, read with `Acquire`. Readers see a consistent value
/// per field, not a consistent set across fields.
#[derive(Debug)]
pub struct ProcessorMonitor {
    oscillator_value: AtomicF32,
    lfo_enabled: AtomicBool,
    stutter_active: AtomicBool,
    repeat_counter: AtomicU32,
    capture_count: AtomicU64,
    wrap_count: AtomicU64,
    duration_ms: AtomicF32,
    ratio: AtomicF32,
    max_duration_ms: AtomicF32,
}

impl ProcessorMonitor {
    pub fn new(max_duration_ms: f32) -> Self {
        Self {
            oscillator_value: AtomicF32::new(0.0),
            lfo_enabled: AtomicBool::new(false),
            stutter_active: AtomicBool::new(false),
            repeat_counter: AtomicU32::new(0),
            capture_count: AtomicU64::new(0),
            wrap_count: AtomicU64::new(0),
            duration_ms: AtomicF32::new(0.0),
            ratio: AtomicF32::new(1.0),
            max_duration_ms: AtomicF32::new(max_duration_ms),
        }
    }

    pub(crate) fn publish(&self, oscillator_value: f32, lfo_enabled: bool, stutter: &StutterBuffer) {
        let ms = stutter.duration_samples() as f32 * 1000.0 / stutter.sample_rate();

        self.oscillator_value
            .store(oscillator_value, Ordering::Release);
        self.lfo_enabled.store(lfo_enabled, Ordering::Release);
        self.stutter_active
            .store(stutter.is_enabled(), Ordering::Release);
        self.repeat_counter
            .store(stutter.repeat_counter(), Ordering::Release);
        self.capture_count
            .store(stutter.capture_count(), Ordering::Release);
        self.wrap_count.store(stutter.wrap_count(), Ordering::Release);
        self.duration_ms.store(ms, Ordering::Release);
        self.ratio.store(stutter.ratio(), Ordering::Release);
    }

    pub(crate) fn set_max_duration_ms(&self, ms: f32) {
        self.max_duration_ms.store(ms, Ordering::Release);
    }

    /// Latest LFO output in [0, 1].
    #[inline]
    pub fn oscillator_value(&self) -> f32 {
        self.oscillator_value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_lfo_enabled(&self) -> bool {
        self.lfo_enabled.load(Ordering::Acquire)
    }

    /// True while the stutter replaces the input (enabled and transport playing).
    #[inline]
    pub fn is_stutter_active(&self) -> bool {
        self.stutter_active.load(Ordering::Acquire)
    }

    #[inline]
    pub fn repeat_counter(&self) -> u32 {
        self.repeat_counter.load(Ordering::Acquire)
    }

    #[inline]
    pub fn capture_count(&self) -> u64 {
        self.capture_count.load(Ordering::Acquire)
    }

    #[inline]
    pub fn wrap_count(&self) -> u64 {
        self.wrap_count.load(Ordering::Acquire)
    }

    /// Loop length currently played, modulation included.
    #[inline]
    pub fn duration_ms(&self) -> f32 {
        self.duration_ms.load(Ordering::Acquire)
    }

    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio.load(Ordering::Acquire)
    }

    /// Longest duration the processor is configured for.
    #[inline]
    pub fn max_duration_ms(&self) -> f32 {
        self.max_duration_ms.load(Ordering::Acquire)
    }
}
