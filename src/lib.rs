pub mod config;
pub mod dsp; // Ring capture, snapshot playback, ramps and the LFO
pub mod processor; // Render-thread owner and the lock-free control boundary

pub use config::{ConfigError, GlitchConfig, ParamError};
pub use dsp::lfo::{Lfo, LfoWaveform};
pub use dsp::modulate::{ModulationRouter, StutterParam};
pub use dsp::stutter::{StutterBuffer, StutterState};
pub use processor::{ControlMessage, GlitchProcessor, ProcessorMonitor};

#[cfg(feature = "rtrb")]
pub use processor::GlitchHandle;

/// Length of the linear fades baked into every snapshot, and of the loop-seam crossfade.
pub const FADE_SAMPLES: usize = 500;
/// Shortest stutter the engine will play, whatever modulation asks for.
pub const MIN_DURATION_MS: f32 = 10.0;
/// Ratio magnitude limit, in both directions.
pub const MAX_RATIO: f32 = 2.0;
/// Smallest ratio magnitude used for reading; keeps the read position finite.
pub const MIN_RATIO: f32 = 0.1;
/// The ring buffer holds this many maximum-length stutters of history.
pub const RING_HISTORY_FACTOR: usize = 4;
/// Most channels a processor can be configured for.
pub const MAX_CHANNELS: usize = 32;
