//! Realtime primitives behind the stutter effect.
//!
//! Everything here is allocation-free once constructed and safe to run inside
//! an audio callback. Buffers are sized by `new`/`configure`, never by
//! `process`.

/// Block-rate LFO with free-running and tempo-synced modes.
pub mod lfo;
/// LFO depth routing onto the stutter parameters.
pub mod modulate;
/// Linear per-block parameter smoothing.
pub mod ramp;
/// Planar multichannel capture history.
pub mod ring;
/// Capture, freeze and looped playback.
pub mod stutter;

pub use stutter::StutterState;
