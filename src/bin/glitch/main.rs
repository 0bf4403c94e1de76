//! glitch - Terminal stutter effect on the default audio input
//!
//! Run with: cargo run --bin glitch
//! Log with: RUST_LOG=glitch_dsp=debug cargo run --bin glitch 2> glitch.log

mod app;
mod ui;

use app::GlitchApp;
use glitch_dsp::{GlitchConfig, LfoWaveform};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    // Channels and sample rate are taken from the output device
    GlitchApp::new(GlitchConfig {
        duration_ms: 250.0,
        repeats: 4,
        lfo_waveform: LfoWaveform::Sine,
        ..Default::default()
    })
    .bpm(120.0)
    .run()
}
