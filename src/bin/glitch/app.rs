//! Audio setup: default input → stutter → default output

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use glitch_dsp::{processor, GlitchConfig};

use super::ui::{UiApp, UiInit};

/// Seconds of input the capture queue can hold before it starts dropping.
const INPUT_QUEUE_SECONDS: usize = 1;
/// Output samples (first channel) queued for the oscilloscope.
const VIS_QUEUE_SIZE: usize = 8192;

/// Application builder
pub struct GlitchApp {
    config: GlitchConfig,
    bpm: f64,
}

impl GlitchApp {
    pub fn new(config: GlitchConfig) -> Self {
        Self { config, bpm: 120.0 }
    }

    /// Tempo reported to the LFO when tempo sync is on
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Open the streams and run the terminal UI until quit
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let output = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let input = host
            .default_input_device()
            .ok_or_else(|| eyre!("no default input device available"))?;

        let output_config = output
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        let input_config = input
            .default_input_config()
            .wrap_err("failed to fetch default input config")?;

        let sample_rate = output_config.sample_rate().0 as f32;
        let channels = output_config.channels() as usize;
        let in_channels = (input_config.channels() as usize).max(1);

        if input_config.sample_rate() != output_config.sample_rate() {
            log::warn!(
                "input runs at {} Hz, output at {} Hz; no resampling is done",
                input_config.sample_rate().0,
                output_config.sample_rate().0
            );
        }

        let config = GlitchConfig {
            channels,
            sample_rate,
            ..self.config
        };
        let (mut glitch, mut handle) =
            processor::build(&config).wrap_err("failed to build the glitch processor")?;
        handle
            .set_host_tempo(Some(self.bpm))
            .wrap_err("failed to send host tempo")?;

        let queue_len = sample_rate as usize * INPUT_QUEUE_SECONDS * in_channels;
        let (mut input_tx, mut input_rx) = RingBuffer::<f32>::new(queue_len);
        let (mut vis_tx, vis_rx) = RingBuffer::<f32>::new(VIS_QUEUE_SIZE);

        let input_stream = input.build_input_stream(
            &input_config.into(),
            move |data: &[f32], _| {
                // Overflow drops the newest input rather than blocking
                for &sample in data {
                    let _ = input_tx.push(sample);
                }
            },
            |err| log::error!("input stream error: {}", err),
            None,
        )?;

        let mut frame_in = vec![0.0f32; in_channels];
        let output_stream = output.build_output_stream(
            &output_config.into(),
            move |data: &mut [f32], _| {
                // Map input channels onto output channels, silence on underrun
                for frame in data.chunks_exact_mut(channels) {
                    for slot in frame_in.iter_mut() {
                        *slot = input_rx.pop().unwrap_or(0.0);
                    }
                    for (ch, out) in frame.iter_mut().enumerate() {
                        *out = frame_in[ch % in_channels];
                    }
                }

                glitch.process(data);

                for frame in data.chunks_exact(channels) {
                    let _ = vis_tx.push(frame[0]);
                }
            },
            |err| log::error!("output stream error: {}", err),
            None,
        )?;

        input_stream.play()?;
        output_stream.play()?;

        let init = UiInit {
            sample_rate,
            channels,
            bpm: self.bpm,
            config,
        };

        let mut terminal = ratatui::init();
        let result = UiApp::new(handle, vis_rx, init).run(&mut terminal);
        ratatui::restore();
        result
    }
}
