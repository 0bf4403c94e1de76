//! TUI for the glitch binary
//!
//! Keys edit a local copy of the parameters and send each change through
//! the GlitchHandle; the panel reads playback state from the monitor.

mod panel;
pub mod state;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use glitch_dsp::{GlitchHandle, ParamError};

pub use state::UiInit;

use panel::render_panel;
use state::ControlState;
use waveform::render_waveform;

/// Samples shown by the oscilloscope
const VIS_BUFFER_SIZE: usize = 1024;

pub struct UiApp {
    handle: GlitchHandle,
    /// Output samples from the audio callback
    audio_rx: Consumer<f32>,
    state: ControlState,
    audio_buffer: Vec<f32>,
    sample_rate: f32,
    channels: usize,
    last_error: Option<ParamError>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(handle: GlitchHandle, audio_rx: Consumer<f32>, init: UiInit) -> Self {
        Self {
            handle,
            audio_rx,
            state: ControlState::new(&init),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            sample_rate: init.sample_rate,
            channels: init.channels,
            last_error: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the newest VIS_BUFFER_SIZE output samples
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let state = &mut self.state;
        let handle = &mut self.handle;

        let sent = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char(' ') => {
                state.stutter_enabled = !state.stutter_enabled;
                handle.set_stutter_enabled(state.stutter_enabled)
            }
            KeyCode::Char('c') => handle.recapture(),
            KeyCode::Char('p') => {
                state.transport_playing = !state.transport_playing;
                handle.set_transport_playing(state.transport_playing)
            }
            KeyCode::Up => handle.set_duration_ms(state.nudge_duration(1.0)),
            KeyCode::Down => handle.set_duration_ms(state.nudge_duration(-1.0)),
            KeyCode::Char('+') | KeyCode::Char('=') => handle.set_repeats(state.nudge_repeats(1)),
            KeyCode::Char('-') => handle.set_repeats(state.nudge_repeats(-1)),
            KeyCode::Right => handle.set_ratio(state.nudge_ratio(1.0)),
            KeyCode::Left => handle.set_ratio(state.nudge_ratio(-1.0)),
            KeyCode::Char('l') => {
                state.lfo_enabled = !state.lfo_enabled;
                handle.set_lfo_enabled(state.lfo_enabled)
            }
            KeyCode::Char('w') => handle.set_lfo_waveform(state.next_waveform()),
            KeyCode::Char(']') => handle.set_lfo_frequency(state.scale_lfo_frequency(true)),
            KeyCode::Char('[') => handle.set_lfo_frequency(state.scale_lfo_frequency(false)),
            KeyCode::Char('s') => {
                state.tempo_sync = !state.tempo_sync;
                handle.set_tempo_sync(state.tempo_sync)
            }
            KeyCode::Char('>') => handle.set_sync_factor(state.nudge_sync(1)),
            KeyCode::Char('<') => handle.set_sync_factor(state.nudge_sync(-1)),
            KeyCode::Char('b') => handle.set_host_tempo(Some(state.nudge_bpm(-1.0))),
            KeyCode::Char('B') => handle.set_host_tempo(Some(state.nudge_bpm(1.0))),
            KeyCode::Tab => {
                state.select_next();
                Ok(())
            }
            KeyCode::Char('.') => {
                let depth = state.nudge_depth(1.0);
                handle.set_modulation_depth(state.selected, depth)
            }
            KeyCode::Char(',') => {
                let depth = state.nudge_depth(-1.0);
                handle.set_modulation_depth(state.selected, depth)
            }
            _ => Ok(()),
        };

        self.last_error = sent.err();
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Status line
                Constraint::Length(9),  // Parameters
                Constraint::Min(6),     // Oscilloscope
                Constraint::Length(2),  // Help
            ])
            .split(area);

        let monitor = self.handle.monitor();

        let status = match &self.last_error {
            Some(err) => Paragraph::new(format!(" {}", err)).style(Style::default().fg(Color::Red)),
            None => Paragraph::new(format!(
                " glitch  {:.1}kHz  {} ch  transport {}",
                self.sample_rate / 1000.0,
                self.channels,
                if self.state.transport_playing { "playing" } else { "stopped" }
            ))
            .style(Style::default().fg(Color::Cyan)),
        };
        frame.render_widget(status, chunks[0]);

        render_panel(frame, chunks[1], &self.state, monitor);
        render_waveform(frame, chunks[2], &self.audio_buffer, monitor.is_stutter_active());

        let help = Paragraph::new(
            " [Space] Stutter  [C] Recapture  [Up/Down] Duration  [-/+] Repeats  [Left/Right] Ratio  [P] Transport\n \
             [L] LFO  [W] Shape  [[/]] Rate  [S] Sync  [</>] Sync factor  [b/B] BPM  [Tab] Target  [,/.] Depth  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
