//! Parameter panel and LFO meter

use std::borrow::Cow;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use glitch_dsp::{ProcessorMonitor, StutterParam};

use super::state::ControlState;

fn on_off(on: bool) -> Span<'static> {
    if on {
        Span::styled("on ", Style::default().fg(Color::Green))
    } else {
        Span::styled("off", Style::default().fg(Color::DarkGray))
    }
}

fn label<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

/// Stutter parameters, left; LFO settings and meter, right
pub fn render_panel(frame: &mut Frame, area: Rect, state: &ControlState, monitor: &ProcessorMonitor) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_stutter(frame, columns[0], state, monitor);
    render_lfo(frame, columns[1], state, monitor);
}

fn render_stutter(frame: &mut Frame, area: Rect, state: &ControlState, monitor: &ProcessorMonitor) {
    let block = Block::default().title(" Stutter ").borders(Borders::ALL);

    let direction = if state.ratio < 0.0 { "reverse" } else { "forward" };
    let lines = vec![
        Line::from(vec![label(" stutter   "), on_off(state.stutter_enabled)]),
        Line::from(vec![
            label(" duration  "),
            Span::raw(format!("{:>6.0} ms", state.duration_ms)),
            label(format!("  (playing {:.0} ms)", monitor.duration_ms())),
        ]),
        Line::from(vec![
            label(" repeats   "),
            Span::raw(format!("{:>6}", state.repeats)),
            label(format!("  (#{})", monitor.repeat_counter() + 1)),
        ]),
        Line::from(vec![
            label(" ratio     "),
            Span::raw(format!("{:>6.1}", state.ratio)),
            label(format!("  {} (playing {:.2})", direction, monitor.ratio())),
        ]),
        Line::from(vec![
            label(" captures  "),
            Span::raw(format!("{:>6}", monitor.capture_count())),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_lfo(frame: &mut Frame, area: Rect, state: &ControlState, monitor: &ProcessorMonitor) {
    let block = Block::default().title(" LFO ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(inner);

    let rate = if state.tempo_sync {
        format!("{}x/beat @ {:.0} BPM", state.sync_factor(), state.bpm)
    } else {
        format!("{:.2} Hz", state.lfo_frequency)
    };

    let mut lines = vec![
        Line::from(vec![
            label(" lfo    "),
            on_off(state.lfo_enabled),
            label("  shape "),
            Span::raw(state.waveform.name()),
        ]),
        Line::from(vec![
            label(" rate   "),
            Span::raw(rate),
            label(if state.tempo_sync { "  (sync)" } else { "" }),
        ]),
    ];

    for param in StutterParam::ALL {
        let selected = param == state.selected;
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(if selected { " >" } else { "  " }, style),
            Span::styled(format!(" {:<9}", param.name()), style),
            Span::styled(format!("{:.1}", state.depths[param.index()]), style),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), rows[0]);

    let value = monitor.oscillator_value().clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(if monitor.is_lfo_enabled() {
            Color::Magenta
        } else {
            Color::DarkGray
        }))
        .ratio(value as f64)
        .label(format!("{:.2}", value));
    frame.render_widget(gauge, rows[1]);
}
