// Status bar widget: phase indicator, pool size, winner tally.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use lucky_draw_core::session::Phase;

use super::plural;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [phase dot + label] | [pool size] | [winners drawn/target]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, color) = phase_indicator(state.phase);
    let separator = Span::styled(" | ", Style::default().fg(Color::Gray));

    let spans = vec![
        Span::styled(format!(" {} ", dot), Style::default().fg(color)),
        Span::styled(
            phase_label(state.phase),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        separator.clone(),
        Span::styled(
            plural(state.participant_count, "participant"),
            Style::default().fg(Color::White),
        ),
        separator,
        Span::styled(
            format!("Winners {}/{}", state.winners.len(), state.winner_count),
            Style::default().fg(Color::White),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn phase_indicator(phase: Phase) -> (&'static str, Color) {
    match phase {
        Phase::Idle => ("●", Color::Gray),
        Phase::Spinning => ("●", Color::Yellow),
        Phase::Revealing => ("●", Color::Magenta),
        Phase::Complete => ("●", Color::Green),
    }
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Ready",
        Phase::Spinning => "Drawing",
        Phase::Revealing => "Revealing",
        Phase::Complete => "Complete",
    }
}
