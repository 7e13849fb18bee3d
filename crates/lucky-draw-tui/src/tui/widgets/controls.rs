// Controls panel: count editors, the last refusal, and available actions.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use lucky_draw_core::session::{Phase, MAX_PARTICIPANTS, MAX_WINNERS};

use crate::tui::{CountField, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let editable = state.phase == Phase::Idle;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editable {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Draw ");

    let lines = vec![
        count_line(state, CountField::Participants, MAX_PARTICIPANTS, editable),
        count_line(state, CountField::Winners, MAX_WINNERS, editable),
        message_line(state),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn count_line(
    state: &ViewState,
    field: CountField,
    max: usize,
    editable: bool,
) -> Line<'static> {
    let (label, value) = match field {
        CountField::Participants => ("Participants", state.participant_count),
        CountField::Winners => ("Winners     ", state.winner_count),
    };

    let value_span = match &state.count_entry {
        Some(entry) if entry.field == field => Span::styled(
            format!("[{}_]", entry.text),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        _ => Span::styled(
            format!("{value:>4}"),
            Style::default()
                .fg(if editable { Color::White } else { Color::Gray })
                .add_modifier(Modifier::BOLD),
        ),
    };

    Line::from(vec![
        Span::styled(format!(" {label}  "), Style::default().fg(Color::Gray)),
        value_span,
        Span::styled(format!("  (1-{max})"), Style::default().fg(Color::DarkGray)),
    ])
}

fn message_line(state: &ViewState) -> Line<'static> {
    if let Some(reason) = &state.last_rejection {
        return Line::from(Span::styled(
            format!(" {reason}"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(Span::styled(
        format!(" {}", status_message(state)),
        Style::default().fg(Color::Gray),
    ))
}

/// Short description of what can happen next.
pub fn status_message(state: &ViewState) -> String {
    match state.phase {
        Phase::Idle => "Press Enter to start the draw".to_string(),
        Phase::Spinning => "Drawing...".to_string(),
        Phase::Revealing => "Revealing winners...".to_string(),
        Phase::Complete => {
            let remaining = state.participants.len().saturating_sub(state.winners.len());
            if remaining == 0 {
                "Everyone has won".to_string()
            } else {
                format!("{remaining} participants can still win")
            }
        }
    }
}
