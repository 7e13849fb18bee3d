// "Drawing N winners..." overlay shown while spinning and revealing.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use lucky_draw_core::session::{Phase, SpinPhase};

use super::{centered_rect, plural};
use crate::tui::ViewState;

const POPUP_WIDTH: u16 = 36;
const POPUP_HEIGHT: u16 = 5;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let popup = centered_rect(POPUP_WIDTH, POPUP_HEIGHT, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let lines = vec![
        Line::from(Span::styled(
            headline(state),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            spin_meter(state.spin_phase(), state.phase),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, popup);
}

pub fn headline(state: &ViewState) -> String {
    match state.phase {
        Phase::Revealing => "And the winners are...".to_string(),
        _ => format!("Drawing {}...", plural(state.winner_count, "winner")),
    }
}

/// A small speed gauge for the current spin sub-phase.
fn spin_meter(spin: SpinPhase, phase: Phase) -> &'static str {
    if phase == Phase::Revealing {
        return "★ ★ ★";
    }
    match spin {
        SpinPhase::Accelerating => "▸▸",
        SpinPhase::Peak => "▸▸▸▸▸▸",
        SpinPhase::Decelerating => "▸▸▸",
        SpinPhase::Stopped => "",
    }
}
