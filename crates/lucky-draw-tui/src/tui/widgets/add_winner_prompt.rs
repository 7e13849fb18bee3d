// Add-winner count prompt: a stepper clamped to `1..=max_count`.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::tui::CountPrompt;

const DIALOG_WIDTH: u16 = 40;
const DIALOG_HEIGHT: u16 = 6;

pub fn render(frame: &mut Frame, area: Rect, prompt: &CountPrompt) {
    let dialog = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Add winners ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let arrow = |enabled: bool, glyph: &'static str| {
        Span::styled(
            glyph,
            Style::default().fg(if enabled { Color::White } else { Color::DarkGray }),
        )
    };

    let shown = if prompt.typing && prompt.count == 0 {
        "_".to_string()
    } else {
        prompt.count.to_string()
    };

    let lines = vec![
        Line::from("How many more winners?"),
        Line::from(vec![
            arrow(prompt.value() > 1, "◀ "),
            Span::styled(
                format!("{:^5}", shown),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            arrow(prompt.value() < prompt.max_count, " ▶"),
        ]),
        Line::default(),
        Line::from(Span::styled(
            format!("{} can still win", prompt.max_count),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}
