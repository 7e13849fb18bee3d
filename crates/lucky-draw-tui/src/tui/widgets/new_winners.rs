// Popup listing the batch drawn by the latest add-winner round.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use lucky_draw_core::participant::Participant;

use super::centered_rect;

const DIALOG_WIDTH: u16 = 40;
/// Border plus the footer hint.
const CHROME_HEIGHT: u16 = 4;

pub fn render(frame: &mut Frame, area: Rect, batch: &[Participant]) {
    let height = (batch.len() as u16).saturating_add(CHROME_HEIGHT);
    let dialog = centered_rect(DIALOG_WIDTH, height, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " New winners ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let mut lines: Vec<Line> = batch
        .iter()
        .map(|w| {
            Line::from(vec![
                Span::styled(
                    w.name.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" #{}", w.id), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Enter to close",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}
