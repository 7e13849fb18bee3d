// Winner list shown over the avatar rows once a draw is complete.
//
// Only the first `display.max_revealed` winners are listed; the rest are
// summarized as "and K more". Winners from add-winner rounds are marked.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use lucky_draw_core::participant::Participant;

use super::plural;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            format!(" ★ {} ", plural(state.winners.len(), "winner")),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }

    let (shown, hidden) = revealed_split(&state.winners, state.display.max_revealed);
    let mut lines: Vec<Line> = shown
        .iter()
        .enumerate()
        .map(|(i, w)| winner_line(i + 1, w))
        .collect();
    if hidden > 0 {
        lines.push(Line::from(Span::styled(
            format!("  ... and {hidden} more"),
            Style::default().fg(Color::Gray),
        )));
    }

    // Fill columns top to bottom.
    let per_column = usize::from(inner.height);
    let columns = lines.len().div_ceil(per_column).max(1);
    let areas = Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns]).split(inner);

    let mut lines = lines.into_iter();
    for column in areas.iter() {
        let chunk: Vec<Line> = lines.by_ref().take(per_column).collect();
        frame.render_widget(Paragraph::new(chunk), *column);
    }
}

/// Split winners into the listed prefix and the count summarized.
pub fn revealed_split(winners: &[Participant], max_revealed: usize) -> (&[Participant], usize) {
    let shown = winners.len().min(max_revealed);
    (&winners[..shown], winners.len() - shown)
}

fn winner_line(rank: usize, winner: &Participant) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("{rank:>3}. "), Style::default().fg(Color::Gray)),
        Span::styled(
            winner.name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" #{}", winner.id), Style::default().fg(Color::DarkGray)),
    ];
    if winner.is_additional {
        spans.push(Span::styled(" +", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}
