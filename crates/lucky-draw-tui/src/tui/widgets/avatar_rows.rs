// Scrolling avatar rows.
//
// The pool is split into `display.rows` rows; even rows scroll left, odd
// rows right. Each row is repeated to fill the panel width. The repetition
// exists only on screen and never feeds back into the pool.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use lucky_draw_core::participant::{initials, Participant};

use crate::tui::ViewState;

/// Terminal columns per avatar cell, including the gap.
pub const CELL_WIDTH: u16 = 5;

const CELL_COLORS: &[Color] = &[
    Color::Rgb(0xff, 0x6b, 0x6b),
    Color::Rgb(0x4e, 0xcd, 0xc4),
    Color::Rgb(0x45, 0xb7, 0xd1),
    Color::Rgb(0xf9, 0xa8, 0x25),
    Color::Rgb(0x96, 0xce, 0xb4),
    Color::Rgb(0xdd, 0xa0, 0xdd),
    Color::Rgb(0x98, 0xd8, 0xc8),
    Color::Rgb(0xf7, 0xdc, 0x6f),
    Color::Rgb(0xbb, 0x8f, 0xce),
    Color::Rgb(0x85, 0xc1, 0xe9),
];

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Participants ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.participants.is_empty() || inner.height == 0 {
        return;
    }

    let cells = usize::from(inner.width / CELL_WIDTH);
    let rows = split_rows(&state.participants, state.display.rows);
    let spacing = row_spacing(inner.height, rows.len());

    let mut lines = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let offset = state.row_offsets.get(index).copied().unwrap_or(0);
        let leftward = index % 2 == 0;
        let spans: Vec<Span> = visible_cells(row, offset, cells, leftward)
            .into_iter()
            .map(avatar_cell)
            .collect();
        lines.push(Line::from(spans));
        for _ in 0..spacing {
            lines.push(Line::default());
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Split the pool into at most `rows` rows of `ceil(n / rows)` participants.
pub fn split_rows(participants: &[Participant], rows: usize) -> Vec<&[Participant]> {
    if participants.is_empty() {
        return Vec::new();
    }
    let per_row = participants.len().div_ceil(rows.max(1));
    participants.chunks(per_row).collect()
}

/// The `cells` participants visible in a row scrolled by `offset` cells.
///
/// The row repeats to fill the width. Leftward rows advance through the row
/// as the offset grows; rightward rows walk backwards.
pub fn visible_cells(
    row: &[Participant],
    offset: usize,
    cells: usize,
    leftward: bool,
) -> Vec<&Participant> {
    if row.is_empty() {
        return Vec::new();
    }
    let len = row.len();
    let shift = offset % len;
    (0..cells)
        .map(|i| {
            let index = if leftward {
                (i + shift) % len
            } else {
                (i + len - shift) % len
            };
            &row[index]
        })
        .collect()
}

/// Blank lines between rows so they spread over the panel height.
fn row_spacing(height: u16, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    let spare = usize::from(height).saturating_sub(rows);
    (spare / rows).min(2)
}

fn avatar_cell(participant: &Participant) -> Span<'static> {
    let color = CELL_COLORS[participant.id as usize % CELL_COLORS.len()];
    Span::styled(
        format!("{:^4} ", initials(&participant.name)),
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    )
}
