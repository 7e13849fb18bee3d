// Help bar widget: key hints for the current mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use lucky_draw_core::session::Phase;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();
    for (key, action) in hints(state) {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!(" {action}  "),
            Style::default().fg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// (key, action) pairs for whichever mode currently owns the keyboard.
pub fn hints(state: &ViewState) -> &'static [(&'static str, &'static str)] {
    if state.confirm_quit {
        &[("y", "Quit"), ("n", "Stay")]
    } else if state.count_entry.is_some() {
        &[("Enter", "Apply"), ("Esc", "Cancel")]
    } else if state.prompt.is_some() {
        &[("←/→", "Count"), ("Enter", "Draw"), ("Esc", "Cancel")]
    } else if !state.new_winners.is_empty() {
        &[("Enter", "Close")]
    } else {
        match state.phase {
            Phase::Idle => &[
                ("↑/↓", "Participants"),
                ("←/→", "Winners"),
                ("p/w", "Type count"),
                ("Enter", "Start"),
                ("x", "New pool"),
                ("q", "Quit"),
            ],
            Phase::Spinning | Phase::Revealing => &[("q", "Quit")],
            Phase::Complete => &[
                ("r", "Redraw"),
                ("a", "Add winners"),
                ("c", "Close"),
                ("x", "Reset"),
                ("q", "Quit"),
            ],
        }
    }
}
