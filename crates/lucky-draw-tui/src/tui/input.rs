// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into DrawCommand messages sent to the
// event loop, or into local ViewState mutations (prompt stepping, typed
// counts, quit confirmation).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use lucky_draw_core::protocol::DrawCommand;
use lucky_draw_core::session::{parse_count, Phase};

use super::{CountEntry, CountField, ViewState};

/// Participant count step for PageUp/PageDown.
const PAGE_STEP: i64 = 10;

/// Longest typed count accepted into an entry field.
const MAX_ENTRY_LEN: usize = 6;

/// Handle a keyboard event.
///
/// Returns `Some(DrawCommand)` when the key press should be forwarded to the
/// event loop. Returns `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<DrawCommand> {
    // Windows reports both Press and Release for each keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(DrawCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.count_entry.is_some() {
        return handle_count_entry(key_event, view_state);
    }

    if view_state.prompt.is_some() {
        return handle_prompt(key_event, view_state);
    }

    if !view_state.new_winners.is_empty() {
        return handle_new_winners(key_event, view_state);
    }

    if key_event.code == KeyCode::Char('q') {
        view_state.confirm_quit = true;
        return None;
    }

    match view_state.phase {
        Phase::Idle => handle_idle(key_event, view_state),
        Phase::Complete => handle_complete(key_event),
        Phase::Spinning | Phase::Revealing => None,
    }
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit
/// - `n` or `Esc` cancels
/// - everything else is swallowed
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<DrawCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('q') => Some(DrawCommand::Quit),
        KeyCode::Char('n') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn handle_idle(key_event: KeyEvent, view_state: &mut ViewState) -> Option<DrawCommand> {
    match key_event.code {
        KeyCode::Up => Some(configure_delta(view_state, 1, 0)),
        KeyCode::Down => Some(configure_delta(view_state, -1, 0)),
        KeyCode::PageUp => Some(configure_delta(view_state, PAGE_STEP, 0)),
        KeyCode::PageDown => Some(configure_delta(view_state, -PAGE_STEP, 0)),
        KeyCode::Right => Some(configure_delta(view_state, 0, 1)),
        KeyCode::Left => Some(configure_delta(view_state, 0, -1)),
        KeyCode::Char('p') => {
            open_count_entry(view_state, CountField::Participants);
            None
        }
        KeyCode::Char('w') => {
            open_count_entry(view_state, CountField::Winners);
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => Some(DrawCommand::StartDraw),
        KeyCode::Char('x') => Some(DrawCommand::Reset),
        _ => None,
    }
}

fn handle_complete(key_event: KeyEvent) -> Option<DrawCommand> {
    match key_event.code {
        KeyCode::Char('r') => Some(DrawCommand::Redraw),
        KeyCode::Char('x') => Some(DrawCommand::Reset),
        KeyCode::Char('c') | KeyCode::Esc => Some(DrawCommand::Close),
        KeyCode::Char('a') => Some(DrawCommand::RequestAddWinner),
        _ => None,
    }
}

/// Add-winner count stepper. The prompt stays open until the event loop
/// answers with the new batch or a rejection.
fn handle_prompt(key_event: KeyEvent, view_state: &mut ViewState) -> Option<DrawCommand> {
    let prompt = view_state.prompt.as_mut()?;
    match key_event.code {
        KeyCode::Right | KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
            prompt.increment();
            None
        }
        KeyCode::Left | KeyCode::Down | KeyCode::Char('-') => {
            prompt.decrement();
            None
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            prompt.push_digit(c.to_digit(10).unwrap_or(0));
            None
        }
        KeyCode::Backspace => {
            prompt.pop_digit();
            None
        }
        KeyCode::Enter => Some(DrawCommand::ConfirmAddWinner(prompt.value())),
        KeyCode::Esc => {
            view_state.prompt = None;
            Some(DrawCommand::CancelAddWinner)
        }
        _ => None,
    }
}

fn handle_new_winners(key_event: KeyEvent, view_state: &mut ViewState) -> Option<DrawCommand> {
    match key_event.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_state.new_winners.clear();
            Some(DrawCommand::DismissAdditional)
        }
        _ => None,
    }
}

/// Typed count entry. `Enter` parses the text and applies it; a parse
/// failure keeps the entry open and shows the reason.
fn handle_count_entry(key_event: KeyEvent, view_state: &mut ViewState) -> Option<DrawCommand> {
    let entry = view_state.count_entry.as_mut()?;
    match key_event.code {
        KeyCode::Char(c) if !c.is_control() => {
            if entry.text.len() < MAX_ENTRY_LEN {
                entry.text.push(c);
            }
            None
        }
        KeyCode::Backspace => {
            entry.text.pop();
            None
        }
        KeyCode::Esc => {
            view_state.count_entry = None;
            None
        }
        KeyCode::Enter => match parse_count(entry.field.label(), &entry.text) {
            Ok(value) => {
                let field = entry.field;
                view_state.count_entry = None;
                view_state.last_rejection = None;
                Some(configure_with(view_state, field, value))
            }
            Err(e) => {
                view_state.last_rejection = Some(e.to_string());
                None
            }
        },
        _ => None,
    }
}

fn open_count_entry(view_state: &mut ViewState, field: CountField) {
    view_state.count_entry = Some(CountEntry {
        field,
        text: String::new(),
    });
}

fn configure_delta(view_state: &ViewState, participants: i64, winners: i64) -> DrawCommand {
    DrawCommand::Configure {
        participant_count: view_state.participant_count as i64 + participants,
        winner_count: view_state.winner_count as i64 + winners,
    }
}

fn configure_with(view_state: &ViewState, field: CountField, value: i64) -> DrawCommand {
    let (mut participant_count, mut winner_count) = (
        view_state.participant_count as i64,
        view_state.winner_count as i64,
    );
    match field {
        CountField::Participants => participant_count = value,
        CountField::Winners => winner_count = value,
    }
    DrawCommand::Configure {
        participant_count,
        winner_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
