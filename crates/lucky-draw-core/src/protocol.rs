// Messages exchanged between the draw event loop and the presentation layer.

use crate::participant::Participant;
use crate::session::Phase;

/// Commands sent from the presentation layer to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Change pool size and winner count (idle only, values are clamped).
    Configure {
        participant_count: i64,
        winner_count: i64,
    },
    StartDraw,
    Redraw,
    /// Back to idle with a new pool.
    Reset,
    /// Back to idle keeping the pool.
    Close,
    RequestAddWinner,
    ConfirmAddWinner(usize),
    CancelAddWinner,
    DismissAdditional,
    Quit,
}

/// Observable session state, sent after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSnapshot {
    pub phase: Phase,
    pub participant_count: usize,
    pub winner_count: usize,
    pub participants: Vec<Participant>,
    pub winners: Vec<Participant>,
    pub generation: u64,
}

/// Updates pushed from the event loop to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Full state after a transition.
    Snapshot(Box<DrawSnapshot>),
    /// The add-winner prompt is open; counts in `1..=max_count` are valid.
    AddWinnerPrompt { max_count: usize },
    /// The batch drawn by the latest add-winner round.
    AdditionalWinners(Vec<Participant>),
    /// A command was refused; the state is unchanged.
    Rejected(String),
}
