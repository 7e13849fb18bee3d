// TUI: view state, layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the latest `DrawSnapshot` plus
// purely local state (row scroll offsets, prompt count, popups). The draw
// event loop pushes `UiUpdate` messages over an mpsc channel; the TUI applies
// them and re-renders at the configured frame rate.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info};

use lucky_draw_core::config::DisplayConfig;
use lucky_draw_core::participant::Participant;
use lucky_draw_core::protocol::{DrawCommand, DrawSnapshot, UiUpdate};
use lucky_draw_core::session::{Phase, SpinPhase};

use layout::build_layout;

/// Idle rows drift one cell every this many ticks.
const IDLE_DRIFT_TICKS: u64 = 8;

// ---------------------------------------------------------------------------
// CountPrompt
// ---------------------------------------------------------------------------

/// Local state of the add-winner count stepper.
///
/// `count` holds whatever was stepped to or typed; 0 means the field was
/// cleared. It is only clamped into `1..=max_count` by `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountPrompt {
    pub count: usize,
    pub max_count: usize,
    /// Set once a digit or Backspace has been typed; the first digit
    /// replaces a stepped value instead of extending it.
    pub typing: bool,
}

impl CountPrompt {
    pub fn new(max_count: usize) -> Self {
        CountPrompt {
            count: 1,
            max_count,
            typing: false,
        }
    }

    /// The count to submit.
    pub fn value(&self) -> usize {
        self.count.clamp(1, self.max_count.max(1))
    }

    pub fn increment(&mut self) {
        self.count = (self.value() + 1).min(self.max_count.max(1));
        self.typing = false;
    }

    pub fn decrement(&mut self) {
        self.count = self.value().saturating_sub(1).max(1);
        self.typing = false;
    }

    pub fn push_digit(&mut self, digit: u32) {
        let base = if self.typing { self.count } else { 0 };
        self.count = base.saturating_mul(10).saturating_add(digit as usize);
        self.typing = true;
    }

    pub fn pop_digit(&mut self) {
        self.count = if self.typing { self.count / 10 } else { 0 };
        self.typing = true;
    }
}

// ---------------------------------------------------------------------------
// CountEntry
// ---------------------------------------------------------------------------

/// Which idle count a typed entry edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountField {
    Participants,
    Winners,
}

impl CountField {
    pub fn label(self) -> &'static str {
        match self {
            CountField::Participants => "participant_count",
            CountField::Winners => "winner_count",
        }
    }
}

/// Text typed into one of the idle count fields, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub field: CountField,
    pub text: String,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the draw session for rendering.
pub struct ViewState {
    pub phase: Phase,
    pub participant_count: usize,
    pub winner_count: usize,
    pub participants: Vec<Participant>,
    pub winners: Vec<Participant>,
    /// When the current spin began (local clock), for sub-phase choreography.
    pub spin_started: Option<Instant>,
    /// Scroll offset of each avatar row, in cells.
    pub row_offsets: Vec<usize>,
    /// Render tick counter.
    pub tick: u64,
    /// Open add-winner count prompt.
    pub prompt: Option<CountPrompt>,
    /// Typed idle count, while editing.
    pub count_entry: Option<CountEntry>,
    /// Latest add-winner batch, shown until dismissed.
    pub new_winners: Vec<Participant>,
    /// Reason the last command was refused, cleared by the next snapshot.
    pub last_rejection: Option<String>,
    /// Whether the quit confirmation dialog is showing.
    pub confirm_quit: bool,
    pub display: DisplayConfig,
}

impl ViewState {
    pub fn new(display: DisplayConfig) -> Self {
        ViewState {
            phase: Phase::Idle,
            participant_count: 0,
            winner_count: 0,
            participants: Vec::new(),
            winners: Vec::new(),
            spin_started: None,
            row_offsets: vec![0; display.rows],
            tick: 0,
            prompt: None,
            count_entry: None,
            new_winners: Vec::new(),
            last_rejection: None,
            confirm_quit: false,
            display,
        }
    }

    /// Replace mirrored session state with a fresh snapshot.
    pub fn apply_snapshot(&mut self, snapshot: DrawSnapshot) {
        if snapshot.phase == Phase::Spinning && self.phase != Phase::Spinning {
            self.spin_started = Some(Instant::now());
        } else if snapshot.phase != Phase::Spinning {
            self.spin_started = None;
        }
        if snapshot.phase != Phase::Complete {
            self.prompt = None;
            self.new_winners.clear();
        }
        if snapshot.phase != Phase::Idle {
            self.count_entry = None;
        }

        self.phase = snapshot.phase;
        self.participant_count = snapshot.participant_count;
        self.winner_count = snapshot.winner_count;
        self.participants = snapshot.participants;
        self.winners = snapshot.winners;
        self.last_rejection = None;
    }

    /// Current spin sub-phase; `Stopped` outside of `Spinning`.
    pub fn spin_phase(&self) -> SpinPhase {
        match (self.phase, self.spin_started) {
            (Phase::Spinning, Some(started)) => SpinPhase::from_elapsed(started.elapsed()),
            (Phase::Spinning, None) => SpinPhase::Accelerating,
            _ => SpinPhase::Stopped,
        }
    }

    /// Advance row scrolling by one render tick.
    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        let step = match self.phase {
            Phase::Idle if self.tick % IDLE_DRIFT_TICKS == 0 => 1,
            Phase::Idle => 0,
            _ => self.spin_phase().scroll_step(),
        };
        for offset in &mut self.row_offsets {
            *offset = offset.wrapping_add(step);
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::AddWinnerPrompt { max_count } => {
            state.prompt = Some(CountPrompt::new(max_count));
            state.last_rejection = None;
        }
        UiUpdate::AdditionalWinners(batch) => {
            state.prompt = None;
            state.new_winners = batch;
        }
        UiUpdate::Rejected(reason) => {
            state.last_rejection = Some(reason);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: base panels, then whichever overlay applies.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let area = frame.area();
    let layout = build_layout(area);

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::avatar_rows::render(frame, layout.rows_panel, state);
    widgets::controls::render(frame, layout.controls, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    match state.phase {
        Phase::Spinning | Phase::Revealing => {
            widgets::drawing_popup::render(frame, area, state);
        }
        Phase::Complete => {
            widgets::winner_reveal::render(frame, layout.rows_panel, state);
            if let Some(prompt) = &state.prompt {
                widgets::add_winner_prompt::render(frame, area, prompt);
            } else if !state.new_winners.is_empty() {
                widgets::new_winners::render(frame, area, &state.new_winners);
            }
        }
        Phase::Idle => {}
    }

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, area);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal and installs a panic hook that restores it.
/// 2. Selects over UI updates, keyboard input, and render ticks.
/// 3. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<DrawCommand>,
    display: DisplayConfig,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let frame_interval = Duration::from_millis(1000 / u64::from(display.fps.max(1)));
    let mut view_state = ViewState::new(display);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(frame_interval);
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("TUI started");

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            debug!("Sending command {:?}", cmd);
                            let quit = cmd == DrawCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                view_state.advance_tick();
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    info!("TUI exited");

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
