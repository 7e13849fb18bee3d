// Draw session: phase lifecycle, counts, winners, and the add-winner flow.
//
// The session is synchronous. Commands that start a timed transition return
// a `PhaseTimer`; whoever drives the session (see `app::run`) sleeps for the
// timer's delay and hands it back through `fire`. Each timer carries the
// generation it was issued under, and any command that starts, restarts or
// abandons a draw bumps the generation, so timers from an earlier attempt
// are dropped on arrival.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::DrawError;
use crate::participant::{generate_participants, Participant};
use crate::protocol::DrawSnapshot;
use crate::selector::{remaining_participants, select_winners};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How long the rows spin before winners are picked.
pub const SPIN_DURATION: Duration = Duration::from_secs(3);

/// Pause between picking winners and showing them.
pub const REVEAL_DELAY: Duration = Duration::from_millis(500);

pub const MIN_PARTICIPANTS: usize = 1;
pub const MAX_PARTICIPANTS: usize = 1000;
pub const MIN_WINNERS: usize = 1;
pub const MAX_WINNERS: usize = 200;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Top-level lifecycle state of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Spinning,
    Revealing,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::Spinning => "spinning",
            Phase::Revealing => "revealing",
            Phase::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Finer-grained choreography of the spin, derived from time since the spin
/// started. Only the presentation layer cares about this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinPhase {
    Accelerating,
    Peak,
    Decelerating,
    Stopped,
}

impl SpinPhase {
    const ACCELERATION_END: Duration = Duration::from_millis(1000);
    const PEAK_END: Duration = Duration::from_millis(2250);

    pub fn from_elapsed(elapsed: Duration) -> Self {
        if elapsed < Self::ACCELERATION_END {
            SpinPhase::Accelerating
        } else if elapsed < Self::PEAK_END {
            SpinPhase::Peak
        } else if elapsed < SPIN_DURATION {
            SpinPhase::Decelerating
        } else {
            SpinPhase::Stopped
        }
    }

    /// Avatar cells a row advances per render tick.
    pub fn scroll_step(self) -> usize {
        match self {
            SpinPhase::Accelerating => 1,
            SpinPhase::Peak => 3,
            SpinPhase::Decelerating => 1,
            SpinPhase::Stopped => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Timers and requests
// ---------------------------------------------------------------------------

/// A one-shot, delayed phase transition issued by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimer {
    /// Session generation at the time the timer was issued.
    pub generation: u64,
    /// Phase the session moves to when the timer fires.
    pub target: Phase,
    /// Delay before firing.
    pub delay: Duration,
}

/// An open add-winner prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWinnerRequest {
    /// Participants that have not won yet, captured when the prompt opened.
    pub remaining: Vec<Participant>,
}

impl AddWinnerRequest {
    /// Upper bound for the prompt's count.
    pub fn max_count(&self) -> usize {
        self.remaining.len()
    }
}

// ---------------------------------------------------------------------------
// DrawSession
// ---------------------------------------------------------------------------

pub struct DrawSession {
    participant_count: usize,
    winner_count: usize,
    participants: Vec<Participant>,
    /// Current winners, newest additional batch first.
    winners: Vec<Participant>,
    phase: Phase,
    /// Bumped by start_draw, redraw, reset and close. Timers from older
    /// generations are ignored by `fire`.
    ///
    /// u64 overflow is not a practical concern.
    generation: u64,
    pending_add: Option<AddWinnerRequest>,
    latest_additional: Vec<Participant>,
    rng: StdRng,
}

impl DrawSession {
    /// Create an idle session with an entropy-seeded generator. Counts are
    /// clamped the same way `configure` clamps them.
    pub fn new(participant_count: usize, winner_count: usize) -> Self {
        Self::with_rng(participant_count, winner_count, StdRng::from_entropy())
    }

    /// Create an idle session with a caller-provided generator.
    pub fn with_rng(participant_count: usize, winner_count: usize, mut rng: StdRng) -> Self {
        let (participant_count, winner_count) =
            clamp_counts(participant_count as i64, winner_count as i64);
        let participants = generate_participants(participant_count, &mut rng);
        DrawSession {
            participant_count,
            winner_count,
            participants,
            winners: Vec::new(),
            phase: Phase::Idle,
            generation: 0,
            pending_add: None,
            latest_additional: Vec::new(),
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn participant_count(&self) -> usize {
        self.participant_count
    }

    pub fn winner_count(&self) -> usize {
        self.winner_count
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn winners(&self) -> &[Participant] {
        &self.winners
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_add(&self) -> Option<&AddWinnerRequest> {
        self.pending_add.as_ref()
    }

    /// The batch produced by the most recent add-winner round.
    pub fn latest_additional(&self) -> &[Participant] {
        &self.latest_additional
    }

    /// Capture the observable state for rendering.
    pub fn snapshot(&self) -> DrawSnapshot {
        DrawSnapshot {
            phase: self.phase,
            participant_count: self.participant_count,
            winner_count: self.winner_count,
            participants: self.participants.clone(),
            winners: self.winners.clone(),
            generation: self.generation,
        }
    }

    // -----------------------------------------------------------------------
    // Idle editing
    // -----------------------------------------------------------------------

    /// Update the pool size and winner count.
    ///
    /// Out-of-range values are clamped rather than rejected. The pool is
    /// regenerated only when the participant count actually changes.
    pub fn configure(&mut self, participant_count: i64, winner_count: i64) -> Result<(), DrawError> {
        self.require_phase("configure", Phase::Idle)?;

        let (participant_count, winner_count) = clamp_counts(participant_count, winner_count);
        if participant_count != self.participant_count
            || self.participants.len() != participant_count
        {
            self.participant_count = participant_count;
            self.regenerate_participants();
        }
        self.winner_count = winner_count;

        debug!(
            "Configured draw: {} participants, {} winners",
            self.participant_count, self.winner_count
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Phase commands
    // -----------------------------------------------------------------------

    /// Begin spinning from idle. The returned timer moves the draw to
    /// `Revealing` once the spin has run.
    pub fn start_draw(&mut self) -> Result<PhaseTimer, DrawError> {
        self.require_phase("start_draw", Phase::Idle)?;
        self.check_draw_preconditions()?;
        Ok(self.begin_spin())
    }

    /// Spin again from `Complete`, discarding the current winners.
    pub fn redraw(&mut self) -> Result<PhaseTimer, DrawError> {
        self.require_phase("redraw", Phase::Complete)?;
        self.check_draw_preconditions()?;
        Ok(self.begin_spin())
    }

    /// Return to idle with a freshly generated pool. Allowed in every phase.
    pub fn reset(&mut self) {
        self.abandon_draw();
        self.regenerate_participants();
        info!("Draw reset (gen: {})", self.generation);
    }

    /// Return to idle keeping the current pool.
    pub fn close(&mut self) -> Result<(), DrawError> {
        if self.phase == Phase::Idle {
            return Err(DrawError::InvalidState {
                command: "close",
                phase: self.phase,
            });
        }
        self.abandon_draw();
        info!("Draw closed (gen: {})", self.generation);
        Ok(())
    }

    /// Apply a timer previously returned by this session.
    ///
    /// Timers from an older generation, or whose target no longer follows the
    /// current phase, are ignored. Returns the follow-up timer, if any.
    pub fn fire(&mut self, timer: PhaseTimer) -> Option<PhaseTimer> {
        if timer.generation != self.generation {
            debug!(
                "Discarding stale timer (timer gen: {}, current gen: {})",
                timer.generation, self.generation
            );
            return None;
        }

        match (self.phase, timer.target) {
            (Phase::Spinning, Phase::Revealing) => {
                let mut winners =
                    select_winners(&self.participants, self.winner_count, &mut self.rng);
                for winner in &mut winners {
                    winner.is_additional = false;
                }
                self.winners = winners;
                self.phase = Phase::Revealing;
                info!(
                    "Selected {} winners from {} participants (gen: {})",
                    self.winners.len(),
                    self.participants.len(),
                    self.generation
                );
                Some(PhaseTimer {
                    generation: self.generation,
                    target: Phase::Complete,
                    delay: REVEAL_DELAY,
                })
            }
            (Phase::Revealing, Phase::Complete) => {
                self.phase = Phase::Complete;
                None
            }
            (phase, target) => {
                debug!("Ignoring timer targeting {} while {}", target, phase);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Add-winner flow
    // -----------------------------------------------------------------------

    /// Open the add-winner prompt. Returns the largest count that can be
    /// requested.
    pub fn request_add_winner(&mut self) -> Result<usize, DrawError> {
        self.require_phase("request_add_winner", Phase::Complete)?;

        let remaining = remaining_participants(&self.participants, &self.winners);
        if remaining.is_empty() {
            return Err(DrawError::NoRemainingParticipants);
        }

        let request = AddWinnerRequest { remaining };
        let max_count = request.max_count();
        self.pending_add = Some(request);
        Ok(max_count)
    }

    /// Draw `count` more winners from those who have not won yet.
    ///
    /// The new winners are flagged as additional and placed ahead of the
    /// existing ones. An out-of-range count leaves the prompt open.
    pub fn confirm_add_winner(&mut self, count: usize) -> Result<Vec<Participant>, DrawError> {
        self.require_phase("confirm_add_winner", Phase::Complete)?;

        let max_count = match &self.pending_add {
            Some(request) => request.max_count(),
            None => {
                return Err(DrawError::InvalidState {
                    command: "confirm_add_winner",
                    phase: self.phase,
                })
            }
        };
        if count < 1 || count > max_count {
            return Err(DrawError::invalid_argument(
                "count",
                format!("must be between 1 and {max_count}, got {count}"),
            ));
        }

        let Some(request) = self.pending_add.take() else {
            return Err(DrawError::InvalidState {
                command: "confirm_add_winner",
                phase: self.phase,
            });
        };

        let mut batch = select_winners(&request.remaining, count, &mut self.rng);
        for winner in &mut batch {
            winner.is_additional = true;
        }

        let mut winners = batch.clone();
        winners.append(&mut self.winners);
        self.winners = winners;
        self.latest_additional = batch.clone();

        info!(
            "Added {} winners ({} total, {} still eligible)",
            batch.len(),
            self.winners.len(),
            max_count - batch.len()
        );
        Ok(batch)
    }

    /// Close the add-winner prompt without drawing.
    pub fn cancel_add_winner(&mut self) {
        self.pending_add = None;
    }

    /// Forget the latest add-winner batch once its popup has been closed.
    pub fn dismiss_additional(&mut self) {
        self.latest_additional.clear();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn require_phase(&self, command: &'static str, expected: Phase) -> Result<(), DrawError> {
        if self.phase != expected {
            return Err(DrawError::InvalidState {
                command,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn check_draw_preconditions(&self) -> Result<(), DrawError> {
        if self.participants.is_empty() {
            return Err(DrawError::invalid_argument(
                "participants",
                "the participant pool is empty",
            ));
        }
        if self.winner_count < MIN_WINNERS || self.winner_count > self.participants.len() {
            return Err(DrawError::invalid_argument(
                "winner_count",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_WINNERS,
                    self.participants.len(),
                    self.winner_count
                ),
            ));
        }
        Ok(())
    }

    fn begin_spin(&mut self) -> PhaseTimer {
        self.winners.clear();
        self.pending_add = None;
        self.latest_additional.clear();
        self.phase = Phase::Spinning;
        self.generation += 1;
        info!(
            "Spinning for {} winners among {} participants (gen: {})",
            self.winner_count,
            self.participants.len(),
            self.generation
        );
        PhaseTimer {
            generation: self.generation,
            target: Phase::Revealing,
            delay: SPIN_DURATION,
        }
    }

    fn abandon_draw(&mut self) {
        self.winners.clear();
        self.pending_add = None;
        self.latest_additional.clear();
        self.phase = Phase::Idle;
        self.generation += 1;
    }

    fn regenerate_participants(&mut self) {
        self.participants = generate_participants(self.participant_count, &mut self.rng);
    }
}

/// Clamp raw counts to their documented ranges, keeping the winner count no
/// larger than the pool.
pub fn clamp_counts(participant_count: i64, winner_count: i64) -> (usize, usize) {
    let participants =
        participant_count.clamp(MIN_PARTICIPANTS as i64, MAX_PARTICIPANTS as i64) as usize;
    let winners = winner_count.clamp(MIN_WINNERS as i64, MAX_WINNERS as i64) as usize;
    (participants, winners.min(participants))
}

/// Parse text from a numeric count input.
pub fn parse_count(field: &'static str, input: &str) -> Result<i64, DrawError> {
    let trimmed = input.trim();
    trimmed.parse::<i64>().map_err(|_| {
        DrawError::invalid_argument(field, format!("expected a whole number, got {trimmed:?}"))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
