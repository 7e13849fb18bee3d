// Draw event loop.
//
// Owns the `DrawSession` and is its only mutator. Commands arrive from the
// presentation layer over an mpsc channel; phase timers run as spawned tasks
// that sleep and then report back over a second channel. Every transition is
// followed by a `UiUpdate::Snapshot`.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::DrawError;
use crate::protocol::{DrawCommand, UiUpdate};
use crate::session::{DrawSession, PhaseTimer};

/// Capacity of the internal timer channel. At most one timer is in flight,
/// so this only needs to absorb an event queued just before an abort.
const TIMER_CHANNEL_CAPACITY: usize = 8;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: DrawSession,
    /// Task sleeping towards the next phase transition, if any.
    pub current_timer: Option<JoinHandle<()>>,
    /// Cloned into timer tasks so they can report back to the loop.
    pub timer_tx: mpsc::Sender<PhaseTimer>,
}

impl AppState {
    pub fn new(session: DrawSession, timer_tx: mpsc::Sender<PhaseTimer>) -> Self {
        AppState {
            session,
            current_timer: None,
            timer_tx,
        }
    }

    /// Abort the pending timer task, if one is running.
    pub fn cancel_timer(&mut self) {
        if let Some(handle) = self.current_timer.take() {
            handle.abort();
            debug!("Cancelled pending phase timer");
        }
    }

    /// Spawn a one-shot task that delivers `timer` after its delay,
    /// replacing any timer already pending.
    pub fn schedule(&mut self, timer: PhaseTimer) {
        self.cancel_timer();

        let tx = self.timer_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timer.delay).await;
            if tx.send(timer).await.is_err() {
                debug!("Timer channel closed before delivery");
            }
        });

        self.current_timer = Some(handle);
        debug!(
            "Scheduled transition to {} in {:?} (gen: {})",
            timer.target, timer.delay, timer.generation
        );
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the draw event loop until `DrawCommand::Quit` arrives or the command
/// channel closes.
///
/// An initial snapshot is pushed before the first command is read.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<DrawCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    session: DrawSession,
) -> anyhow::Result<()> {
    info!("Draw event loop started");

    let (timer_tx, mut timer_rx) = mpsc::channel(TIMER_CHANNEL_CAPACITY);
    let mut state = AppState::new(session, timer_tx);

    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(DrawCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            Some(timer) = timer_rx.recv() => {
                handle_timer(&mut state, timer, &ui_tx).await;
            }
        }
    }

    state.cancel_timer();
    info!("Draw event loop exiting");
    Ok(())
}

/// Apply a fired timer. Stale timers leave the session untouched and
/// produce no update.
async fn handle_timer(state: &mut AppState, timer: PhaseTimer, ui_tx: &mpsc::Sender<UiUpdate>) {
    let before = (state.session.phase(), state.session.generation());

    let next = state.session.fire(timer);

    if (state.session.phase(), state.session.generation()) == before {
        return;
    }

    match next {
        Some(next) => state.schedule(next),
        None => state.current_timer = None,
    }
    send_snapshot(state, ui_tx).await;
}

/// Handle a command from the presentation layer.
async fn handle_command(state: &mut AppState, cmd: DrawCommand, ui_tx: &mpsc::Sender<UiUpdate>) {
    debug!("Handling command {:?}", cmd);

    let result: Result<(), DrawError> = match cmd {
        DrawCommand::Configure {
            participant_count,
            winner_count,
        } => state.session.configure(participant_count, winner_count),
        DrawCommand::StartDraw => match state.session.start_draw() {
            Ok(timer) => {
                state.schedule(timer);
                Ok(())
            }
            Err(e) => Err(e),
        },
        DrawCommand::Redraw => match state.session.redraw() {
            Ok(timer) => {
                state.schedule(timer);
                Ok(())
            }
            Err(e) => Err(e),
        },
        DrawCommand::Reset => {
            state.cancel_timer();
            state.session.reset();
            Ok(())
        }
        DrawCommand::Close => match state.session.close() {
            Ok(()) => {
                state.cancel_timer();
                Ok(())
            }
            Err(e) => Err(e),
        },
        DrawCommand::RequestAddWinner => match state.session.request_add_winner() {
            Ok(max_count) => {
                let _ = ui_tx.send(UiUpdate::AddWinnerPrompt { max_count }).await;
                return;
            }
            Err(e) => Err(e),
        },
        DrawCommand::ConfirmAddWinner(count) => match state.session.confirm_add_winner(count) {
            Ok(batch) => {
                let _ = ui_tx.send(UiUpdate::AdditionalWinners(batch)).await;
                Ok(())
            }
            Err(e) => Err(e),
        },
        DrawCommand::CancelAddWinner => {
            state.session.cancel_add_winner();
            return;
        }
        DrawCommand::DismissAdditional => {
            state.session.dismiss_additional();
            return;
        }
        DrawCommand::Quit => {
            // Handled in the main loop
            return;
        }
    };

    match result {
        Ok(()) => send_snapshot(state, ui_tx).await,
        Err(e) => {
            warn!("Rejected command: {}", e);
            let _ = ui_tx.send(UiUpdate::Rejected(e.to_string())).await;
        }
    }
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.session.snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DrawSnapshot;
    use crate::session::{Phase, REVEAL_DELAY, SPIN_DURATION};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tokio::time::Instant;

    fn test_session(participants: usize, winners: usize) -> DrawSession {
        DrawSession::with_rng(participants, winners, StdRng::seed_from_u64(9))
    }

    fn spawn_loop(
        session: DrawSession,
    ) -> (
        mpsc::Sender<DrawCommand>,
        mpsc::Receiver<UiUpdate>,
        JoinHandle<anyhow::Result<()>>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, session));
        (cmd_tx, ui_rx, handle)
    }

    async fn next_snapshot(ui_rx: &mut mpsc::Receiver<UiUpdate>) -> DrawSnapshot {
        match ui_rx.recv().await.expect("ui channel open") {
            UiUpdate::Snapshot(snapshot) => *snapshot,
            other => panic!("Expected Snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn event_loop_sends_initial_snapshot_and_quits() {
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 2));

        let initial = next_snapshot(&mut ui_rx).await;
        assert_eq!(initial.phase, Phase::Idle);
        assert_eq!(initial.participants.len(), 10);

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn event_loop_exits_when_commands_close() {
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 2));
        next_snapshot(&mut ui_rx).await;
        drop(cmd_tx);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn draw_advances_through_phases_on_schedule() {
        tokio::time::pause();
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(50, 4));
        next_snapshot(&mut ui_rx).await;

        let started = Instant::now();
        cmd_tx.send(DrawCommand::StartDraw).await.unwrap();
        let spinning = next_snapshot(&mut ui_rx).await;
        assert_eq!(spinning.phase, Phase::Spinning);
        assert!(spinning.winners.is_empty());

        let revealing = next_snapshot(&mut ui_rx).await;
        assert_eq!(revealing.phase, Phase::Revealing);
        assert_eq!(revealing.winners.len(), 4);
        assert!(started.elapsed() >= SPIN_DURATION);

        let complete = next_snapshot(&mut ui_rx).await;
        assert_eq!(complete.phase, Phase::Complete);
        assert_eq!(complete.winners, revealing.winners);
        assert!(started.elapsed() >= SPIN_DURATION + REVEAL_DELAY);

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn reset_during_spin_suppresses_old_timer() {
        tokio::time::pause();
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 3));
        next_snapshot(&mut ui_rx).await;

        cmd_tx.send(DrawCommand::StartDraw).await.unwrap();
        assert_eq!(next_snapshot(&mut ui_rx).await.phase, Phase::Spinning);

        tokio::time::sleep(Duration::from_secs(1)).await;
        cmd_tx.send(DrawCommand::Reset).await.unwrap();
        let idle = next_snapshot(&mut ui_rx).await;
        assert_eq!(idle.phase, Phase::Idle);
        assert!(idle.winners.is_empty());

        // Well past the original reveal and complete deadlines.
        tokio::time::sleep(SPIN_DURATION + REVEAL_DELAY + Duration::from_secs(1)).await;
        assert!(
            ui_rx.try_recv().is_err(),
            "no transition should follow a reset"
        );

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn stale_timer_event_is_discarded() {
        let (timer_tx, _timer_rx) = mpsc::channel(4);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);
        let mut state = AppState::new(test_session(10, 3), timer_tx);

        let stale = state.session.start_draw().unwrap();
        state.session.reset();

        handle_timer(&mut state, stale, &ui_tx).await;

        assert_eq!(state.session.phase(), Phase::Idle);
        assert!(state.session.winners().is_empty());
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn old_complete_timer_cannot_finish_a_new_draw() {
        let (timer_tx, _timer_rx) = mpsc::channel(4);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);
        let mut state = AppState::new(test_session(10, 3), timer_tx);

        let spin = state.session.start_draw().unwrap();
        let old_complete = state.session.fire(spin).unwrap();
        state.session.reset();
        state.session.start_draw().unwrap();

        handle_timer(&mut state, old_complete, &ui_tx).await;

        assert_eq!(state.session.phase(), Phase::Spinning);
        assert!(state.session.winners().is_empty());
        assert!(ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejected_command_reports_reason() {
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 3));
        next_snapshot(&mut ui_rx).await;

        cmd_tx.send(DrawCommand::Redraw).await.unwrap();
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Rejected(msg) => assert!(msg.contains("redraw"), "got {msg}"),
            other => panic!("Expected Rejected, got {:?}", other),
        }

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn configure_pushes_updated_snapshot() {
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 3));
        next_snapshot(&mut ui_rx).await;

        cmd_tx
            .send(DrawCommand::Configure {
                participant_count: 5000,
                winner_count: 0,
            })
            .await
            .unwrap();
        let snap = next_snapshot(&mut ui_rx).await;
        assert_eq!(snap.participant_count, 1000);
        assert_eq!(snap.winner_count, 1);
        assert_eq!(snap.participants.len(), 1000);

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn add_winner_flow_through_event_loop() {
        tokio::time::pause();
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 3));
        next_snapshot(&mut ui_rx).await;

        cmd_tx.send(DrawCommand::StartDraw).await.unwrap();
        next_snapshot(&mut ui_rx).await; // spinning
        next_snapshot(&mut ui_rx).await; // revealing
        let complete = next_snapshot(&mut ui_rx).await;
        assert_eq!(complete.phase, Phase::Complete);

        cmd_tx.send(DrawCommand::RequestAddWinner).await.unwrap();
        assert_eq!(
            ui_rx.recv().await.unwrap(),
            UiUpdate::AddWinnerPrompt { max_count: 7 }
        );

        cmd_tx.send(DrawCommand::ConfirmAddWinner(2)).await.unwrap();
        let batch = match ui_rx.recv().await.unwrap() {
            UiUpdate::AdditionalWinners(batch) => batch,
            other => panic!("Expected AdditionalWinners, got {:?}", other),
        };
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|w| w.is_additional));

        let after = next_snapshot(&mut ui_rx).await;
        assert_eq!(after.winners.len(), 5);
        assert_eq!(&after.winners[..2], &batch[..]);
        assert_eq!(after.phase, Phase::Complete);

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn add_winner_when_everyone_won_is_rejected() {
        tokio::time::pause();
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(3, 3));
        next_snapshot(&mut ui_rx).await;

        cmd_tx.send(DrawCommand::StartDraw).await.unwrap();
        for _ in 0..3 {
            next_snapshot(&mut ui_rx).await;
        }

        cmd_tx.send(DrawCommand::RequestAddWinner).await.unwrap();
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Rejected(msg) => assert!(msg.contains("already won")),
            other => panic!("Expected Rejected, got {:?}", other),
        }

        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn quit_cancels_pending_timer() {
        tokio::time::pause();
        let (cmd_tx, mut ui_rx, handle) = spawn_loop(test_session(10, 3));
        next_snapshot(&mut ui_rx).await;

        cmd_tx.send(DrawCommand::StartDraw).await.unwrap();
        next_snapshot(&mut ui_rx).await;
        cmd_tx.send(DrawCommand::Quit).await.unwrap();
        assert!(handle.await.unwrap().is_ok());

        // The loop dropped its sender; nothing else is delivered.
        assert!(ui_rx.recv().await.is_none());
    }
}
