// Integration tests for the draw core.
//
// These drive the public API end to end: configuration feeding a session,
// the event loop running timed draws, redraws, add-winner rounds, and the
// reset/close paths, checking the winner invariants along the way.

use std::collections::HashSet;
use std::time::Duration;

use lucky_draw_core::app;
use lucky_draw_core::config::{Config, DisplayConfig, DrawConfig};
use lucky_draw_core::participant::Participant;
use lucky_draw_core::protocol::{DrawCommand, DrawSnapshot, UiUpdate};
use lucky_draw_core::session::{DrawSession, Phase, REVEAL_DELAY, SPIN_DURATION};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ===========================================================================
// Test helpers
// ===========================================================================

fn config(participants: usize, winners: usize) -> Config {
    Config {
        draw: DrawConfig {
            participant_count: participants,
            winner_count: winners,
        },
        display: DisplayConfig::default(),
    }
}

fn session_from(config: &Config, seed: u64) -> DrawSession {
    DrawSession::with_rng(
        config.draw.participant_count,
        config.draw.winner_count,
        StdRng::seed_from_u64(seed),
    )
}

struct Harness {
    cmd_tx: mpsc::Sender<DrawCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    async fn start(session: DrawSession) -> (Self, DrawSnapshot) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(app::run(cmd_rx, ui_tx, session));
        let mut harness = Harness {
            cmd_tx,
            ui_rx,
            handle,
        };
        let initial = harness.snapshot().await;
        (harness, initial)
    }

    async fn send(&self, cmd: DrawCommand) {
        self.cmd_tx.send(cmd).await.expect("event loop alive");
    }

    async fn update(&mut self) -> UiUpdate {
        self.ui_rx.recv().await.expect("ui channel open")
    }

    async fn snapshot(&mut self) -> DrawSnapshot {
        match self.update().await {
            UiUpdate::Snapshot(s) => *s,
            other => panic!("Expected Snapshot, got {:?}", other),
        }
    }

    /// Start (or redraw) and wait until the draw is complete.
    async fn run_draw(&mut self, cmd: DrawCommand) -> DrawSnapshot {
        self.send(cmd).await;
        assert_eq!(self.snapshot().await.phase, Phase::Spinning);
        assert_eq!(self.snapshot().await.phase, Phase::Revealing);
        let complete = self.snapshot().await;
        assert_eq!(complete.phase, Phase::Complete);
        complete
    }

    async fn add_winners(&mut self, count: usize) -> (Vec<Participant>, DrawSnapshot) {
        self.send(DrawCommand::RequestAddWinner).await;
        match self.update().await {
            UiUpdate::AddWinnerPrompt { max_count } => assert!(count <= max_count),
            other => panic!("Expected AddWinnerPrompt, got {:?}", other),
        }
        self.send(DrawCommand::ConfirmAddWinner(count)).await;
        let batch = match self.update().await {
            UiUpdate::AdditionalWinners(batch) => batch,
            other => panic!("Expected AdditionalWinners, got {:?}", other),
        };
        (batch, self.snapshot().await)
    }

    async fn quit(self) {
        self.cmd_tx.send(DrawCommand::Quit).await.unwrap();
        assert!(self.handle.await.unwrap().is_ok());
    }
}

fn assert_winner_invariants(snapshot: &DrawSnapshot) {
    let ids: HashSet<u32> = snapshot.winners.iter().map(|w| w.id).collect();
    assert_eq!(ids.len(), snapshot.winners.len(), "duplicate winners");
    assert!(snapshot.winners.len() <= snapshot.participants.len());
    for w in &snapshot.winners {
        assert!(
            snapshot.participants.iter().any(|p| p.id == w.id),
            "winner {} is not a participant",
            w.id
        );
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[tokio::test]
async fn configured_draw_reveals_expected_winner_count() {
    tokio::time::pause();
    let (mut h, initial) = Harness::start(session_from(&config(100, 3), 1)).await;
    assert_eq!(initial.participants.len(), 100);

    let complete = h.run_draw(DrawCommand::StartDraw).await;
    assert_eq!(complete.winners.len(), 3);
    assert_winner_invariants(&complete);

    h.quit().await;
}

#[tokio::test]
async fn idle_edits_then_draw_uses_new_counts() {
    tokio::time::pause();
    let (mut h, _) = Harness::start(session_from(&config(100, 3), 2)).await;

    for (p, w) in [(40, 5), (40, 5), (12, 30), (250, 8)] {
        h.send(DrawCommand::Configure {
            participant_count: p,
            winner_count: w,
        })
        .await;
        let snap = h.snapshot().await;
        assert_eq!(snap.participants.len(), snap.participant_count);
        assert!(snap.winners.is_empty());
    }

    let complete = h.run_draw(DrawCommand::StartDraw).await;
    assert_eq!(complete.participants.len(), 250);
    assert_eq!(complete.winners.len(), 8);

    h.quit().await;
}

#[tokio::test]
async fn configure_is_refused_mid_draw() {
    tokio::time::pause();
    let (mut h, _) = Harness::start(session_from(&config(20, 2), 3)).await;

    h.send(DrawCommand::StartDraw).await;
    assert_eq!(h.snapshot().await.phase, Phase::Spinning);

    h.send(DrawCommand::Configure {
        participant_count: 50,
        winner_count: 5,
    })
    .await;
    assert!(matches!(h.update().await, UiUpdate::Rejected(_)));

    let revealing = h.snapshot().await;
    assert_eq!(revealing.participant_count, 20);
    assert_eq!(revealing.winners.len(), 2);

    h.quit().await;
}

#[tokio::test]
async fn repeated_add_winner_rounds_until_exhausted() {
    tokio::time::pause();
    let (mut h, _) = Harness::start(session_from(&config(12, 4), 4)).await;
    let mut snap = h.run_draw(DrawCommand::StartDraw).await;

    while snap.winners.len() < snap.participants.len() {
        let before: HashSet<u32> = snap.winners.iter().map(|w| w.id).collect();
        let remaining = snap.participants.len() - snap.winners.len();
        let (batch, after) = h.add_winners(remaining.min(3)).await;

        for w in &batch {
            assert!(w.is_additional);
            assert!(!before.contains(&w.id));
        }
        assert_eq!(&after.winners[..batch.len()], &batch[..]);
        assert_winner_invariants(&after);
        snap = after;
    }

    h.send(DrawCommand::RequestAddWinner).await;
    assert!(matches!(h.update().await, UiUpdate::Rejected(_)));

    h.quit().await;
}

#[tokio::test]
async fn redraw_replaces_all_winners() {
    tokio::time::pause();
    let (mut h, _) = Harness::start(session_from(&config(30, 5), 5)).await;
    let first = h.run_draw(DrawCommand::StartDraw).await;
    let (_, with_extra) = h.add_winners(3).await;
    assert_eq!(with_extra.winners.len(), 8);

    let second = h.run_draw(DrawCommand::Redraw).await;
    assert_eq!(second.winners.len(), 5);
    assert!(second.winners.iter().all(|w| !w.is_additional));
    assert_eq!(second.participants, first.participants);
    assert!(second.generation > first.generation);

    h.quit().await;
}

#[tokio::test]
async fn close_keeps_pool_and_reset_replaces_it() {
    tokio::time::pause();
    let (mut h, initial) = Harness::start(session_from(&config(30, 2), 6)).await;

    h.run_draw(DrawCommand::StartDraw).await;
    h.send(DrawCommand::Close).await;
    let closed = h.snapshot().await;
    assert_eq!(closed.phase, Phase::Idle);
    assert!(closed.winners.is_empty());
    assert_eq!(closed.participants, initial.participants);

    h.run_draw(DrawCommand::StartDraw).await;
    h.send(DrawCommand::Reset).await;
    let reset = h.snapshot().await;
    assert_eq!(reset.phase, Phase::Idle);
    assert!(reset.winners.is_empty());
    assert_eq!(reset.participants.len(), 30);
    assert_ne!(reset.participants, initial.participants);

    h.quit().await;
}

#[tokio::test]
async fn reset_mid_spin_then_new_draw_is_not_disturbed() {
    tokio::time::pause();
    let (mut h, _) = Harness::start(session_from(&config(40, 4), 7)).await;

    h.send(DrawCommand::StartDraw).await;
    assert_eq!(h.snapshot().await.phase, Phase::Spinning);
    tokio::time::sleep(SPIN_DURATION / 2).await;

    h.send(DrawCommand::Reset).await;
    assert_eq!(h.snapshot().await.phase, Phase::Idle);

    // Start again immediately; the first spin's deadline falls inside the
    // second spin and must not cut it short.
    let restarted = tokio::time::Instant::now();
    h.send(DrawCommand::StartDraw).await;
    assert_eq!(h.snapshot().await.phase, Phase::Spinning);
    let revealing = h.snapshot().await;
    assert_eq!(revealing.phase, Phase::Revealing);
    assert!(restarted.elapsed() >= SPIN_DURATION);

    let complete = h.snapshot().await;
    assert_eq!(complete.phase, Phase::Complete);
    assert!(restarted.elapsed() >= SPIN_DURATION + REVEAL_DELAY);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(h.ui_rx.try_recv().is_err());

    h.quit().await;
}

#[tokio::test]
async fn cancelled_prompt_then_confirm_is_rejected() {
    tokio::time::pause();
    let (mut h, _) = Harness::start(session_from(&config(10, 2), 8)).await;
    h.run_draw(DrawCommand::StartDraw).await;

    h.send(DrawCommand::RequestAddWinner).await;
    assert_eq!(h.update().await, UiUpdate::AddWinnerPrompt { max_count: 8 });
    h.send(DrawCommand::CancelAddWinner).await;
    h.send(DrawCommand::ConfirmAddWinner(1)).await;
    assert!(matches!(h.update().await, UiUpdate::Rejected(_)));

    h.quit().await;
}
