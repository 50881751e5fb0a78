// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn timer actor
//!
//! One timer task per game session. It keeps at most one pending deadline
//! and, when the deadline fires, calls the session's timeout entry. A
//! returned snapshot that is still running with time left means a
//! byo-yomi period boundary or a lost race against a move; the timer then
//! re-arms itself for the returned remainder, which is what makes periods
//! tick down without the session polling.

use crate::session::SessionCommand;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

#[derive(Debug)]
pub(crate) enum TimerCmd {
    /// Arm a deadline; no-op while one is pending
    Start(Duration),
    /// Arm a deadline, cancelling any pending one
    Restart(Duration),
    /// Cancel any pending deadline; idempotent
    Stop,
}

/// Handle to a session's timer task.
///
/// Commands travel over an unbounded channel: the session never blocks
/// toward its timer, even while the timer is awaiting a session reply.
#[derive(Clone)]
pub struct TurnTimer {
    tx: mpsc::UnboundedSender<TimerCmd>,
}

impl TurnTimer {
    /// Spawn the timer task for a session. The task exits when the last
    /// handle is dropped.
    pub(crate) fn spawn(game_id: Uuid, session: mpsc::Sender<SessionCommand>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(game_id, rx, session));
        Self { tx }
    }

    pub fn start(&self, duration: Duration) {
        let _ = self.tx.send(TimerCmd::Start(duration));
    }

    pub fn restart(&self, duration: Duration) {
        let _ = self.tx.send(TimerCmd::Restart(duration));
    }

    pub fn stop(&self) {
        let _ = self.tx.send(TimerCmd::Stop);
    }
}

async fn run(game_id: Uuid, mut rx: mpsc::UnboundedReceiver<TimerCmd>, session: mpsc::Sender<SessionCommand>) {
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(TimerCmd::Start(d)) => {
                    if deadline.is_none() {
                        deadline = Some(Instant::now() + d);
                    }
                }
                Some(TimerCmd::Restart(d)) => {
                    deadline = Some(Instant::now() + d);
                }
                Some(TimerCmd::Stop) => {
                    deadline = None;
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                match fire(&session).await {
                    Fired::Rearm(remaining) => {
                        deadline = Some(Instant::now() + remaining);
                    }
                    Fired::Idle => {}
                    Fired::SessionGone => break,
                }
            }
        }
    }

    tracing::debug!(%game_id, "turn timer stopped");
}

enum Fired {
    Rearm(Duration),
    Idle,
    SessionGone,
}

/// Deliver the timeout to the session and decide whether to re-arm.
async fn fire(session: &mpsc::Sender<SessionCommand>) -> Fired {
    let (reply_tx, reply_rx) = oneshot::channel();
    if session
        .send(SessionCommand::Timeout { reply: reply_tx })
        .await
        .is_err()
    {
        return Fired::SessionGone;
    }

    match reply_rx.await {
        Ok(Ok(snapshot)) if snapshot.is_running && snapshot.main_time_ms > 0 => {
            Fired::Rearm(Duration::from_millis(snapshot.main_time_ms as u64))
        }
        // True expiry: the session ended the game
        Ok(Ok(_)) => Fired::Idle,
        // Lost the race against a move or a state change; the session
        // re-armed us if a clock is still running
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "timeout rejected by session");
            Fired::Idle
        }
        Err(_) => Fired::SessionGone,
    }
}
