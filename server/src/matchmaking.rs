// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matchmaking queue
//!
//! A deliberately simple FIFO queue: a seek request pairs with the
//! oldest waiting request carrying the same board size, time control and
//! game type. Pairing creates the game through the registry, seats the
//! waiting player as creator and joins the new seeker, so the game is
//! running before either side hears about it.

use crate::error::SessionError;
use crate::events::{publish_to_player, GameEvent, Notifier};
use crate::registry::GameRegistry;
use baduk_core::{GameType, PlayerId, TimeControl};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// What a player wants to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRequest {
    pub board_size: u8,
    pub time_control: TimeControl,
    pub game_type: GameType,
}

/// Result of a seek call.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// No compatible opponent yet; the request is queued
    Waiting,
    /// Paired into a freshly started game
    Paired { game_id: Uuid, opponent: PlayerId },
}

enum MatchCmd {
    Seek {
        player: PlayerId,
        request: MatchRequest,
        reply: oneshot::Sender<Result<MatchOutcome, SessionError>>,
    },
    Cancel {
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to the matchmaking actor.
#[derive(Clone)]
pub struct Matchmaker {
    tx: mpsc::Sender<MatchCmd>,
}

impl Matchmaker {
    pub fn spawn(registry: Arc<GameRegistry>, notifier: Arc<dyn Notifier>) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let actor = MatchmakerActor {
            queue: Vec::new(),
            registry,
            notifier,
        };
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    /// Queue for a game, pairing immediately when a compatible seek is
    /// already waiting.
    pub async fn seek(
        &self,
        player: PlayerId,
        request: MatchRequest,
    ) -> Result<MatchOutcome, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(MatchCmd::Seek {
                player,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::Internal("matchmaker terminated".into()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Internal("matchmaker dropped its reply".into()))?
    }

    /// Withdraw a pending seek. Returns whether one was removed.
    pub async fn cancel(&self, player: PlayerId) -> Result<bool, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(MatchCmd::Cancel {
                player,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::Internal("matchmaker terminated".into()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Internal("matchmaker dropped its reply".into()))
    }
}

struct MatchmakerActor {
    queue: Vec<(PlayerId, MatchRequest)>,
    registry: Arc<GameRegistry>,
    notifier: Arc<dyn Notifier>,
}

impl MatchmakerActor {
    async fn run(mut self, mut rx: mpsc::Receiver<MatchCmd>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                MatchCmd::Seek {
                    player,
                    request,
                    reply,
                } => {
                    let result = self.handle_seek(player, request).await;
                    let _ = reply.send(result);
                }
                MatchCmd::Cancel { player, reply } => {
                    let before = self.queue.len();
                    self.queue.retain(|(queued, _)| *queued != player);
                    let _ = reply.send(self.queue.len() != before);
                }
            }
        }
        tracing::debug!("matchmaker stopped");
    }

    async fn handle_seek(
        &mut self,
        player: PlayerId,
        request: MatchRequest,
    ) -> Result<MatchOutcome, SessionError> {
        if self.queue.iter().any(|(queued, _)| *queued == player) {
            return Ok(MatchOutcome::Waiting);
        }

        let matched = self
            .queue
            .iter()
            .position(|(queued, waiting)| *queued != player && *waiting == request);
        let Some(index) = matched else {
            self.queue.push((player, request));
            tracing::debug!(%player, "seek queued");
            return Ok(MatchOutcome::Waiting);
        };
        let (opponent, _) = self.queue.remove(index);

        // The waiting player created the game; the new seeker completes
        // it, which starts the clocks.
        let game_id = self
            .registry
            .create_game(
                request.board_size,
                request.time_control,
                opponent,
                request.game_type,
            )
            .await?;
        let session = self.registry.session(game_id).await?;
        session.join(player).await?;

        tracing::info!(%game_id, %player, %opponent, "players paired");
        publish_to_player(
            &self.notifier,
            opponent,
            GameEvent::MatchFound {
                game_id,
                opponent: player,
            },
        );
        Ok(MatchOutcome::Paired { game_id, opponent })
    }
}
