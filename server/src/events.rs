// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game events and the push-notification seam
//!
//! Events are published fire-and-forget: delivery failures are logged and
//! never retried, and no publication ever blocks the state machine.

use async_trait::async_trait;
use baduk_core::{Color, Coord, GameResult, Move, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Events pushed to players as a game progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// Both seats are taken and the clocks are running
    GameStarted { black: PlayerId, white: PlayerId },
    /// An accepted move
    MoveMade {
        color: Color,
        mv: Move,
        move_number: u32,
    },
    /// Two consecutive passes: dead-stone negotiation begins
    ScoringStarted,
    /// A dead-stone mark changed; prior acceptances are void
    DeadStoneEdited { position: Coord, alive: bool },
    /// One player accepted the current dead-stone state
    ScoresAccepted { color: Color },
    /// Scoring was disputed and play resumed
    GameResumed,
    /// Terminal result
    GameEnded { result: GameResult },
    /// Matchmaking paired this player into a game
    MatchFound { game_id: Uuid, opponent: PlayerId },
}

/// Push-notification sink. Implementations deliver to a single
/// connection or to every connection subscribed to a game.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_to_player(&self, player: PlayerId, event: &GameEvent) -> anyhow::Result<()>;
    async fn send_to_game(&self, game_id: Uuid, event: &GameEvent) -> anyhow::Result<()>;
}

/// Sink that only logs, for tests and headless deployments.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_to_player(&self, player: PlayerId, event: &GameEvent) -> anyhow::Result<()> {
        tracing::info!(%player, event = %describe(event), "push to player");
        Ok(())
    }

    async fn send_to_game(&self, game_id: Uuid, event: &GameEvent) -> anyhow::Result<()> {
        tracing::info!(%game_id, event = %describe(event), "push to game");
        Ok(())
    }
}

fn describe(event: &GameEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| format!("{event:?}"))
}

/// Publish to a game's group without blocking the caller.
pub(crate) fn publish_to_game(notifier: &Arc<dyn Notifier>, game_id: Uuid, event: GameEvent) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.send_to_game(game_id, &event).await {
            tracing::warn!(%game_id, error = %e, "failed to push game event");
        }
    });
}

/// Publish to a single player's connection without blocking the caller.
pub(crate) fn publish_to_player(notifier: &Arc<dyn Notifier>, player: PlayerId, event: GameEvent) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.send_to_player(player, &event).await {
            tracing::warn!(%player, error = %e, "failed to push player event");
        }
    });
}
