// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game registry: the virtual-actor host
//!
//! Maps game id to its live session handle. Sessions are created on
//! first access: a miss loads the persisted document and rebuilds the
//! actor from it (board from the grid projection, timer from the running
//! clock snapshot). Deactivation shuts the actor down and writes the
//! final document back. While a session is live it is the single writer
//! for its game; the store is only touched at these boundaries.

use crate::config::ServerConfig;
use crate::directory::PlayerDirectory;
use crate::error::SessionError;
use crate::events::Notifier;
use crate::session::GameSession;
use crate::store::GameStore;
use baduk_core::{Color, Game, GameType, PlayerId, TimeControl};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

pub struct GameRegistry {
    sessions: DashMap<Uuid, GameSession>,
    store: Arc<dyn GameStore>,
    directory: Arc<dyn PlayerDirectory>,
    notifier: Arc<dyn Notifier>,
    config: ServerConfig,
}

impl GameRegistry {
    pub fn new(
        store: Arc<dyn GameStore>,
        directory: Arc<dyn PlayerDirectory>,
        notifier: Arc<dyn Notifier>,
        config: ServerConfig,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            directory,
            notifier,
            config,
        }
    }

    /// Create a game with the creator seated on a random color and spawn
    /// its session. Returns the new game id.
    pub async fn create_game(
        &self,
        board_size: u8,
        time_control: TimeControl,
        creator: PlayerId,
        game_type: GameType,
    ) -> Result<Uuid, SessionError> {
        let id = Uuid::new_v4();
        let creator_color = if rand::thread_rng().gen() {
            Color::Black
        } else {
            Color::White
        };
        let mut game = Game::new(
            id,
            board_size,
            time_control,
            creator,
            creator_color,
            game_type,
            Utc::now(),
        );
        game.komi = self.config.komi;

        if let Err(e) = self.store.upsert(&game).await {
            tracing::warn!(game_id = %id, error = %e, "failed to persist new game");
        }

        let session = self.spawn(game);
        self.sessions.insert(id, session);
        tracing::info!(game_id = %id, %creator, ?creator_color, "game created");
        Ok(id)
    }

    /// Handle for a game, activating the session from the store on a
    /// miss.
    pub async fn session(&self, id: Uuid) -> Result<GameSession, SessionError> {
        if let Some(session) = self.sessions.get(&id) {
            return Ok(session.value().clone());
        }

        let game = self
            .store
            .load(id)
            .await
            .map_err(|e| SessionError::Internal(format!("store load failed: {e}")))?
            .ok_or(SessionError::GameNotFound)?;

        // Another caller may have activated the game while we were
        // loading; the first insert wins.
        match self.sessions.entry(id) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(vacant) => {
                tracing::debug!(game_id = %id, "session reactivated from store");
                let session = self.spawn(game);
                vacant.insert(session.clone());
                Ok(session)
            }
        }
    }

    /// Shut a session down and write its final document back. A game
    /// with no live session is left as stored.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), SessionError> {
        let Some((_, session)) = self.sessions.remove(&id) else {
            return Ok(());
        };
        let game = session.shutdown().await?;
        if let Err(e) = self.store.upsert(&game).await {
            tracing::warn!(game_id = %id, error = %e, "failed to persist deactivated game");
        }
        Ok(())
    }

    /// Force-overwrite a game's actor state from an externally supplied
    /// document, spawning the session if none is live.
    pub async fn reset_game(&self, game: Game) -> Result<(), SessionError> {
        let id = game.id;
        let existing = self.sessions.get(&id).map(|s| s.value().clone());
        if let Some(session) = existing {
            return session.reset(game).await;
        }
        match self.sessions.entry(id) {
            Entry::Occupied(entry) => {
                let session = entry.get().clone();
                drop(entry);
                session.reset(game).await
            }
            Entry::Vacant(vacant) => {
                vacant.insert(self.spawn(game));
                Ok(())
            }
        }
    }

    fn spawn(&self, game: Game) -> GameSession {
        GameSession::spawn(
            game,
            Arc::clone(&self.directory),
            Arc::clone(&self.notifier),
            self.config.session_mailbox,
        )
    }
}
