// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared harness for the server integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use baduk_core::{Game, GameStatus, GameType, PlayerId, TimeControl};
use baduk_server::{
    GameEvent, GameRegistry, GameSession, InMemoryDirectory, InMemoryStore, Notifier, PlayerInfo,
    ServerConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Notifier capturing every published event for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub player_events: Mutex<Vec<(PlayerId, GameEvent)>>,
    pub game_events: Mutex<Vec<(Uuid, GameEvent)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_to_player(&self, player: PlayerId, event: &GameEvent) -> anyhow::Result<()> {
        self.player_events
            .lock()
            .unwrap()
            .push((player, event.clone()));
        Ok(())
    }

    async fn send_to_game(&self, game_id: Uuid, event: &GameEvent) -> anyhow::Result<()> {
        self.game_events
            .lock()
            .unwrap()
            .push((game_id, event.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub registry: Arc<GameRegistry>,
    pub store: Arc<InMemoryStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub notifier: Arc<RecordingNotifier>,
}

pub struct StartedGame {
    pub session: GameSession,
    pub id: Uuid,
    pub black: PlayerId,
    pub white: PlayerId,
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let registry = Arc::new(GameRegistry::new(
        store.clone(),
        directory.clone(),
        notifier.clone(),
        ServerConfig::default(),
    ));
    Harness {
        registry,
        store,
        directory,
        notifier,
    }
}

impl Harness {
    /// Register a player in the directory and return their id.
    pub fn player(&self, name: &str) -> PlayerId {
        let id = Uuid::new_v4();
        self.directory.insert(PlayerInfo {
            id,
            display_name: name.to_string(),
            rating: 1500.0,
        });
        id
    }

    /// Create a 9x9 game, join the second player and return the running
    /// session with the color assignment.
    pub async fn started_game(&self, time_control: TimeControl) -> StartedGame {
        let creator = self.player("creator");
        let joiner = self.player("joiner");
        let id = self
            .registry
            .create_game(9, time_control, creator, GameType::Casual)
            .await
            .expect("create game");
        let session = self.registry.session(id).await.expect("session");
        let outcome = session.join(joiner).await.expect("join");
        assert!(outcome.just_joined);

        StartedGame {
            session,
            id,
            black: outcome.game.black.expect("black seat"),
            white: outcome.game.white.expect("white seat"),
        }
    }
}

/// Poll until the game reaches `Ended`.
pub async fn wait_until_ended(session: &GameSession) -> Game {
    for _ in 0..200 {
        let game = session.game().await.expect("snapshot");
        if game.status == GameStatus::Ended {
            return game;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("game did not end in time");
}
