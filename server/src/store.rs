// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game document persistence seam
//!
//! One operation pair: replace-or-insert by id, load by id. The registry
//! calls these at activation and deactivation boundaries; the in-memory
//! actor stays the single writer while it is live.

use async_trait::async_trait;
use baduk_core::Game;
use dashmap::DashMap;
use uuid::Uuid;

/// Durable storage of `Game` documents.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Replace-or-insert the document keyed by its id.
    async fn upsert(&self, game: &Game) -> anyhow::Result<()>;

    /// Load the document, if present.
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Game>>;
}

/// Map-backed store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryStore {
    games: DashMap<Uuid, Game>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn upsert(&self, game: &Game) -> anyhow::Result<()> {
        self.games.insert(game.id, game.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> anyhow::Result<Option<Game>> {
        Ok(self.games.get(&id).map(|entry| entry.value().clone()))
    }
}
