// SPDX-License-Identifier: MIT OR Apache-2.0

//! Player-info lookup seam
//!
//! The backend consumes display names and ratings; the account system
//! behind this trait owns them. Ratings arrive as plain numbers here,
//! rating math happens elsewhere.

use async_trait::async_trait;
use baduk_core::PlayerId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Public profile of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub display_name: String,
    pub rating: f64,
}

/// Lookup of player profiles by id.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn lookup(&self, player: PlayerId) -> anyhow::Result<Option<PlayerInfo>>;
}

/// Map-backed directory for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryDirectory {
    players: DashMap<PlayerId, PlayerInfo>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, info: PlayerInfo) {
        self.players.insert(info.id, info);
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryDirectory {
    async fn lookup(&self, player: PlayerId) -> anyhow::Result<Option<PlayerInfo>> {
        Ok(self.players.get(&player).map(|entry| entry.value().clone()))
    }
}
