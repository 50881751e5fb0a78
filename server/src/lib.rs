// SPDX-License-Identifier: MIT OR Apache-2.0

//! Baduk Server - Game Session Actors and Matchmaking
//!
//! This crate hosts the concurrent half of the backend:
//! - One single-writer session actor per game, owning its `Game` document
//! - A self-rescheduling turn timer per active game
//! - A registry activating sessions on first access and rebuilding them
//!   from persistence
//! - A FIFO matchmaking queue pairing compatible seek requests
//! - Trait seams for the player directory, push notifications and the
//!   game document store

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod matchmaking;
pub mod registry;
pub mod session;
pub mod store;
pub mod timer;

pub use config::ServerConfig;
pub use directory::{InMemoryDirectory, PlayerDirectory, PlayerInfo};
pub use error::SessionError;
pub use events::{GameEvent, LoggingNotifier, Notifier};
pub use matchmaking::{MatchOutcome, MatchRequest, Matchmaker};
pub use registry::GameRegistry;
pub use session::{GameSession, JoinOutcome, MoveOutcome};
pub use store::{GameStore, InMemoryStore};
pub use timer::TurnTimer;
