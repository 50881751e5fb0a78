// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session error taxonomy
//!
//! Illegal board moves are not errors: the engine reports them as a
//! rejected-move flag and the game stays untouched. Everything here is
//! either a recoverable usage error the transport layer maps to a
//! user-visible rejection, or an internal invariant break that aborts the
//! operation.

use baduk_core::GameStatus;
use thiserror::Error;

/// Errors returned by session, registry and matchmaking operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operation is not allowed in the game's current lifecycle state
    #[error("operation not allowed while game is {0:?}")]
    InvalidState(GameStatus),

    /// A move or scoring action from the player not holding the turn
    #[error("not this player's turn")]
    NotYourTurn,

    /// The caller is not one of the two seated players
    #[error("player is not a participant of this game")]
    NotAParticipant,

    /// A third player tried to take a seat
    #[error("game already has two players")]
    GameFull,

    /// No game with that id in the registry or the store
    #[error("game not found")]
    GameNotFound,

    /// Programming-error class; the operation is aborted rather than
    /// risking corrupted game state
    #[error("internal invariant violated: {0}")]
    Internal(String),
}
