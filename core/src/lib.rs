// SPDX-License-Identifier: MIT OR Apache-2.0

//! Baduk Core - Game Rules and Board Logic
//!
//! This crate provides the pure game functionality of the backend:
//! - Go board representation with cluster/liberty tracking
//! - Capture, ko and suicide rule enforcement
//! - Territory scoring at game end
//! - Per-player clock recalculation for increment and byo-yomi play
//! - The `Game` aggregate persisted by the service layer

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;
pub mod game;
pub mod scoring;
pub mod time_control;

use serde::{Deserialize, Serialize};

/// Komi applied to White under the fixed area-scoring rule.
pub const DEFAULT_KOMI: f32 = 6.5;

/// Player color in a Go game (Black or White)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Black player (traditionally goes first)
    Black,
    /// White player
    White,
}

impl Color {
    /// Returns the opposite color
    pub fn opposite(&self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Board coordinate representing a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column)
    pub x: u8,
    /// Y coordinate (row)
    pub y: u8,
}

impl Coord {
    /// Create a new coordinate
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Check if coordinate is valid for a board of given size
    pub fn is_valid(&self, board_size: u8) -> bool {
        self.x < board_size && self.y < board_size
    }

    /// Row-major index into a flat board vector
    pub fn index(&self, board_size: u8) -> usize {
        (self.y as usize) * (board_size as usize) + (self.x as usize)
    }

    /// In-bounds neighbors in the four cardinal directions
    pub fn neighbors(&self, board_size: u8) -> Vec<Coord> {
        let mut result = Vec::with_capacity(4);

        if self.y > 0 {
            result.push(Coord::new(self.x, self.y - 1));
        }
        if self.y + 1 < board_size {
            result.push(Coord::new(self.x, self.y + 1));
        }
        if self.x > 0 {
            result.push(Coord::new(self.x - 1, self.y));
        }
        if self.x + 1 < board_size {
            result.push(Coord::new(self.x + 1, self.y));
        }

        result
    }
}

/// Represents a move in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Place a stone at the specified coordinate
    Place(Coord),
    /// Pass the turn
    Pass,
}

pub use board::{BoardState, Cluster, Prisoners};
pub use game::{
    EndReason, Game, GameResult, GameStatus, GameType, MoveRecord, PlayerId, ScoreAcceptance,
};
pub use scoring::{score_game, ScoreOutcome, ScoreTally};
pub use time_control::{ClockPair, Overtime, PlayerTimeSnapshot, TimeControl};
