// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Game` aggregate
//!
//! One document per game, owned by its session actor and persisted as-is.
//! The board lives here in denormalized form (flat grid + prisoners + ko
//! point) so an actor can be rebuilt from the document alone, never from
//! replaying move history.

use crate::board::{BoardState, Prisoners};
use crate::time_control::{ClockPair, TimeControl};
use crate::{Color, Coord, Move};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Player identifier issued by the account system.
pub type PlayerId = Uuid;

/// Game lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Created, waiting for the second player
    WaitingForStart,
    /// Live play
    Playing,
    /// Both players passed; dead stones under negotiation
    ScoreCalculation,
    /// Suspended by the host layer (installed only via reset)
    Paused,
    /// Terminal
    Ended,
}

/// Whether the game counts toward ratings. No behavioral difference in
/// the core; carried for the rating boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    Ranked,
    Casual,
}

/// One entry of the move history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mv: Move,
    pub color: Color,
    pub at: DateTime<Utc>,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Scored after both players accepted the dead-stone state
    Score,
    /// A player resigned
    Resign,
    /// The active player ran out of time
    Timeout,
}

/// Final result stamped when a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// `None` on a drawn score
    pub winner: Option<Color>,
    /// Black's total; 0 unless the game was scored
    pub black_score: f32,
    /// White's total; 0 unless the game was scored
    pub white_score: f32,
    pub reason: EndReason,
}

/// Score acceptance flags, cleared by every dead-stone edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAcceptance {
    pub black: bool,
    pub white: bool,
}

impl ScoreAcceptance {
    pub fn accept(&mut self, color: Color) {
        match color {
            Color::Black => self.black = true,
            Color::White => self.white = true,
        }
    }

    pub fn both(&self) -> bool {
        self.black && self.white
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Aggregate root for one game. Mutated only by its session actor;
/// snapshots handed to callers are clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub board_size: u8,
    pub game_type: GameType,
    pub time_control: TimeControl,
    pub komi: f32,
    pub status: GameStatus,
    /// Player holding Black, assigned at creation or join
    pub black: Option<PlayerId>,
    /// Player holding White
    pub white: Option<PlayerId>,
    pub current_turn: Color,
    pub moves: Vec<MoveRecord>,
    /// Row-major stone map, the persisted board projection
    pub grid: Vec<Option<Color>>,
    pub prisoners: Prisoners,
    pub ko_point: Option<Coord>,
    pub consecutive_passes: u8,
    pub dead_stones: HashSet<Coord>,
    pub score_acceptance: ScoreAcceptance,
    /// Present once the game has started
    pub clocks: Option<ClockPair>,
    pub result: Option<GameResult>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Create a game waiting for its second player.
    pub fn new(
        id: Uuid,
        board_size: u8,
        time_control: TimeControl,
        creator: PlayerId,
        creator_color: Color,
        game_type: GameType,
        now: DateTime<Utc>,
    ) -> Self {
        let cells = (board_size as usize) * (board_size as usize);
        let (black, white) = match creator_color {
            Color::Black => (Some(creator), None),
            Color::White => (None, Some(creator)),
        };
        Self {
            id,
            board_size,
            game_type,
            time_control,
            komi: crate::DEFAULT_KOMI,
            status: GameStatus::WaitingForStart,
            black,
            white,
            current_turn: Color::Black,
            moves: Vec::new(),
            grid: vec![None; cells],
            prisoners: Prisoners::default(),
            ko_point: None,
            consecutive_passes: 0,
            dead_stones: HashSet::new(),
            score_acceptance: ScoreAcceptance::default(),
            clocks: None,
            result: None,
            created_at: now,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.black == Some(player) || self.white == Some(player)
    }

    /// Color a participant holds
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if self.black == Some(player) {
            Some(Color::Black)
        } else if self.white == Some(player) {
            Some(Color::White)
        } else {
            None
        }
    }

    pub fn player(&self, color: Color) -> Option<PlayerId> {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.color_of(player)
            .and_then(|color| self.player(color.opposite()))
    }

    /// Denormalize engine state into the persisted projection.
    pub fn apply_board(&mut self, board: &BoardState) {
        self.grid = board.grid();
        self.prisoners = board.prisoners();
        self.ko_point = board.ko_point();
    }

    /// Rebuild the live engine state from the persisted projection.
    pub fn board(&self) -> BoardState {
        BoardState::restore(self.board_size, &self.grid, self.prisoners, self.ko_point)
    }
}
