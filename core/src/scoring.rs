// SPDX-License-Identifier: MIT OR Apache-2.0

//! Final scoring under the fixed area rule
//!
//! Dead-marked clusters are lifted from a working copy of the board, each
//! empty region is flood filled once, and a region bordered by exactly one
//! color scores a point per cell to that color. Score = territory + live
//! stones, komi to White. Higher total wins; equal totals draw.

use crate::board::BoardState;
use crate::{Color, Coord};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Per-color totals of a scored game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTally {
    /// Surrounded empty points
    pub territory: u16,
    /// Live stones on the board after dead-stone removal
    pub stones: u16,
    /// territory + stones, plus komi for White
    pub total: f32,
}

/// Outcome of scoring a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub black: ScoreTally,
    pub white: ScoreTally,
    /// `None` on equal totals
    pub winner: Option<Color>,
}

/// Score a finished position.
///
/// Every cluster containing a dead-marked position is removed before
/// territory is counted, so a single mark suffices for a whole group.
pub fn score_game(board: &BoardState, dead_marks: &HashSet<Coord>, komi: f32) -> ScoreOutcome {
    let size = board.size();
    let mut grid = board.grid();

    for mark in dead_marks {
        if let Some(cluster) = board.cluster_at(*mark) {
            for member in cluster.members() {
                grid[member.index(size)] = None;
            }
        }
    }

    let mut territory_black = 0u16;
    let mut territory_white = 0u16;
    let mut seen = HashSet::<Coord>::new();

    for y in 0..size {
        for x in 0..size {
            let coord = Coord::new(x, y);
            if grid[coord.index(size)].is_some() || seen.contains(&coord) {
                continue;
            }
            let (region, borders) = region_and_borders(&grid, size, coord, &mut seen);
            if borders.len() == 1 {
                match borders.iter().next() {
                    Some(Color::Black) => territory_black += region.len() as u16,
                    Some(Color::White) => territory_white += region.len() as u16,
                    None => {}
                }
            }
            // Two-plus border colors: dame, no points for anyone.
        }
    }

    let stones_black = grid.iter().filter(|c| **c == Some(Color::Black)).count() as u16;
    let stones_white = grid.iter().filter(|c| **c == Some(Color::White)).count() as u16;

    let total_black = territory_black as f32 + stones_black as f32;
    let total_white = territory_white as f32 + stones_white as f32 + komi;

    let winner = if total_black > total_white {
        Some(Color::Black)
    } else if total_white > total_black {
        Some(Color::White)
    } else {
        None
    };

    ScoreOutcome {
        black: ScoreTally {
            territory: territory_black,
            stones: stones_black,
            total: total_black,
        },
        white: ScoreTally {
            territory: territory_white,
            stones: stones_white,
            total: total_white,
        },
        winner,
    }
}

/// BFS over empty points; returns (region coords, bordering stone colors).
/// `global_seen` memoizes classified positions so a later seed inside an
/// already-filled region never re-floods it.
fn region_and_borders(
    grid: &[Option<Color>],
    size: u8,
    start: Coord,
    global_seen: &mut HashSet<Coord>,
) -> (HashSet<Coord>, HashSet<Color>) {
    let mut queue = VecDeque::from([start]);
    let mut region = HashSet::from([start]);
    let mut borders = HashSet::<Color>::new();
    global_seen.insert(start);

    while let Some(coord) = queue.pop_front() {
        for n in coord.neighbors(size) {
            match grid[n.index(size)] {
                Some(color) => {
                    borders.insert(color);
                }
                None => {
                    if global_seen.insert(n) {
                        region.insert(n);
                        queue.push_back(n);
                    }
                }
            }
        }
    }

    (region, borders)
}
