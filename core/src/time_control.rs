// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clock bookkeeping for increment and byo-yomi play
//!
//! Clocks are a pair of snapshots, one per color, replaced together on
//! every turn boundary and timeout check. Nothing here ticks: a snapshot
//! records when it was computed and how much time was left, and
//! [`ClockPair::recalculate`] derives the next pair from elapsed wall
//! time. Recalculating twice with the same `now` yields the same pair.

use crate::Color;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time control agreed at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    /// Main time per player, seconds
    pub main_time_secs: u32,
    /// Overtime mode once main time runs out
    pub overtime: Overtime,
}

/// Overtime mode. Increment and byo-yomi are mutually exclusive by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overtime {
    /// Sudden death after main time
    None,
    /// Fixed bonus credited for every completed move
    Increment { increment_secs: u32 },
    /// Fixed number of fixed-length periods after main time
    ByoYomi { periods: u8, period_secs: u32 },
}

impl TimeControl {
    /// Absolute clock with no overtime
    pub fn absolute(main_time_secs: u32) -> Self {
        Self {
            main_time_secs,
            overtime: Overtime::None,
        }
    }

    /// Fischer-style increment clock
    pub fn with_increment(main_time_secs: u32, increment_secs: u32) -> Self {
        Self {
            main_time_secs,
            overtime: Overtime::Increment { increment_secs },
        }
    }

    /// Byo-yomi clock
    pub fn with_byo_yomi(main_time_secs: u32, periods: u8, period_secs: u32) -> Self {
        Self {
            main_time_secs,
            overtime: Overtime::ByoYomi {
                periods,
                period_secs,
            },
        }
    }
}

/// One player's clock at a known instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTimeSnapshot {
    /// When this snapshot was computed
    pub at: DateTime<Utc>,
    /// Remaining main time in ms; holds the period countdown while
    /// byo-yomi is active
    pub main_time_ms: i64,
    /// Remaining byo-yomi periods, if the time control has any
    pub periods_left: Option<u8>,
    /// Whether the player has entered byo-yomi
    pub byo_yomi_active: bool,
    /// Whether this clock is currently counting down
    pub is_running: bool,
}

impl PlayerTimeSnapshot {
    /// Terminal out-of-time condition: no main time and no periods left.
    pub fn out_of_time(&self) -> bool {
        self.main_time_ms <= 0 && self.periods_left.map_or(true, |p| p == 0)
    }
}

/// Both players' snapshots. Always replaced as a unit so no caller can
/// observe a half-updated pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockPair {
    pub black: PlayerTimeSnapshot,
    pub white: PlayerTimeSnapshot,
}

impl ClockPair {
    /// Seed both clocks at game start with the first mover running.
    pub fn seed(tc: &TimeControl, first_mover: Color, now: DateTime<Utc>) -> Self {
        let base = PlayerTimeSnapshot {
            at: now,
            main_time_ms: tc.main_time_secs as i64 * 1000,
            periods_left: match tc.overtime {
                Overtime::ByoYomi { periods, .. } => Some(periods),
                _ => None,
            },
            byo_yomi_active: false,
            is_running: false,
        };
        let mut pair = Self {
            black: base,
            white: base,
        };
        pair.get_mut(first_mover).is_running = true;
        pair
    }

    /// Snapshot for a color
    pub fn get(&self, color: Color) -> &PlayerTimeSnapshot {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    fn get_mut(&mut self, color: Color) -> &mut PlayerTimeSnapshot {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    /// Color whose clock is counting down, if any
    pub fn running(&self) -> Option<Color> {
        if self.black.is_running {
            Some(Color::Black)
        } else if self.white.is_running {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Stop both clocks, keeping remaining times frozen.
    pub fn freeze(&mut self) {
        self.black.is_running = false;
        self.white.is_running = false;
    }

    /// Restart a frozen pair with `color` to move.
    pub fn resume(&mut self, color: Color, now: DateTime<Utc>) {
        self.black.at = now;
        self.white.at = now;
        self.black.is_running = false;
        self.white.is_running = false;
        self.get_mut(color).is_running = true;
    }

    /// Recompute both snapshots from elapsed wall time.
    ///
    /// The running player pays `now - at` against their remaining time;
    /// `next_active` holds the turn in the returned pair. A handover
    /// (`next_active` differs from the running color) credits the mover's
    /// increment, or restores a full byo-yomi period if the mover was in
    /// overtime. With main time exhausted the snapshot enters or
    /// continues byo-yomi; a fresh activation consumes no period, and a
    /// consumed final period leaves a terminal zero-time snapshot.
    ///
    /// If neither clock is running the pair is returned unchanged.
    pub fn recalculate(
        &self,
        tc: &TimeControl,
        next_active: Color,
        now: DateTime<Utc>,
    ) -> ClockPair {
        let Some(active) = self.running() else {
            return *self;
        };
        let snap = self.get(active);
        let elapsed = (now - snap.at).num_milliseconds().max(0);
        let remaining = snap.main_time_ms - elapsed;
        let handover = next_active != active;

        let mut updated = *snap;
        updated.at = now;

        if remaining > 0 {
            updated.main_time_ms = match (snap.byo_yomi_active, tc.overtime) {
                // A completed move within a period restores it in full;
                // a same-player recheck keeps the remainder.
                (true, Overtime::ByoYomi { period_secs, .. }) if handover => {
                    period_secs as i64 * 1000
                }
                (false, Overtime::Increment { increment_secs }) if handover => {
                    remaining + increment_secs as i64 * 1000
                }
                _ => remaining,
            };
        } else {
            match tc.overtime {
                Overtime::ByoYomi {
                    periods,
                    period_secs,
                } => {
                    let left = if snap.byo_yomi_active {
                        snap.periods_left.unwrap_or(0).saturating_sub(1)
                    } else {
                        periods
                    };
                    updated.periods_left = Some(left);
                    updated.byo_yomi_active = true;
                    updated.main_time_ms = if left == 0 {
                        0
                    } else {
                        period_secs as i64 * 1000
                    };
                }
                _ => {
                    updated.main_time_ms = 0;
                }
            }
        }

        let mut frozen = *self.get(active.opposite());
        frozen.at = now;

        let mut pair = match active {
            Color::Black => ClockPair {
                black: updated,
                white: frozen,
            },
            Color::White => ClockPair {
                black: frozen,
                white: updated,
            },
        };
        pair.get_mut(next_active).is_running = true;
        pair.get_mut(next_active.opposite()).is_running = false;
        pair
    }
}
