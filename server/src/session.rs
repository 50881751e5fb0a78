// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game session actor
//!
//! One single-writer task per game. All mutation of the `Game` document
//! and its live board flows through the mailbox, so a move and a
//! concurrent timeout are applied in receipt order: each handler
//! re-validates lifecycle state, participancy and turn ownership against
//! current state before touching anything, and the loser of a race fails
//! its precondition instead of double-applying. Handlers finish all
//! mutation before anything asynchronous happens; notifications are
//! spawned fire-and-forget.

use crate::directory::{PlayerDirectory, PlayerInfo};
use crate::error::SessionError;
use crate::events::{publish_to_game, GameEvent, Notifier};
use crate::timer::TurnTimer;
use baduk_core::{
    BoardState, ClockPair, Color, Coord, EndReason, Game, GameResult, GameStatus, Move, MoveRecord,
    PlayerId, PlayerTimeSnapshot,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Result of a join call.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub game: Game,
    /// Profile of the other seated player, if any
    pub opponent: Option<PlayerInfo>,
    /// False when an already-seated player rejoined
    pub just_joined: bool,
}

/// Result of a move submission.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// False for an illegal move; the game is then unchanged
    pub accepted: bool,
    pub game: Game,
}

pub(crate) enum SessionCommand {
    Join {
        player: PlayerId,
        reply: oneshot::Sender<Result<JoinOutcome, SessionError>>,
    },
    Move {
        player: PlayerId,
        mv: Move,
        reply: oneshot::Sender<Result<MoveOutcome, SessionError>>,
    },
    Resign {
        player: PlayerId,
        reply: oneshot::Sender<Result<Game, SessionError>>,
    },
    Continue {
        player: PlayerId,
        reply: oneshot::Sender<Result<Game, SessionError>>,
    },
    AcceptScores {
        player: PlayerId,
        reply: oneshot::Sender<Result<Game, SessionError>>,
    },
    EditDeadStone {
        player: PlayerId,
        position: Coord,
        alive: bool,
        reply: oneshot::Sender<Result<Game, SessionError>>,
    },
    Timeout {
        reply: oneshot::Sender<Result<PlayerTimeSnapshot, SessionError>>,
    },
    Get {
        reply: oneshot::Sender<Game>,
    },
    Reset {
        game: Box<Game>,
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<Box<Game>>,
    },
}

/// Cloneable handle to one game's session actor.
#[derive(Clone)]
pub struct GameSession {
    tx: mpsc::Sender<SessionCommand>,
}

impl GameSession {
    /// Spawn the actor (and its paired turn timer) around a game
    /// document. For a game loaded mid-play the timer is re-armed from
    /// the running clock snapshot.
    pub fn spawn(
        game: Game,
        directory: Arc<dyn PlayerDirectory>,
        notifier: Arc<dyn Notifier>,
        mailbox: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(mailbox);
        let timer = TurnTimer::spawn(game.id, tx.clone());
        let actor = SessionActor {
            board: game.board(),
            game,
            timer,
            directory,
            notifier,
        };
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    async fn send<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::Internal("session actor terminated".into()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Internal("session dropped its reply".into()))
    }

    /// Take the open seat, or rejoin idempotently.
    pub async fn join(&self, player: PlayerId) -> Result<JoinOutcome, SessionError> {
        self.send(|reply| SessionCommand::Join { player, reply })
            .await?
    }

    /// Submit a placement or a pass.
    pub async fn make_move(&self, mv: Move, player: PlayerId) -> Result<MoveOutcome, SessionError> {
        self.send(|reply| SessionCommand::Move { player, mv, reply })
            .await?
    }

    /// Resign unconditionally; the opponent wins.
    pub async fn resign(&self, player: PlayerId) -> Result<Game, SessionError> {
        self.send(|reply| SessionCommand::Resign { player, reply })
            .await?
    }

    /// Dispute scoring and return to live play.
    pub async fn continue_game(&self, player: PlayerId) -> Result<Game, SessionError> {
        self.send(|reply| SessionCommand::Continue { player, reply })
            .await?
    }

    /// Accept the current dead-stone state; the game ends when both
    /// players have accepted it.
    pub async fn accept_scores(&self, player: PlayerId) -> Result<Game, SessionError> {
        self.send(|reply| SessionCommand::AcceptScores { player, reply })
            .await?
    }

    /// Mark a group dead or alive during scoring.
    pub async fn edit_dead_stone(
        &self,
        position: Coord,
        alive: bool,
        player: PlayerId,
    ) -> Result<Game, SessionError> {
        self.send(|reply| SessionCommand::EditDeadStone {
            player,
            position,
            alive,
            reply,
        })
        .await?
    }

    /// Timer-only entry: check the active clock, ending the game on true
    /// expiry. Returns the recalculated snapshot of the active player.
    pub async fn timeout_current_player(&self) -> Result<PlayerTimeSnapshot, SessionError> {
        self.send(|reply| SessionCommand::Timeout { reply }).await?
    }

    /// Snapshot of the game; always succeeds while the actor lives.
    pub async fn game(&self) -> Result<Game, SessionError> {
        self.send(|reply| SessionCommand::Get { reply }).await
    }

    /// Force-overwrite actor state from an externally supplied game,
    /// for recovery after reactivation drift.
    pub async fn reset(&self, game: Game) -> Result<(), SessionError> {
        self.send(|reply| SessionCommand::Reset {
            game: Box::new(game),
            reply,
        })
        .await
    }

    /// Stop the actor, returning the final document for persistence.
    pub async fn shutdown(&self) -> Result<Game, SessionError> {
        self.send(|reply| SessionCommand::Shutdown { reply })
            .await
            .map(|game| *game)
    }
}

struct SessionActor {
    game: Game,
    board: BoardState,
    timer: TurnTimer,
    directory: Arc<dyn PlayerDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl SessionActor {
    async fn run(mut self, mut rx: mpsc::Receiver<SessionCommand>) {
        self.rearm_timer();

        while let Some(cmd) = rx.recv().await {
            match cmd {
                SessionCommand::Join { player, reply } => {
                    let result = self.handle_join(player).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Move { player, mv, reply } => {
                    let _ = reply.send(self.handle_move(player, mv));
                }
                SessionCommand::Resign { player, reply } => {
                    let _ = reply.send(self.handle_resign(player));
                }
                SessionCommand::Continue { player, reply } => {
                    let _ = reply.send(self.handle_continue(player));
                }
                SessionCommand::AcceptScores { player, reply } => {
                    let _ = reply.send(self.handle_accept_scores(player));
                }
                SessionCommand::EditDeadStone {
                    player,
                    position,
                    alive,
                    reply,
                } => {
                    let _ = reply.send(self.handle_edit_dead_stone(player, position, alive));
                }
                SessionCommand::Timeout { reply } => {
                    let _ = reply.send(self.handle_timeout());
                }
                SessionCommand::Get { reply } => {
                    let _ = reply.send(self.game.clone());
                }
                SessionCommand::Reset { game, reply } => {
                    self.handle_reset(*game);
                    let _ = reply.send(());
                }
                SessionCommand::Shutdown { reply } => {
                    self.timer.stop();
                    let _ = reply.send(Box::new(self.game.clone()));
                    break;
                }
            }
        }

        tracing::debug!(game_id = %self.game.id, "session actor stopped");
    }

    async fn handle_join(&mut self, player: PlayerId) -> Result<JoinOutcome, SessionError> {
        if self.game.is_participant(player) {
            let opponent = self.lookup_opponent(player).await;
            return Ok(JoinOutcome {
                game: self.game.clone(),
                opponent,
                just_joined: false,
            });
        }
        if self.game.status != GameStatus::WaitingForStart {
            return Err(SessionError::InvalidState(self.game.status));
        }

        let seat = if self.game.black.is_none() {
            Color::Black
        } else if self.game.white.is_none() {
            Color::White
        } else {
            return Err(SessionError::GameFull);
        };
        match seat {
            Color::Black => self.game.black = Some(player),
            Color::White => self.game.white = Some(player),
        }

        // Second seat taken: the game starts and Black's clock runs.
        let now = Utc::now();
        let first_mover = Color::Black;
        let clocks = ClockPair::seed(&self.game.time_control, first_mover, now);
        self.game.status = GameStatus::Playing;
        self.game.started_at = Some(now);
        self.game.current_turn = first_mover;
        self.game.clocks = Some(clocks);
        self.timer
            .start(Duration::from_millis(clocks.get(first_mover).main_time_ms.max(0) as u64));

        tracing::info!(game_id = %self.game.id, %player, "game started");
        if let (Some(black), Some(white)) = (self.game.black, self.game.white) {
            self.publish(GameEvent::GameStarted { black, white });
        }

        let opponent = self.lookup_opponent(player).await;
        Ok(JoinOutcome {
            game: self.game.clone(),
            opponent,
            just_joined: true,
        })
    }

    fn handle_move(&mut self, player: PlayerId, mv: Move) -> Result<MoveOutcome, SessionError> {
        if self.game.status != GameStatus::Playing {
            return Err(SessionError::InvalidState(self.game.status));
        }
        let color = self
            .game
            .color_of(player)
            .ok_or(SessionError::NotAParticipant)?;
        if color != self.game.current_turn {
            return Err(SessionError::NotYourTurn);
        }
        let clocks = self
            .game
            .clocks
            .ok_or_else(|| SessionError::Internal("clocks missing during play".into()))?;
        if clocks.running().is_none() {
            return Err(SessionError::Internal("no running clock during play".into()));
        }

        let now = Utc::now();
        match mv {
            Move::Place(coord) => {
                if !self.board.play(coord, color) {
                    return Ok(MoveOutcome {
                        accepted: false,
                        game: self.game.clone(),
                    });
                }
                self.game.apply_board(&self.board);
                self.game.consecutive_passes = 0;
            }
            Move::Pass => {
                self.game.consecutive_passes += 1;
            }
        }
        self.game.moves.push(MoveRecord { mv, color, at: now });

        let next = color.opposite();
        let recalculated = clocks.recalculate(&self.game.time_control, next, now);
        self.game.current_turn = next;

        if mv == Move::Pass && self.game.consecutive_passes >= 2 {
            // Second consecutive pass: negotiation phase, clocks frozen.
            let mut frozen = recalculated;
            frozen.freeze();
            self.game.clocks = Some(frozen);
            self.game.status = GameStatus::ScoreCalculation;
            self.game.score_acceptance.clear();
            self.timer.stop();
            tracing::info!(game_id = %self.game.id, "entering score calculation");
            self.publish(GameEvent::ScoringStarted);
        } else {
            self.game.clocks = Some(recalculated);
            let remaining = recalculated.get(next).main_time_ms.max(0) as u64;
            self.timer.restart(Duration::from_millis(remaining));
            self.publish(GameEvent::MoveMade {
                color,
                mv,
                move_number: self.game.moves.len() as u32,
            });
        }

        Ok(MoveOutcome {
            accepted: true,
            game: self.game.clone(),
        })
    }

    fn handle_resign(&mut self, player: PlayerId) -> Result<Game, SessionError> {
        match self.game.status {
            GameStatus::Playing | GameStatus::ScoreCalculation => {}
            status => return Err(SessionError::InvalidState(status)),
        }
        let color = self
            .game
            .color_of(player)
            .ok_or(SessionError::NotAParticipant)?;

        self.end_game(Some(color.opposite()), 0.0, 0.0, EndReason::Resign);
        Ok(self.game.clone())
    }

    fn handle_continue(&mut self, player: PlayerId) -> Result<Game, SessionError> {
        if self.game.status != GameStatus::ScoreCalculation {
            return Err(SessionError::InvalidState(self.game.status));
        }
        if !self.game.is_participant(player) {
            return Err(SessionError::NotAParticipant);
        }

        let now = Utc::now();
        self.game.status = GameStatus::Playing;
        self.game.consecutive_passes = 0;
        self.game.dead_stones.clear();
        self.game.score_acceptance.clear();
        if let Some(clocks) = &mut self.game.clocks {
            clocks.resume(self.game.current_turn, now);
            let remaining = clocks.get(self.game.current_turn).main_time_ms.max(0) as u64;
            self.timer.start(Duration::from_millis(remaining));
        }

        tracing::info!(game_id = %self.game.id, %player, "scoring disputed, play resumed");
        self.publish(GameEvent::GameResumed);
        Ok(self.game.clone())
    }

    fn handle_accept_scores(&mut self, player: PlayerId) -> Result<Game, SessionError> {
        if self.game.status != GameStatus::ScoreCalculation {
            return Err(SessionError::InvalidState(self.game.status));
        }
        let color = self
            .game
            .color_of(player)
            .ok_or(SessionError::NotAParticipant)?;

        self.game.score_acceptance.accept(color);
        self.publish(GameEvent::ScoresAccepted { color });

        if self.game.score_acceptance.both() {
            let outcome =
                baduk_core::score_game(&self.board, &self.game.dead_stones, self.game.komi);
            self.end_game(
                outcome.winner,
                outcome.black.total,
                outcome.white.total,
                EndReason::Score,
            );
        }
        Ok(self.game.clone())
    }

    fn handle_edit_dead_stone(
        &mut self,
        player: PlayerId,
        position: Coord,
        alive: bool,
    ) -> Result<Game, SessionError> {
        if self.game.status != GameStatus::ScoreCalculation {
            return Err(SessionError::InvalidState(self.game.status));
        }
        if !self.game.is_participant(player) {
            return Err(SessionError::NotAParticipant);
        }

        // Marks toggle the whole connected group; an empty point is a
        // no-op that keeps prior acceptances intact.
        let Some(cluster) = self.board.cluster_at(position) else {
            return Ok(self.game.clone());
        };
        for member in cluster.members() {
            if alive {
                self.game.dead_stones.remove(member);
            } else {
                self.game.dead_stones.insert(*member);
            }
        }

        // Any change voids what the other player agreed to.
        self.game.score_acceptance.clear();
        self.publish(GameEvent::DeadStoneEdited { position, alive });
        Ok(self.game.clone())
    }

    fn handle_timeout(&mut self) -> Result<PlayerTimeSnapshot, SessionError> {
        match self.game.status {
            GameStatus::Playing | GameStatus::ScoreCalculation => {}
            status => return Err(SessionError::InvalidState(status)),
        }
        let clocks = self
            .game
            .clocks
            .ok_or_else(|| SessionError::Internal("clocks missing during play".into()))?;
        let Some(active) = clocks.running() else {
            // Clocks already frozen: the timeout lost a race.
            return Err(SessionError::InvalidState(self.game.status));
        };

        let now = Utc::now();
        let recalculated = clocks.recalculate(&self.game.time_control, active, now);
        let snapshot = *recalculated.get(active);

        if snapshot.out_of_time() {
            let mut frozen = recalculated;
            frozen.freeze();
            self.game.clocks = Some(frozen);
            tracing::info!(game_id = %self.game.id, player = ?active, "flag fell");
            self.end_game(Some(active.opposite()), 0.0, 0.0, EndReason::Timeout);
            return Ok(*frozen.get(active));
        }

        // Byo-yomi period boundary, or a stale fire after a processed
        // move: commit the recalculation and let the timer re-arm for
        // the returned remainder.
        self.game.clocks = Some(recalculated);
        Ok(snapshot)
    }

    fn handle_reset(&mut self, game: Game) {
        tracing::warn!(game_id = %game.id, "actor state force-overwritten");
        self.timer.stop();
        self.board = game.board();
        self.game = game;
        self.rearm_timer();
    }

    /// Stamp the terminal state. Every path into `Ended` funnels here.
    fn end_game(&mut self, winner: Option<Color>, black_score: f32, white_score: f32, reason: EndReason) {
        let result = GameResult {
            winner,
            black_score,
            white_score,
            reason,
        };
        self.game.status = GameStatus::Ended;
        self.game.result = Some(result);
        self.game.ended_at = Some(Utc::now());
        if let Some(clocks) = &mut self.game.clocks {
            clocks.freeze();
        }
        self.timer.stop();
        tracing::info!(game_id = %self.game.id, ?winner, ?reason, "game ended");
        self.publish(GameEvent::GameEnded { result });
    }

    /// Re-arm the timer from the running snapshot, used on activation
    /// and reset. An already-expired clock fires immediately.
    fn rearm_timer(&self) {
        if !matches!(
            self.game.status,
            GameStatus::Playing | GameStatus::ScoreCalculation
        ) {
            return;
        }
        let Some(clocks) = &self.game.clocks else {
            return;
        };
        let Some(active) = clocks.running() else {
            return;
        };
        let snapshot = clocks.get(active);
        let elapsed = (Utc::now() - snapshot.at).num_milliseconds().max(0);
        let remaining = (snapshot.main_time_ms - elapsed).max(0) as u64;
        self.timer.start(Duration::from_millis(remaining));
    }

    fn publish(&self, event: GameEvent) {
        publish_to_game(&self.notifier, self.game.id, event);
    }

    async fn lookup_opponent(&self, player: PlayerId) -> Option<PlayerInfo> {
        let opponent = self.game.opponent_of(player)?;
        match self.directory.lookup(opponent).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(%opponent, error = %e, "player lookup failed");
                None
            }
        }
    }
}
