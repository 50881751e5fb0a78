// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use baduk_core::{Color, Coord, EndReason, GameStatus, Move, TimeControl};
use baduk_server::SessionError;
use common::*;
use std::time::Duration;
use uuid::Uuid;

fn slow() -> TimeControl {
    TimeControl::absolute(600)
}

#[tokio::test]
async fn second_join_starts_the_game() {
    let h = harness();
    let g = h.started_game(slow()).await;

    let game = g.session.game().await.unwrap();
    assert_eq!(game.status, GameStatus::Playing);
    assert!(game.started_at.is_some());
    assert_eq!(game.current_turn, Color::Black);

    let clocks = game.clocks.expect("clocks seeded");
    assert_eq!(clocks.running(), Some(Color::Black));
    assert_eq!(clocks.black.main_time_ms, 600_000);
}

#[tokio::test]
async fn rejoin_is_idempotent_and_third_player_rejected() {
    let h = harness();
    let g = h.started_game(slow()).await;

    let rejoin = g.session.join(g.white).await.unwrap();
    assert!(!rejoin.just_joined);
    let opponent = rejoin.opponent.expect("opponent profile");
    assert_eq!(opponent.id, g.black);

    let outsider = h.player("outsider");
    let denied = g.session.join(outsider).await;
    assert_eq!(denied.unwrap_err(), SessionError::InvalidState(GameStatus::Playing));
}

#[tokio::test]
async fn move_preconditions_are_enforced() {
    let h = harness();
    let g = h.started_game(slow()).await;

    // White does not hold the turn yet
    let wrong_turn = g.session.make_move(Move::Place(Coord::new(0, 0)), g.white).await;
    assert_eq!(wrong_turn.unwrap_err(), SessionError::NotYourTurn);

    // Strangers are rejected before turn order is even considered
    let stranger = g.session.make_move(Move::Pass, Uuid::new_v4()).await;
    assert_eq!(stranger.unwrap_err(), SessionError::NotAParticipant);

    let accepted = g
        .session
        .make_move(Move::Place(Coord::new(2, 2)), g.black)
        .await
        .unwrap();
    assert!(accepted.accepted);
    assert_eq!(accepted.game.moves.len(), 1);
    assert_eq!(accepted.game.current_turn, Color::White);
    assert_eq!(accepted.game.clocks.unwrap().running(), Some(Color::White));
}

#[tokio::test]
async fn illegal_move_leaves_board_and_clock_untouched() {
    let h = harness();
    let g = h.started_game(slow()).await;

    g.session
        .make_move(Move::Place(Coord::new(2, 2)), g.black)
        .await
        .unwrap();
    let before = g.session.game().await.unwrap();

    // Occupied point
    let rejected = g
        .session
        .make_move(Move::Place(Coord::new(2, 2)), g.white)
        .await
        .unwrap();
    assert!(!rejected.accepted);

    let after = g.session.game().await.unwrap();
    assert_eq!(after.grid, before.grid);
    assert_eq!(after.moves.len(), before.moves.len());
    assert_eq!(after.current_turn, Color::White);
    assert_eq!(after.clocks, before.clocks);
}

#[tokio::test]
async fn double_pass_enters_scoring_and_freezes_clocks() {
    let h = harness();
    let g = h.started_game(slow()).await;

    g.session.make_move(Move::Pass, g.black).await.unwrap();
    let second = g.session.make_move(Move::Pass, g.white).await.unwrap();

    assert_eq!(second.game.status, GameStatus::ScoreCalculation);
    assert_eq!(second.game.clocks.unwrap().running(), None);

    let denied = g.session.make_move(Move::Place(Coord::new(4, 4)), g.black).await;
    assert_eq!(
        denied.unwrap_err(),
        SessionError::InvalidState(GameStatus::ScoreCalculation)
    );
}

#[tokio::test]
async fn dead_stone_edits_void_prior_acceptance() {
    let h = harness();
    let g = h.started_game(slow()).await;

    g.session
        .make_move(Move::Place(Coord::new(0, 0)), g.black)
        .await
        .unwrap();
    g.session.make_move(Move::Pass, g.white).await.unwrap();
    g.session.make_move(Move::Pass, g.black).await.unwrap();

    let accepted = g.session.accept_scores(g.black).await.unwrap();
    assert!(accepted.score_acceptance.black);

    // Editing an empty point changes nothing
    let noop = g
        .session
        .edit_dead_stone(Coord::new(4, 4), false, g.white)
        .await
        .unwrap();
    assert!(noop.score_acceptance.black);

    // Marking the stone dead voids Black's acceptance
    let edited = g
        .session
        .edit_dead_stone(Coord::new(0, 0), false, g.white)
        .await
        .unwrap();
    assert!(!edited.score_acceptance.black);
    assert!(edited.dead_stones.contains(&Coord::new(0, 0)));

    // Both players re-accept: the lone black stone is scored as dead
    g.session.accept_scores(g.white).await.unwrap();
    let ended = g.session.accept_scores(g.black).await.unwrap();
    assert_eq!(ended.status, GameStatus::Ended);

    let result = ended.result.unwrap();
    assert_eq!(result.reason, EndReason::Score);
    assert_eq!(result.winner, Some(Color::White));
    assert_eq!(result.black_score, 0.0);
    assert_eq!(result.white_score, 6.5);
}

#[tokio::test]
async fn continue_game_reverts_scoring_on_dispute() {
    let h = harness();
    let g = h.started_game(slow()).await;

    g.session
        .make_move(Move::Place(Coord::new(0, 0)), g.black)
        .await
        .unwrap();
    g.session.make_move(Move::Pass, g.white).await.unwrap();
    g.session.make_move(Move::Pass, g.black).await.unwrap();
    let marked = g
        .session
        .edit_dead_stone(Coord::new(0, 0), false, g.white)
        .await
        .unwrap();
    assert!(!marked.dead_stones.is_empty());

    let resumed = g.session.continue_game(g.black).await.unwrap();
    assert_eq!(resumed.status, GameStatus::Playing);
    assert_eq!(resumed.consecutive_passes, 0);
    assert!(resumed.dead_stones.is_empty());
    assert_eq!(resumed.current_turn, Color::White);
    assert_eq!(resumed.clocks.unwrap().running(), Some(Color::White));

    // Play continues where the turn order left off
    let mv = g
        .session
        .make_move(Move::Place(Coord::new(3, 3)), g.white)
        .await
        .unwrap();
    assert!(mv.accepted);

    // Continue is only valid from scoring
    let denied = g.session.continue_game(g.black).await;
    assert_eq!(
        denied.unwrap_err(),
        SessionError::InvalidState(GameStatus::Playing)
    );
}

#[tokio::test]
async fn resign_ends_the_game_for_the_opponent() {
    let h = harness();
    let g = h.started_game(slow()).await;

    let ended = g.session.resign(g.black).await.unwrap();
    assert_eq!(ended.status, GameStatus::Ended);
    let result = ended.result.unwrap();
    assert_eq!(result.reason, EndReason::Resign);
    assert_eq!(result.winner, Some(Color::White));

    // Terminal state rejects every mutation, reads stay idempotent
    let denied = g.session.resign(g.white).await;
    assert_eq!(denied.unwrap_err(), SessionError::InvalidState(GameStatus::Ended));
    let denied = g.session.make_move(Move::Pass, g.white).await;
    assert_eq!(denied.unwrap_err(), SessionError::InvalidState(GameStatus::Ended));
    assert_eq!(g.session.game().await.unwrap().status, GameStatus::Ended);
}

#[tokio::test]
async fn expired_clock_times_the_active_player_out() {
    let h = harness();
    let g = h.started_game(TimeControl::absolute(0)).await;

    let ended = wait_until_ended(&g.session).await;
    let result = ended.result.unwrap();
    assert_eq!(result.reason, EndReason::Timeout);
    // Black was to move on an empty clock; White wins on time
    assert_eq!(result.winner, Some(Color::White));
    assert!(ended.clocks.unwrap().black.out_of_time());
}

#[tokio::test]
async fn byo_yomi_keeps_an_expired_main_time_alive() {
    let h = harness();
    let g = h.started_game(TimeControl::with_byo_yomi(0, 1, 1)).await;

    // Main time is gone instantly; the timer rolls Black into byo-yomi
    tokio::time::sleep(Duration::from_millis(150)).await;
    let game = g.session.game().await.unwrap();
    assert_eq!(game.status, GameStatus::Playing);
    let black_clock = game.clocks.unwrap().black;
    assert!(black_clock.byo_yomi_active);
    assert_eq!(black_clock.periods_left, Some(1));

    // Moving within the period is accepted and hands over to White
    let mv = g
        .session
        .make_move(Move::Place(Coord::new(4, 4)), g.black)
        .await
        .unwrap();
    assert!(mv.accepted);

    // White idles through the final period and flags
    let ended = wait_until_ended(&g.session).await;
    let result = ended.result.unwrap();
    assert_eq!(result.reason, EndReason::Timeout);
    assert_eq!(result.winner, Some(Color::Black));
}

#[tokio::test]
async fn reset_overwrites_actor_state() {
    let h = harness();
    let g = h.started_game(slow()).await;

    g.session
        .make_move(Move::Place(Coord::new(2, 2)), g.black)
        .await
        .unwrap();
    let checkpoint = g.session.game().await.unwrap();

    g.session
        .make_move(Move::Place(Coord::new(6, 6)), g.white)
        .await
        .unwrap();
    assert_eq!(g.session.game().await.unwrap().moves.len(), 2);

    g.session.reset(checkpoint.clone()).await.unwrap();
    let restored = g.session.game().await.unwrap();
    assert_eq!(restored.moves.len(), 1);
    assert_eq!(restored.grid, checkpoint.grid);
    assert_eq!(restored.current_turn, Color::White);
}
