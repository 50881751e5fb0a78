// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use baduk_core::{Color, Coord, Game, GameStatus, GameType, Move, TimeControl};
use baduk_server::{GameStore, SessionError};
use chrono::Utc;
use common::*;
use uuid::Uuid;

#[tokio::test]
async fn unknown_game_is_reported_missing() {
    let h = harness();
    let missing = h.registry.session(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(SessionError::GameNotFound)));
}

#[tokio::test]
async fn deactivated_game_reactivates_from_the_store() {
    let h = harness();
    let g = h.started_game(TimeControl::absolute(600)).await;

    g.session
        .make_move(Move::Place(Coord::new(2, 2)), g.black)
        .await
        .unwrap();

    // Shut the actor down; the final document lands in the store
    h.registry.deactivate(g.id).await.unwrap();
    let stored = h.store.load(g.id).await.unwrap().expect("persisted game");
    assert_eq!(stored.moves.len(), 1);

    // A fresh access re-activates the session from the document and
    // play continues where it stopped
    let session = h.registry.session(g.id).await.unwrap();
    let game = session.game().await.unwrap();
    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.current_turn, Color::White);
    assert_eq!(game.grid, stored.grid);

    let mv = session
        .make_move(Move::Place(Coord::new(6, 6)), g.white)
        .await
        .unwrap();
    assert!(mv.accepted);
}

#[tokio::test]
async fn deactivate_without_session_is_a_no_op() {
    let h = harness();
    h.registry.deactivate(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn reset_game_spawns_a_session_for_a_recovered_document() {
    let h = harness();
    let creator = h.player("recovered");
    let mut game = Game::new(
        Uuid::new_v4(),
        9,
        TimeControl::absolute(600),
        creator,
        Color::Black,
        GameType::Casual,
        Utc::now(),
    );
    game.white = Some(h.player("opponent"));
    game.status = GameStatus::Playing;

    // Force the document in without it ever touching the store
    h.registry.reset_game(game.clone()).await.unwrap();

    let session = h.registry.session(game.id).await.unwrap();
    let loaded = session.game().await.unwrap();
    assert_eq!(loaded.id, game.id);
    assert_eq!(loaded.status, GameStatus::Playing);
}
