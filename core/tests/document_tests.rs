// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted `Game` document must survive a serialization round trip
//! and rebuild an equivalent engine state, since actor reactivation works
//! from the document alone.

use baduk_core::{ClockPair, Color, Coord, Game, GameStatus, GameType, Move, TimeControl};
use chrono::Utc;
use uuid::Uuid;

#[test]
fn game_document_round_trips_through_json() {
    let now = Utc::now();
    let creator = Uuid::new_v4();
    let mut game = Game::new(
        Uuid::new_v4(),
        9,
        TimeControl::with_byo_yomi(600, 5, 30),
        creator,
        Color::Black,
        GameType::Ranked,
        now,
    );
    game.white = Some(Uuid::new_v4());
    game.status = GameStatus::Playing;
    game.started_at = Some(now);
    game.clocks = Some(ClockPair::seed(&game.time_control, Color::Black, now));

    let mut board = game.board();
    assert!(board.play(Coord::new(2, 2), Color::Black));
    assert!(board.play(Coord::new(6, 6), Color::White));
    game.apply_board(&board);
    game.moves.push(baduk_core::MoveRecord {
        mv: Move::Place(Coord::new(2, 2)),
        color: Color::Black,
        at: now,
    });

    let json = serde_json::to_string(&game).expect("serialize game");
    let restored: Game = serde_json::from_str(&json).expect("deserialize game");

    assert_eq!(restored.id, game.id);
    assert_eq!(restored.grid, game.grid);
    assert_eq!(restored.clocks, game.clocks);
    assert_eq!(restored.moves.len(), 1);

    // The rebuilt engine agrees with the document
    let rebuilt = restored.board();
    assert_eq!(rebuilt.stone_at(Coord::new(2, 2)), Some(Color::Black));
    assert_eq!(rebuilt.grid(), restored.grid);
    assert_eq!(
        rebuilt.cluster_at(Coord::new(2, 2)).unwrap().liberty_count(),
        4
    );
}
