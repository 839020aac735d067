//! Client-facing snapshot of a game.
//!
//! A snapshot is a plain serializable view: the board oriented for the
//! requesting viewer, the side to move, status, and the full move log. It
//! carries no authority; the record behind the store lock stays the single
//! source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_state::board::Board;
use crate::game_state::chess_types::{CheckedMove, Color, Square, Status};
use crate::game_state::game_record::GameRecord;
use crate::service::events::BoardGrid;

/// Board as a nested grid, top rank first from the viewer's side. White
/// viewers see rank 8 at row 0; Black viewers see the board rotated so
/// their own pieces start at the bottom.
pub fn oriented_grid(board: &Board, viewer: Color) -> BoardGrid {
    let ranks: Vec<u8> = match viewer {
        Color::White => (0..8u8).rev().collect(),
        Color::Black => (0..8u8).collect(),
    };
    ranks
        .into_iter()
        .map(|rank| {
            let files: Vec<u8> = match viewer {
                Color::White => (0..8u8).collect(),
                Color::Black => (0..8u8).rev().collect(),
            };
            files
                .into_iter()
                .map(|file| board.piece_at(Square { file, rank }))
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: BoardGrid,
    pub side_to_move: Color,
    pub status: Status,
    pub moves: Vec<CheckedMove>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameSnapshot {
    pub fn of_record(record: &GameRecord, viewer: Color) -> Self {
        GameSnapshot {
            board: oriented_grid(&record.board, viewer),
            side_to_move: record.side_to_move,
            status: record.status,
            moves: record.move_log.clone(),
            halfmove_clock: record.halfmove_clock,
            fullmove_number: record.fullmove_number,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::{Piece, PieceKind};

    #[test]
    fn white_view_puts_black_back_rank_on_top() {
        let board = Board::starting_position();
        let grid = oriented_grid(&board, Color::White);
        assert_eq!(grid[0][4], Some(Piece::new(Color::Black, PieceKind::King)));
        assert_eq!(grid[7][4], Some(Piece::new(Color::White, PieceKind::King)));
        // a1 ends up bottom-left.
        assert_eq!(grid[7][0], Some(Piece::new(Color::White, PieceKind::Rook)));
    }

    #[test]
    fn black_view_is_the_full_rotation() {
        let board = Board::starting_position();
        let white = oriented_grid(&board, Color::White);
        let black = oriented_grid(&board, Color::Black);
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(black[row][col], white[7 - row][7 - col]);
            }
        }
    }

    #[test]
    fn snapshot_serializes_with_wire_tokens() {
        let record = GameRecord::new_game();
        let snapshot = GameSnapshot::of_record(&record, Color::White);
        let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
        assert_eq!(json["side_to_move"], "white");
        assert_eq!(json["status"], "ongoing");
        assert_eq!(json["board"][0][3], "bq");
        assert_eq!(json["board"][4][4], serde_json::Value::Null);

        let back: GameSnapshot =
            serde_json::from_value(json).expect("snapshot deserializes");
        assert_eq!(back.board, snapshot.board);
        assert_eq!(back.status, Status::Ongoing);
    }
}
