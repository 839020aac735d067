//! Check detection over an arbitrary board snapshot.
//!
//! Built strictly on top of geometry: scan every opposing piece and ask
//! whether it could reach the king square, with en-passant disabled. The
//! functions take any board, live or hypothetical, and never mutate it.

use crate::errors::InternalError;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Piece, PieceKind, Square};
use crate::rules::geometry;

/// Resolve a color's king square. The cached hint is verified against the
/// board and a full scan is the fallback; a board with no king at all is a
/// fatal internal-consistency error, not a user-facing one.
pub fn locate_king(
    board: &Board,
    color: Color,
    hint: Option<Square>,
) -> Result<Square, InternalError> {
    let king = Piece::new(color, PieceKind::King);
    if let Some(square) = hint {
        if board.piece_at(square) == Some(king) {
            return Ok(square);
        }
    }
    board
        .find_king(color)
        .ok_or(InternalError::KingMissing(color))
}

/// Whether any piece of `attacker` could move to `target` by geometry alone.
pub fn square_attacked(board: &Board, target: Square, attacker: Color) -> bool {
    board
        .pieces_of(attacker)
        .any(|(from, piece)| geometry::reaches(board, piece, from, target, None))
}

/// Whether `color`'s king is attacked on this board.
pub fn in_check(
    board: &Board,
    color: Color,
    king_hint: Option<Square>,
) -> Result<bool, InternalError> {
    let king_square = locate_king(board, color, king_hint)?;
    Ok(square_attacked(board, king_square, color.opposite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::game_record::GameRecord;

    fn board_of(fen: &str) -> Board {
        GameRecord::from_fen(fen)
            .expect("test FEN should parse")
            .board
    }

    fn sq(s: &str) -> Square {
        s.parse().expect("test square should parse")
    }

    #[test]
    fn no_check_in_starting_position() {
        let board = Board::starting_position();
        assert!(!in_check(&board, Color::White, None).unwrap());
        assert!(!in_check(&board, Color::Black, None).unwrap());
    }

    #[test]
    fn rook_on_open_file_gives_check() {
        let board = board_of("k3r3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(in_check(&board, Color::White, None).unwrap());
    }

    #[test]
    fn blocker_cuts_the_ray() {
        let board = board_of("k3r3/8/8/4N3/8/8/8/4K3 w - - 0 1");
        assert!(!in_check(&board, Color::White, None).unwrap());
    }

    #[test]
    fn knight_and_pawn_checks() {
        let knight = board_of("k7/8/8/8/8/3n4/8/4K3 w - - 0 1");
        assert!(in_check(&knight, Color::White, None).unwrap());

        let pawn = board_of("k7/8/8/8/8/3p4/4K3/8 w - - 0 1");
        assert!(in_check(&pawn, Color::White, None).unwrap());

        // A pawn never checks straight ahead.
        let forward = board_of("k7/8/8/8/8/4p3/4K3/8 w - - 0 1");
        assert!(!in_check(&forward, Color::White, None).unwrap());
    }

    #[test]
    fn stale_hint_falls_back_to_scan() {
        let board = board_of("8/8/8/8/2K5/8/8/7k w - - 0 1");
        assert_eq!(
            locate_king(&board, Color::White, Some(sq("e1"))).unwrap(),
            sq("c4")
        );
    }

    #[test]
    fn missing_king_is_fatal() {
        let board = Board::empty();
        assert_eq!(
            locate_king(&board, Color::White, None),
            Err(InternalError::KingMissing(Color::White))
        );
        assert!(in_check(&board, Color::Black, None).is_err());
    }
}
