//! Shape-and-path legality per piece kind.
//!
//! Pure predicates over a board snapshot. This layer knows nothing about
//! check safety or turn ownership, and it does not inspect destination
//! occupancy for friend/foe beyond what the pawn capture rule requires;
//! friendly-capture prevention belongs to the validator.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Piece, PieceKind, Square};

/// Dispatch on piece kind. Castling is not a geometry shape and is handled
/// by the validator; the king predicate here is plain adjacency.
pub fn reaches(
    board: &Board,
    piece: Piece,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> bool {
    match piece.kind {
        PieceKind::Pawn => pawn_reaches(board, piece.color, from, to, en_passant_target),
        PieceKind::Knight => knight_reaches(from, to),
        PieceKind::Bishop => bishop_reaches(board, from, to),
        PieceKind::Rook => rook_reaches(board, from, to),
        PieceKind::Queen => queen_reaches(board, from, to),
        PieceKind::King => king_adjacent(from, to),
    }
}

#[inline]
fn deltas(from: Square, to: Square) -> (i8, i8) {
    (
        to.file as i8 - from.file as i8,
        to.rank as i8 - from.rank as i8,
    )
}

#[inline]
pub fn knight_reaches(from: Square, to: Square) -> bool {
    let (d_file, d_rank) = deltas(from, to);
    matches!(
        (d_file.abs(), d_rank.abs()),
        (1, 2) | (2, 1)
    )
}

#[inline]
pub fn king_adjacent(from: Square, to: Square) -> bool {
    let (d_file, d_rank) = deltas(from, to);
    d_file.abs() <= 1 && d_rank.abs() <= 1 && (d_file, d_rank) != (0, 0)
}

pub fn rook_reaches(board: &Board, from: Square, to: Square) -> bool {
    let (d_file, d_rank) = deltas(from, to);
    if (d_file == 0) == (d_rank == 0) {
        return false;
    }
    path_clear(board, from, to, d_file.signum(), d_rank.signum())
}

pub fn bishop_reaches(board: &Board, from: Square, to: Square) -> bool {
    let (d_file, d_rank) = deltas(from, to);
    if d_file == 0 || d_file.abs() != d_rank.abs() {
        return false;
    }
    path_clear(board, from, to, d_file.signum(), d_rank.signum())
}

pub fn queen_reaches(board: &Board, from: Square, to: Square) -> bool {
    rook_reaches(board, from, to) || bishop_reaches(board, from, to)
}

/// Pawn forward steps, the double step from the start rank, and diagonal
/// captures (including onto the en-passant target square).
pub fn pawn_reaches(
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> bool {
    let (d_file, d_rank) = deltas(from, to);
    let dir = color.pawn_direction();

    if d_file == 0 && d_rank == dir {
        return board.piece_at(to).is_none();
    }

    if d_file == 0 && d_rank == 2 * dir && from.rank == color.pawn_start_rank() {
        let Some(intermediate) = from.offset(0, dir) else {
            return false;
        };
        return board.piece_at(intermediate).is_none() && board.piece_at(to).is_none();
    }

    if d_file.abs() == 1 && d_rank == dir {
        return match board.piece_at(to) {
            Some(target) => target.color != color,
            None => en_passant_target == Some(to),
        };
    }

    false
}

/// Every square strictly between `from` and `to` must be empty, stepping by
/// the unit direction vector.
fn path_clear(board: &Board, from: Square, to: Square, step_file: i8, step_rank: i8) -> bool {
    let mut current = from;
    loop {
        let Some(next) = current.offset(step_file, step_rank) else {
            return false;
        };
        if next == to {
            return true;
        }
        if board.piece_at(next).is_some() {
            return false;
        }
        current = next;
    }
}
