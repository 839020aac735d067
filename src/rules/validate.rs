//! Move validation: the ordered gates between a raw (from, to) proposal and
//! a `CheckedMove` the state machine may apply.
//!
//! Gates, each a hard reject: terminal status, piece ownership and turn,
//! friendly capture, piece-specific shape (including the castling protocol),
//! and finally king safety evaluated on a hypothetical board carrying the
//! full prospective move, en-passant removal and rook relocation included.
//! Validation only reads; nothing here mutates the live record.

use crate::errors::{InternalError, MoveError, RejectReason};
use crate::game_state::chess_types::{
    CheckedMove, Color, MoveKind, Piece, PieceKind, Square,
};
use crate::game_state::game_record::GameRecord;
use crate::rules::{check, geometry};

/// Validate a proposed move against a snapshot of the game record.
pub fn validate(record: &GameRecord, from: Square, to: Square) -> Result<CheckedMove, MoveError> {
    if record.status.is_terminal() {
        return Err(RejectReason::GameAlreadyTerminal.into());
    }

    let piece = record
        .board
        .piece_at(from)
        .filter(|piece| piece.color == record.side_to_move)
        .ok_or(RejectReason::NoPieceOrWrongTurn)?;

    if let Some(target) = record.board.piece_at(to) {
        if target.color == piece.color {
            return Err(RejectReason::FriendlyCapture.into());
        }
    }

    let kind = classify(record, piece, from, to)?;
    let captured = match kind {
        MoveKind::EnPassantCapture => {
            Some(Piece::new(piece.color.opposite(), PieceKind::Pawn))
        }
        _ => record.board.piece_at(to),
    };
    let checked = CheckedMove {
        from,
        to,
        piece,
        captured,
        kind,
    };

    let hypothetical = record.board.after_move(&checked);
    let king_hint = if piece.kind == PieceKind::King {
        Some(to)
    } else {
        Some(record.king_positions[piece.color.index()])
    };
    if check::in_check(&hypothetical, piece.color, king_hint)? {
        return Err(RejectReason::LeavesKingInCheck.into());
    }

    Ok(checked)
}

/// Piece-specific legality over the live board, producing the move kind.
fn classify(
    record: &GameRecord,
    piece: Piece,
    from: Square,
    to: Square,
) -> Result<MoveKind, RejectReason> {
    let board = &record.board;

    if piece.kind == PieceKind::King {
        let d_file = to.file as i8 - from.file as i8;
        let d_rank = to.rank as i8 - from.rank as i8;
        if d_rank == 0 && d_file.abs() == 2 {
            return validate_castle(record, piece.color, from, to, d_file > 0);
        }
    }

    if piece.kind == PieceKind::Pawn {
        if !geometry::pawn_reaches(board, piece.color, from, to, record.en_passant_target) {
            return Err(RejectReason::IllegalShape);
        }
        if to.rank == piece.color.promotion_rank() {
            return Ok(MoveKind::Promotion);
        }
        if board.piece_at(to).is_none() && from.file != to.file {
            return Ok(MoveKind::EnPassantCapture);
        }
        return Ok(if board.piece_at(to).is_some() {
            MoveKind::Capture
        } else {
            MoveKind::Normal
        });
    }

    if !geometry::reaches(board, piece, from, to, None) {
        return Err(RejectReason::IllegalShape);
    }
    Ok(if board.piece_at(to).is_some() {
        MoveKind::Capture
    } else {
        MoveKind::Normal
    })
}

/// The castling protocol: rights flag still true, rook on its origin square,
/// all squares between king and rook empty, and the king's path (origin,
/// transit, destination) never attacked, probed with the king placed on each
/// square in turn.
fn validate_castle(
    record: &GameRecord,
    color: Color,
    from: Square,
    to: Square,
    king_side: bool,
) -> Result<MoveKind, RejectReason> {
    let back = color.back_rank();
    if from != (Square { file: 4, rank: back }) {
        return Err(RejectReason::IllegalCastle);
    }

    let rights = record.castling_rights[color.index()];
    let allowed = if king_side {
        rights.king_side
    } else {
        rights.queen_side
    };
    if !allowed {
        return Err(RejectReason::IllegalCastle);
    }

    let rook_file = if king_side { 7 } else { 0 };
    let rook_origin = Square {
        file: rook_file,
        rank: back,
    };
    if record.board.piece_at(rook_origin) != Some(Piece::new(color, PieceKind::Rook)) {
        return Err(RejectReason::IllegalCastle);
    }

    let between: &[u8] = if king_side { &[5, 6] } else { &[1, 2, 3] };
    for &file in between {
        if record.board.piece_at(Square { file, rank: back }).is_some() {
            return Err(RejectReason::IllegalCastle);
        }
    }

    // Walk the king along its path, one square per step, and probe each
    // intermediate position for attacks.
    let step: i8 = if king_side { 1 } else { -1 };
    let enemy = color.opposite();
    let mut probe = record.board.clone();
    probe.set(from, None);
    let mut file = from.file as i8;
    loop {
        let square = Square {
            file: file as u8,
            rank: back,
        };
        probe.set(square, Some(Piece::new(color, PieceKind::King)));
        let attacked = check::square_attacked(&probe, square, enemy);
        probe.set(square, None);
        if attacked {
            return Err(RejectReason::IllegalCastle);
        }
        if file == to.file as i8 {
            break;
        }
        file += step;
    }

    Ok(if king_side {
        MoveKind::CastleKingside
    } else {
        MoveKind::CastleQueenside
    })
}

/// Enumerate every legal move for the side to move. Expensive; used for
/// status recomputation and move hints, never on the per-move hot path.
pub fn legal_moves(record: &GameRecord) -> Result<Vec<CheckedMove>, InternalError> {
    let mut moves = Vec::new();
    for (from, _) in record.board.pieces_of(record.side_to_move) {
        for to in Square::all() {
            match validate(record, from, to) {
                Ok(checked) => moves.push(checked),
                Err(MoveError::Rejected(_)) => {}
                Err(MoveError::Internal(internal)) => return Err(internal),
            }
        }
    }
    Ok(moves)
}

/// Short-circuiting form of [`legal_moves`] for terminal-status detection.
pub fn has_any_legal_move(record: &GameRecord) -> Result<bool, InternalError> {
    for (from, _) in record.board.pieces_of(record.side_to_move) {
        for to in Square::all() {
            match validate(record, from, to) {
                Ok(_) => return Ok(true),
                Err(MoveError::Rejected(_)) => {}
                Err(MoveError::Internal(internal)) => return Err(internal),
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Status;

    fn record(fen: &str) -> GameRecord {
        GameRecord::from_fen(fen).expect("test FEN should parse")
    }

    fn sq(s: &str) -> Square {
        s.parse().expect("test square should parse")
    }

    fn reject(record: &GameRecord, from: &str, to: &str) -> RejectReason {
        match validate(record, sq(from), sq(to)) {
            Err(MoveError::Rejected(reason)) => reason,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let record = GameRecord::new_game();
        assert_eq!(legal_moves(&record).unwrap().len(), 20);
        assert!(has_any_legal_move(&record).unwrap());
    }

    #[test]
    fn ownership_and_turn_gate() {
        let record = GameRecord::new_game();
        // Empty source square.
        assert_eq!(reject(&record, "e4", "e5"), RejectReason::NoPieceOrWrongTurn);
        // Black piece while White is to move.
        assert_eq!(reject(&record, "e7", "e5"), RejectReason::NoPieceOrWrongTurn);
    }

    #[test]
    fn friendly_capture_gate() {
        let record = GameRecord::new_game();
        assert_eq!(reject(&record, "a1", "a2"), RejectReason::FriendlyCapture);
    }

    #[test]
    fn shape_gate_per_piece() {
        let record = GameRecord::new_game();
        assert_eq!(reject(&record, "g1", "g3"), RejectReason::IllegalShape);
        assert_eq!(reject(&record, "e2", "d3"), RejectReason::IllegalShape);
        // Sliding through a friendly pawn.
        assert_eq!(reject(&record, "d1", "d5"), RejectReason::IllegalShape);
    }

    #[test]
    fn pinned_piece_cannot_expose_the_king() {
        // Black rook on e8 pins the e-file knight to the white king.
        let record = record("k3r3/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(reject(&record, "e2", "c3"), RejectReason::LeavesKingInCheck);
        // No knight move stays on the file, so every knight move is rejected.
        for to in ["d4", "f4", "g3", "g1", "c1"] {
            assert_eq!(reject(&record, "e2", to), RejectReason::LeavesKingInCheck);
        }
        // The king itself can step off the file.
        assert!(validate(&record, sq("e1"), sq("d2")).is_ok());
    }

    #[test]
    fn king_cannot_step_into_an_attacked_square() {
        // Queen on e8 holds the whole e-file and d8/f8 diagonal reach.
        let record = record("k3q3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(reject(&record, "e1", "e2"), RejectReason::LeavesKingInCheck);
        assert!(validate(&record, sq("e1"), sq("d2")).is_ok());
        assert!(validate(&record, sq("e1"), sq("f2")).is_ok());
    }

    #[test]
    fn en_passant_is_classified_and_only_on_the_window() {
        let record = record("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let checked = validate(&record, sq("e5"), sq("d6")).expect("en passant should be legal");
        assert_eq!(checked.kind, MoveKind::EnPassantCapture);
        assert_eq!(
            checked.captured,
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );

        // Same position without the target: the diagonal is just illegal.
        let stale = record_without_ep();
        assert_eq!(reject(&stale, "e5", "d6"), RejectReason::IllegalShape);
    }

    fn record_without_ep() -> GameRecord {
        record("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1")
    }

    #[test]
    fn promotion_is_classified() {
        let record = record("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let checked = validate(&record, sq("a7"), sq("a8")).expect("promotion push should be legal");
        assert_eq!(checked.kind, MoveKind::Promotion);
    }

    #[test]
    fn castling_happy_path_and_sub_conditions() {
        let open = record("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let kingside = validate(&open, sq("e1"), sq("g1")).expect("kingside castle should be legal");
        assert_eq!(kingside.kind, MoveKind::CastleKingside);
        let queenside =
            validate(&open, sq("e1"), sq("c1")).expect("queenside castle should be legal");
        assert_eq!(queenside.kind, MoveKind::CastleQueenside);

        // Rights flag cleared.
        let no_rights = record("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_eq!(reject(&no_rights, "e1", "g1"), RejectReason::IllegalCastle);

        // Rook missing from its origin square.
        let no_rook = record("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1");
        assert_eq!(reject(&no_rook, "e1", "g1"), RejectReason::IllegalCastle);

        // Intervening square occupied.
        let blocked = record("4k3/8/8/8/8/8/8/R3KB1R w KQ - 0 1");
        assert_eq!(reject(&blocked, "e1", "g1"), RejectReason::IllegalCastle);

        // Queenside b1 square occupied blocks even though the king never
        // crosses it.
        let b1_blocked = record("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
        assert_eq!(reject(&b1_blocked, "e1", "c1"), RejectReason::IllegalCastle);
    }

    #[test]
    fn castling_through_check_is_rejected() {
        // Rook on f8 attacks f1: the transit square.
        let transit = record("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(reject(&transit, "e1", "g1"), RejectReason::IllegalCastle);

        // Rook on e8 attacks e1: castling out of check.
        let start = record("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(reject(&start, "e1", "g1"), RejectReason::IllegalCastle);

        // Rook on g8 attacks g1: the destination square.
        let dest = record("4k1r1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(reject(&dest, "e1", "g1"), RejectReason::IllegalCastle);

        // An attack on b1 does not affect the queenside king path (c1-e1).
        let b1_attacked = record("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(validate(&b1_attacked, sq("e1"), sq("c1")).is_ok());
    }

    #[test]
    fn terminal_game_rejects_proposals() {
        let mut record = GameRecord::new_game();
        record.status = Status::Resigned {
            winner: Color::Black,
        };
        assert_eq!(
            reject(&record, "e2", "e4"),
            RejectReason::GameAlreadyTerminal
        );
    }

    #[test]
    fn self_check_rejected_for_every_piece_kind() {
        // Each position pins one piece of the named kind to the e-file; the
        // proposed move steps off the file and must be rejected.
        let pinned = [
            ("k3r3/8/8/8/8/8/4R3/4K3 w - - 0 1", "e2", "a2"), // rook
            ("k3r3/8/8/8/8/8/4B3/4K3 w - - 0 1", "e2", "d3"), // bishop
            ("k3r3/8/8/8/8/8/4Q3/4K3 w - - 0 1", "e2", "d3"), // queen
            ("k3r3/8/8/8/8/8/4N3/4K3 w - - 0 1", "e2", "d4"), // knight
            ("k3r3/8/8/8/8/3p4/4P3/4K3 w - - 0 1", "e2", "d3"), // pawn capture
        ];
        for (fen, from, to) in pinned {
            let state = record(fen);
            assert_eq!(
                reject(&state, from, to),
                RejectReason::LeavesKingInCheck,
                "pinned piece in {fen} moving {from}-{to}"
            );
        }

        // Sliding along the pin stays legal.
        let queen = record("k3r3/8/8/8/8/8/4Q3/4K3 w - - 0 1");
        assert!(validate(&queen, sq("e2"), sq("e5")).is_ok());
    }
}
