//! The 8x8 board: a grid of optional pieces with indexed access.
//!
//! `Board` is a plain value type. It performs no rule validation and trusts
//! its callers; ownership is exclusive to the game record, and the validator
//! works on cheap clones. `after_move` is the single implementation of move
//! application semantics, shared by the validator's hypothetical boards and
//! the state machine's real apply.

use crate::game_state::chess_types::{CheckedMove, Color, MoveKind, Piece, PieceKind, Square};

const BACK_RANK_KINDS: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Fixed 8x8 grid of optional pieces, indexed `[rank][file]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting position.
    pub fn starting_position() -> Self {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            let back = color.back_rank();
            let pawn_rank = (back as i8 + color.pawn_direction()) as u8;
            for (file, kind) in BACK_RANK_KINDS.iter().enumerate() {
                board.squares[back as usize][file] = Some(Piece::new(color, *kind));
            }
            for file in 0..8 {
                board.squares[pawn_rank as usize][file] =
                    Some(Piece::new(color, PieceKind::Pawn));
            }
        }
        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank as usize][square.file as usize]
    }

    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.rank as usize][square.file as usize] = piece;
    }

    /// Scan for a color's king. Used as the recovery fallback when the cached
    /// king position does not survive verification.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::all().find(|&sq| self.piece_at(sq) == Some(king))
    }

    /// Every piece of one color, with its square.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|piece| piece.color == color)
                .map(|piece| (sq, piece))
        })
    }

    /// Board after applying a validated move, special-move side effects
    /// included: en-passant removal of the jumped pawn, the castling rook
    /// relocation, and promotion to a queen.
    pub fn after_move(&self, mv: &CheckedMove) -> Board {
        let mut next = self.clone();
        let color = mv.piece.color;
        let back = color.back_rank();

        next.set(mv.from, None);
        let placed = match mv.kind {
            MoveKind::Promotion => Piece::new(color, PieceKind::Queen),
            _ => mv.piece,
        };
        next.set(mv.to, Some(placed));

        match mv.kind {
            MoveKind::EnPassantCapture => {
                // The captured pawn sits on the destination file at the
                // origin rank, not on the destination square itself.
                let jumped = Square {
                    file: mv.to.file,
                    rank: mv.from.rank,
                };
                next.set(jumped, None);
            }
            MoveKind::CastleKingside => {
                let rook = Square { file: 7, rank: back };
                next.set(rook, None);
                next.set(Square { file: 5, rank: back }, Some(Piece::new(color, PieceKind::Rook)));
            }
            MoveKind::CastleQueenside => {
                let rook = Square { file: 0, rank: back };
                next.set(rook, None);
                next.set(Square { file: 3, rank: back }, Some(Piece::new(color, PieceKind::Rook)));
            }
            _ => {}
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().expect("test square should parse")
    }

    #[test]
    fn starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(
            board.piece_at(sq("e1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            board.piece_at(sq("d8")),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        assert_eq!(
            board.piece_at(sq("a2")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert_eq!(board.piece_at(sq("e4")), None);
        assert_eq!(board.pieces_of(Color::White).count(), 16);
        assert_eq!(board.pieces_of(Color::Black).count(), 16);
    }

    #[test]
    fn find_king_scans_the_board() {
        let mut board = Board::empty();
        assert_eq!(board.find_king(Color::White), None);
        board.set(sq("c6"), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(board.find_king(Color::White), Some(sq("c6")));
        assert_eq!(board.find_king(Color::Black), None);
    }

    #[test]
    fn after_move_relocates_castling_rook() {
        let board = Board::starting_position();
        let mut cleared = board.clone();
        cleared.set(sq("f1"), None);
        cleared.set(sq("g1"), None);

        let castle = CheckedMove {
            from: sq("e1"),
            to: sq("g1"),
            piece: Piece::new(Color::White, PieceKind::King),
            captured: None,
            kind: MoveKind::CastleKingside,
        };
        let next = cleared.after_move(&castle);
        assert_eq!(
            next.piece_at(sq("g1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            next.piece_at(sq("f1")),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert_eq!(next.piece_at(sq("h1")), None);
        assert_eq!(next.piece_at(sq("e1")), None);
    }

    #[test]
    fn after_move_removes_en_passant_victim() {
        let mut board = Board::empty();
        board.set(sq("e5"), Some(Piece::new(Color::White, PieceKind::Pawn)));
        board.set(sq("d5"), Some(Piece::new(Color::Black, PieceKind::Pawn)));

        let capture = CheckedMove {
            from: sq("e5"),
            to: sq("d6"),
            piece: Piece::new(Color::White, PieceKind::Pawn),
            captured: Some(Piece::new(Color::Black, PieceKind::Pawn)),
            kind: MoveKind::EnPassantCapture,
        };
        let next = board.after_move(&capture);
        assert_eq!(
            next.piece_at(sq("d6")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
        assert_eq!(next.piece_at(sq("d5")), None);
        assert_eq!(next.piece_at(sq("e5")), None);
    }

    #[test]
    fn after_move_promotes_to_queen() {
        let mut board = Board::empty();
        board.set(sq("e7"), Some(Piece::new(Color::White, PieceKind::Pawn)));

        let push = CheckedMove {
            from: sq("e7"),
            to: sq("e8"),
            piece: Piece::new(Color::White, PieceKind::Pawn),
            captured: None,
            kind: MoveKind::Promotion,
        };
        let next = board.after_move(&push);
        assert_eq!(
            next.piece_at(sq("e8")),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
    }
}
