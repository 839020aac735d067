//! Core value types shared by the board, rules, and service layers.
//!
//! Everything here is a small `Copy` value: squares, colors, piece kinds,
//! castling rights, validated move records, and game status. All dispatch on
//! these types is exhaustive pattern matching; there is no token parsing
//! anywhere past the serialization boundary.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::NotationError;

/// Side to move / piece ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank holding this color's king and rooks at game start.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank direction this color's pawns advance in.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    #[inline]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank on which this color's pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

/// Piece kind (color is represented separately).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];
}

/// A colored piece as stored in a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// Two-character token used on the wire, e.g. `wq` or `bk`.
    pub fn token(self) -> String {
        let color = match self.color {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let kind = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        let mut s = String::with_capacity(2);
        s.push(color);
        s.push(kind);
        s
    }

    pub fn from_token(token: &str) -> Result<Self, NotationError> {
        let mut chars = token.chars();
        let (Some(color_ch), Some(kind_ch), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(NotationError::InvalidPieceToken(token.to_owned()));
        };
        let color = match color_ch {
            'w' => Color::White,
            'b' => Color::Black,
            _ => return Err(NotationError::InvalidPieceToken(token.to_owned())),
        };
        let kind = match kind_ch {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(NotationError::InvalidPieceToken(token.to_owned())),
        };
        Ok(Piece { color, kind })
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Piece::from_token(&token).map_err(D::Error::custom)
    }
}

/// A board coordinate. File and rank are both in `0..=7`; rank 0 is White's
/// back rank, so `a1` is `(0, 0)` and `h8` is `(7, 7)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    /// Step by a file/rank delta, returning `None` when leaving the board.
    #[inline]
    pub fn offset(self, d_file: i8, d_rank: i8) -> Option<Self> {
        let file = self.file as i8 + d_file;
        let rank = self.rank as i8 + d_rank;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// Iterate every square on the board, a1 through h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(b'a' + self.file),
            char::from(b'1' + self.rank)
        )
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(NotationError::InvalidSquare(s.to_owned()));
        }
        let file = bytes[0];
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(NotationError::InvalidSquare(s.to_owned()));
        }
        Ok(Square {
            file: file - b'a',
            rank: rank - b'1',
        })
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Castling availability for one color. Flags only ever go true -> false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub king_side: bool,
    pub queen_side: bool,
}

impl CastlingRights {
    pub const BOTH: CastlingRights = CastlingRights {
        king_side: true,
        queen_side: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        king_side: false,
        queen_side: false,
    };
}

/// Classification attached to a move once it has passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Normal,
    Capture,
    EnPassantCapture,
    CastleKingside,
    CastleQueenside,
    /// Pawn reaching the farthest rank. Always promotes to a queen.
    Promotion,
}

/// A fully validated move, as appended to the game's move log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub kind: MoveKind,
}

/// Why a game ended in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    Agreement,
}

/// Game outcome. `Ongoing` is the only state that accepts further moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ongoing,
    Checkmate { winner: Color },
    Resigned { winner: Color },
    Draw { reason: DrawReason },
}

impl Status {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Status::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_algebraic_round_trip() {
        let e4: Square = "e4".parse().expect("e4 should parse");
        assert_eq!(e4, Square { file: 4, rank: 3 });
        assert_eq!(e4.to_string(), "e4");
        assert_eq!("a1".parse::<Square>().unwrap(), Square { file: 0, rank: 0 });
        assert_eq!("h8".parse::<Square>().unwrap(), Square { file: 7, rank: 7 });
        assert!("i1".parse::<Square>().is_err());
        assert!("e9".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
    }

    #[test]
    fn square_offset_stays_on_board() {
        let a1 = Square { file: 0, rank: 0 };
        assert_eq!(a1.offset(1, 2), Some(Square { file: 1, rank: 2 }));
        assert_eq!(a1.offset(-1, 0), None);
        assert_eq!(a1.offset(0, 8), None);
    }

    #[test]
    fn piece_token_round_trip() {
        let wq = Piece::new(Color::White, PieceKind::Queen);
        assert_eq!(wq.token(), "wq");
        assert_eq!(Piece::from_token("wq").unwrap(), wq);
        assert_eq!(
            Piece::from_token("bk").unwrap(),
            Piece::new(Color::Black, PieceKind::King)
        );
        assert!(Piece::from_token("xq").is_err());
        assert!(Piece::from_token("w").is_err());
    }

    #[test]
    fn serde_uses_wire_tokens() {
        let square = Square { file: 4, rank: 1 };
        assert_eq!(serde_json::to_string(&square).unwrap(), "\"e2\"");
        let piece = Piece::new(Color::Black, PieceKind::Knight);
        assert_eq!(serde_json::to_string(&piece).unwrap(), "\"bn\"");
        let status = Status::Checkmate {
            winner: Color::White,
        };
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            "{\"checkmate\":{\"winner\":\"white\"}}"
        );
    }
}
