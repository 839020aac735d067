//! FEN serialization of the full game record.
//!
//! A record round-trips through its six FEN fields: piece placement, side to
//! move, castling availability, en-passant target, halfmove clock, and
//! fullmove number. The move log and timestamps are not part of FEN and do
//! not survive a round trip.

use chrono::Utc;

use crate::errors::FenError;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{
    CastlingRights, Color, Piece, PieceKind, Square, Status,
};
use crate::game_state::game_record::GameRecord;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn piece_to_fen_char(piece: Piece) -> char {
    let ch = match piece.kind {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    match piece.color {
        Color::White => ch.to_ascii_uppercase(),
        Color::Black => ch,
    }
}

fn piece_from_fen_char(ch: char) -> Result<Piece, FenError> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let kind = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return Err(FenError::InvalidPiece(ch)),
    };
    Ok(Piece::new(color, kind))
}

/// Serialize a record to its six-field FEN string.
pub fn generate_fen(record: &GameRecord) -> String {
    let mut placement = String::new();
    for rank in (0..8u8).rev() {
        let mut empties = 0u8;
        for file in 0..8u8 {
            match record.board.piece_at(Square { file, rank }) {
                Some(piece) => {
                    if empties > 0 {
                        placement.push(char::from(b'0' + empties));
                        empties = 0;
                    }
                    placement.push(piece_to_fen_char(piece));
                }
                None => empties += 1,
            }
        }
        if empties > 0 {
            placement.push(char::from(b'0' + empties));
        }
        if rank > 0 {
            placement.push('/');
        }
    }

    let side = match record.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut castling = String::new();
    let white = record.castling_rights[Color::White.index()];
    let black = record.castling_rights[Color::Black.index()];
    if white.king_side {
        castling.push('K');
    }
    if white.queen_side {
        castling.push('Q');
    }
    if black.king_side {
        castling.push('k');
    }
    if black.queen_side {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let en_passant = match record.en_passant_target {
        Some(square) => square.to_string(),
        None => "-".to_owned(),
    };

    format!(
        "{placement} {side} {castling} {en_passant} {} {}",
        record.halfmove_clock, record.fullmove_number
    )
}

/// Parse a six-field FEN string into a fresh record.
///
/// The resulting record has an empty move log and a position history seeded
/// with the parsed position only. A placement without both kings is rejected.
pub fn parse_fen(fen: &str) -> Result<GameRecord, FenError> {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().ok_or(FenError::MissingField("placement"))?;
    let side = fields.next().ok_or(FenError::MissingField("side to move"))?;
    let castling = fields.next().ok_or(FenError::MissingField("castling"))?;
    let en_passant = fields.next().ok_or(FenError::MissingField("en passant"))?;
    let halfmove = fields.next().ok_or(FenError::MissingField("halfmove clock"))?;
    let fullmove = fields
        .next()
        .ok_or(FenError::MissingField("fullmove number"))?;
    if fields.next().is_some() {
        return Err(FenError::TrailingFields);
    }

    let board = parse_placement(placement)?;

    let side_to_move = match side {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::InvalidSideToMove(other.to_owned())),
    };

    let mut castling_rights = [CastlingRights::NONE; 2];
    if castling != "-" {
        for ch in castling.chars() {
            match ch {
                'K' => castling_rights[Color::White.index()].king_side = true,
                'Q' => castling_rights[Color::White.index()].queen_side = true,
                'k' => castling_rights[Color::Black.index()].king_side = true,
                'q' => castling_rights[Color::Black.index()].queen_side = true,
                _ => return Err(FenError::InvalidCastling(ch)),
            }
        }
    }

    let en_passant_target = match en_passant {
        "-" => None,
        square => Some(square.parse::<Square>()?),
    };

    let halfmove_clock: u16 = halfmove
        .parse()
        .map_err(|_| FenError::InvalidClock(halfmove.to_owned()))?;
    let fullmove_number: u16 = fullmove
        .parse()
        .map_err(|_| FenError::InvalidClock(fullmove.to_owned()))?;

    let king_positions = [
        board
            .find_king(Color::White)
            .ok_or(FenError::KingMissing(Color::White))?,
        board
            .find_king(Color::Black)
            .ok_or(FenError::KingMissing(Color::Black))?,
    ];

    let now = Utc::now();
    let mut record = GameRecord {
        board,
        side_to_move,
        castling_rights,
        en_passant_target,
        king_positions,
        halfmove_clock,
        fullmove_number,
        move_log: Vec::new(),
        status: Status::Ongoing,
        position_history: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    let key = generate_fen(&record)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ");
    record.position_history.push(key);
    Ok(record)
}

fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadRankCount);
    }
    let mut board = Board::empty();
    for (row, rank_str) in ranks.iter().enumerate() {
        // FEN lists ranks top down.
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(FenError::InvalidPiece(ch));
                }
                file += skip as u8;
                if file > 8 {
                    return Err(FenError::BadRankWidth);
                }
            } else {
                if file >= 8 {
                    return Err(FenError::BadRankWidth);
                }
                board.set(
                    Square { file, rank },
                    Some(piece_from_fen_char(ch)?),
                );
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::BadRankWidth);
        }
    }
    Ok(board)
}
