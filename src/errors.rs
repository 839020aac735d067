//! Errors used throughout the game-service core.
//!
//! The taxonomy is split along recovery lines rather than by module:
//!
//! - [`RejectReason`] covers user-facing move rejections. The proposed move
//!   is refused, state is unchanged, and the caller surfaces the reason.
//! - [`InternalError`] covers internal-consistency failures (a king missing
//!   from the board). These indicate a prior bug in apply logic and are never
//!   produced by merely illegal input.
//! - [`MoveError`] combines the two for the validate/apply path, so callers
//!   can match user-facing rejections without losing the fatal cases.
//! - Parse failures for coordinates and FEN have their own small enums.
//!
//! External-engine failures live in [`crate::engine::protocol::EngineError`]
//! and store-level failures in [`crate::service::store::ServiceError`], next
//! to the code that produces them.

use thiserror::Error;

use crate::game_state::chess_types::Color;

/// User-facing reasons a proposed move is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no piece on the source square, or it is not that piece's turn")]
    NoPieceOrWrongTurn,
    #[error("destination square is occupied by a friendly piece")]
    FriendlyCapture,
    #[error("move would leave the mover's own king in check")]
    LeavesKingInCheck,
    #[error("piece cannot reach the destination square")]
    IllegalShape,
    #[error("castling conditions are not met")]
    IllegalCastle,
    #[error("game has already reached a terminal status")]
    GameAlreadyTerminal,
}

/// Internal-consistency failures. These should never occur given correct
/// apply logic and must surface unambiguously rather than as a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("board holds no {0:?} king")]
    KingMissing(Color),
}

/// Combined error for the validate-then-apply path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

/// Failures parsing algebraic coordinates or piece tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid algebraic square: {0:?}")]
    InvalidSquare(String),
    #[error("invalid piece token: {0:?}")]
    InvalidPieceToken(String),
}

/// Failures parsing a FEN position string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN is missing its {0} field")]
    MissingField(&'static str),
    #[error("FEN has extra trailing fields")]
    TrailingFields,
    #[error("invalid piece character {0:?} in board layout")]
    InvalidPiece(char),
    #[error("board layout must contain 8 ranks")]
    BadRankCount,
    #[error("board rank does not describe exactly 8 files")]
    BadRankWidth,
    #[error("invalid side-to-move field: {0:?}")]
    InvalidSideToMove(String),
    #[error("invalid castling rights character: {0:?}")]
    InvalidCastling(char),
    #[error("invalid clock field: {0:?}")]
    InvalidClock(String),
    #[error(transparent)]
    Notation(#[from] NotationError),
    #[error("position has no {0:?} king")]
    KingMissing(Color),
}
