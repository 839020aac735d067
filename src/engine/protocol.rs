//! Line protocol spoken to the external engine.
//!
//! The service is the client side of a UCI-style exchange: it writes a
//! `position fen ...` line followed by one `go` line, then reads lines until
//! `bestmove` arrives. Everything the engine prints before that (search
//! info, option echoes) is skipped. The returned move is advisory text only
//! and is re-validated by the rules layer before it touches any game.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::game_state::chess_types::{PieceKind, Square};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine i/o failure: {0}")]
    Io(#[from] io::Error),
    #[error("engine closed its output stream")]
    Closed,
    #[error("engine reported no legal move for the position")]
    NoMoveReturned,
    #[error("engine produced a malformed bestmove token: {0:?}")]
    MalformedBestMove(String),
    #[error("engine handshake failed waiting for {0:?}")]
    HandshakeFailed(&'static str),
    #[error("engine process stdio could not be captured")]
    StdioUnavailable,
}

/// Search bound passed with a `go` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    Depth(u8),
    MoveTimeMs(u32),
}

impl SearchLimit {
    pub fn command(self) -> String {
        match self {
            SearchLimit::Depth(depth) => format!("go depth {depth}"),
            SearchLimit::MoveTimeMs(ms) => format!("go movetime {ms}"),
        }
    }
}

pub fn position_command(fen: &str) -> String {
    format!("position fen {fen}")
}

/// A `bestmove` reply: coordinate pair plus an optional promotion letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl BestMove {
    /// Parse a long-algebraic token such as `e2e4` or `e7e8q`.
    pub fn parse(token: &str) -> Result<Self, EngineError> {
        let malformed = || EngineError::MalformedBestMove(token.to_owned());
        if !token.is_ascii() || token.len() < 4 || token.len() > 5 {
            return Err(malformed());
        }
        let from: Square = token[..2].parse().map_err(|_| malformed())?;
        let to: Square = token[2..4].parse().map_err(|_| malformed())?;
        let promotion = match token.as_bytes().get(4) {
            None => None,
            Some(b'n') => Some(PieceKind::Knight),
            Some(b'b') => Some(PieceKind::Bishop),
            Some(b'r') => Some(PieceKind::Rook),
            Some(b'q') => Some(PieceKind::Queen),
            Some(_) => return Err(malformed()),
        };
        Ok(BestMove {
            from,
            to,
            promotion,
        })
    }
}

/// One full request/response exchange over arbitrary streams.
///
/// Generic over the streams so tests can drive it with in-memory buffers.
pub fn query_best_move<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    fen: &str,
    limit: SearchLimit,
) -> Result<BestMove, EngineError> {
    writeln!(output, "{}", position_command(fen))?;
    writeln!(output, "{}", limit.command())?;
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(EngineError::Closed);
        }
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("bestmove") else {
            continue;
        };
        let token = rest
            .split_whitespace()
            .next()
            .ok_or(EngineError::NoMoveReturned)?;
        if token == "(none)" {
            return Err(EngineError::NoMoveReturned);
        }
        return BestMove::parse(token);
    }
}
