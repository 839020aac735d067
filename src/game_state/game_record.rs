//! The authoritative game record and its state machine.
//!
//! `GameRecord` owns the board, derived rights and targets, clocks, the move
//! log, and the game status. It is the only component permitted to mutate
//! any of these; validation reads snapshots and hands back a `CheckedMove`
//! that `apply` commits in full, recomputing every derived field before
//! returning.

use chrono::{DateTime, Utc};
use log::info;

use crate::errors::{FenError, InternalError, MoveError, RejectReason};
use crate::game_state::board::Board;
use crate::game_state::chess_types::{
    CastlingRights, CheckedMove, Color, DrawReason, PieceKind, Square, Status,
};
use crate::rules::{check, validate};
use crate::utils::fen;

/// Number of half-moves without a pawn move or capture after which the game
/// is drawn (the fifty-move rule counts full moves).
const FIFTY_MOVE_HALFMOVE_LIMIT: u16 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub board: Board,
    pub side_to_move: Color,
    /// Indexed by `Color::index()`.
    pub castling_rights: [CastlingRights; 2],
    /// Square a pawn skipped on its immediately preceding double step.
    /// Lives for exactly one half-move.
    pub en_passant_target: Option<Square>,
    /// Cached king squares, indexed by `Color::index()`. Maintained
    /// incrementally; check detection re-verifies and falls back to a scan.
    pub king_positions: [Square; 2],
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub move_log: Vec<CheckedMove>,
    pub status: Status,
    /// Repetition keys (the first four FEN fields) of every position seen,
    /// the current one included.
    pub position_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameRecord {
    /// Fresh game from the standard starting position with full rights.
    pub fn new_game() -> Self {
        let now = Utc::now();
        let mut record = GameRecord {
            board: Board::starting_position(),
            side_to_move: Color::White,
            castling_rights: [CastlingRights::BOTH; 2],
            en_passant_target: None,
            king_positions: [
                Square { file: 4, rank: 0 },
                Square { file: 4, rank: 7 },
            ],
            halfmove_clock: 0,
            fullmove_number: 1,
            move_log: Vec::new(),
            status: Status::Ongoing,
            position_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        record.position_history.push(record.repetition_key());
        record
    }

    pub fn from_fen(fen_str: &str) -> Result<Self, FenError> {
        fen::parse_fen(fen_str)
    }

    pub fn get_fen(&self) -> String {
        fen::generate_fen(self)
    }

    /// Validate and apply in one step, returning the committed move.
    pub fn propose(&mut self, from: Square, to: Square) -> Result<CheckedMove, MoveError> {
        let checked = validate::validate(self, from, to)?;
        self.apply(checked)?;
        Ok(checked)
    }

    /// Commit a validated move. All derived fields are recomputed before
    /// this returns; the record is never left partially updated.
    pub fn apply(&mut self, mv: CheckedMove) -> Result<(), MoveError> {
        if self.status.is_terminal() {
            return Err(RejectReason::GameAlreadyTerminal.into());
        }
        let mover = mv.piece.color;

        self.board = self.board.after_move(&mv);

        if mv.piece.kind == PieceKind::Pawn || mv.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        // The en-passant window opens on a pawn double step and closes on
        // every other move.
        let double_step =
            mv.piece.kind == PieceKind::Pawn && mv.from.rank.abs_diff(mv.to.rank) == 2;
        self.en_passant_target = if double_step {
            Some(Square {
                file: mv.from.file,
                rank: (mv.from.rank + mv.to.rank) / 2,
            })
        } else {
            None
        };

        if mv.piece.kind == PieceKind::King {
            self.castling_rights[mover.index()] = CastlingRights::NONE;
            self.king_positions[mover.index()] = mv.to;
        }
        // A rook leaving its origin square clears the matching flag, and so
        // does a capture landing on it.
        self.clear_rook_origin_rights(mv.from);
        self.clear_rook_origin_rights(mv.to);

        self.side_to_move = mover.opposite();
        self.move_log.push(mv);
        let key = self.repetition_key();
        self.position_history.push(key);
        self.updated_at = Utc::now();

        self.recompute_status()?;
        Ok(())
    }

    /// End the game by resignation. The non-resigning side wins.
    pub fn resign(&mut self, loser: Color) -> Result<(), RejectReason> {
        if self.status.is_terminal() {
            return Err(RejectReason::GameAlreadyTerminal);
        }
        self.status = Status::Resigned {
            winner: loser.opposite(),
        };
        self.updated_at = Utc::now();
        info!("game over: {loser:?} resigned");
        Ok(())
    }

    /// End the game as a draw by mutual agreement.
    pub fn draw_by_agreement(&mut self) -> Result<(), RejectReason> {
        if self.status.is_terminal() {
            return Err(RejectReason::GameAlreadyTerminal);
        }
        self.status = Status::Draw {
            reason: DrawReason::Agreement,
        };
        self.updated_at = Utc::now();
        info!("game over: draw by agreement");
        Ok(())
    }

    /// Rebuild a game from the start by re-validating a recorded move list.
    /// Promotion needs no annotation: the policy is auto-queen.
    pub fn replay(moves: &[(Square, Square)]) -> Result<GameRecord, MoveError> {
        let mut record = GameRecord::new_game();
        for &(from, to) in moves {
            record.propose(from, to)?;
        }
        Ok(record)
    }

    fn clear_rook_origin_rights(&mut self, square: Square) {
        for color in [Color::White, Color::Black] {
            if square.rank != color.back_rank() {
                continue;
            }
            let rights = &mut self.castling_rights[color.index()];
            match square.file {
                0 => rights.queen_side = false,
                7 => rights.king_side = false,
                _ => {}
            }
        }
    }

    /// First four FEN fields: board layout, side to move, rights, en-passant
    /// target. Two positions repeat iff these agree.
    fn repetition_key(&self) -> String {
        let full = fen::generate_fen(self);
        full.split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Derive the status for the new side to move. Checkmate and stalemate
    /// take precedence over the clock and repetition rules.
    fn recompute_status(&mut self) -> Result<(), InternalError> {
        let defender = self.side_to_move;
        if !validate::has_any_legal_move(self)? {
            let hint = Some(self.king_positions[defender.index()]);
            self.status = if check::in_check(&self.board, defender, hint)? {
                Status::Checkmate {
                    winner: defender.opposite(),
                }
            } else {
                Status::Draw {
                    reason: DrawReason::Stalemate,
                }
            };
        } else if self.halfmove_clock >= FIFTY_MOVE_HALFMOVE_LIMIT {
            self.status = Status::Draw {
                reason: DrawReason::FiftyMoveRule,
            };
        } else if self.current_position_repetitions() >= 3 {
            self.status = Status::Draw {
                reason: DrawReason::ThreefoldRepetition,
            };
        }
        if self.status.is_terminal() {
            info!("game over: {:?}", self.status);
        }
        Ok(())
    }

    fn current_position_repetitions(&self) -> usize {
        let Some(current) = self.position_history.last() else {
            return 0;
        };
        self.position_history
            .iter()
            .filter(|key| *key == current)
            .count()
    }

    /// Moves that were en-passant captures keep their kind in the log; this
    /// helper exposes the log in the plain (from, to) exchange shape.
    pub fn move_list(&self) -> Vec<(Square, Square)> {
        self.move_log.iter().map(|mv| (mv.from, mv.to)).collect()
    }
}
