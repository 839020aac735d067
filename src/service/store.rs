//! In-memory game store with per-game serialized access.
//!
//! Games live behind a map lock plus one lock per record. Lookups clone the
//! record's `Arc` and release the map lock immediately, so slow validation
//! in one game never blocks operations on another. Everything that reads or
//! writes a record does so under that record's lock, which makes each
//! validate-then-apply exchange atomic.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use log::{info, warn};
use rand::Rng;
use thiserror::Error;

use crate::engine::protocol::BestMove;
use crate::errors::{MoveError, RejectReason};
use crate::game_state::chess_types::{CheckedMove, Color, PieceKind, Square};
use crate::game_state::game_record::GameRecord;
use crate::service::events::{EventHub, MoveEvent};
use crate::service::snapshot::{oriented_grid, GameSnapshot};

pub type GameId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("no game with id {0:#x}")]
    GameNotFound(GameId),
    #[error(transparent)]
    Move(#[from] MoveError),
}

impl From<RejectReason> for ServiceError {
    fn from(reason: RejectReason) -> Self {
        ServiceError::Move(MoveError::Rejected(reason))
    }
}

#[derive(Debug, Default)]
pub struct GameStore {
    games: Mutex<HashMap<GameId, Arc<Mutex<GameRecord>>>>,
    events: EventHub,
}

impl GameStore {
    pub fn new() -> Self {
        GameStore::default()
    }

    /// Create a game at the starting position under a fresh random id.
    pub fn create_game(&self) -> (GameId, GameSnapshot) {
        let record = GameRecord::new_game();
        let snapshot = GameSnapshot::of_record(&record, Color::White);

        let mut games = self.lock_games();
        let mut rng = rand::rng();
        let id = loop {
            let candidate: GameId = rng.random();
            if !games.contains_key(&candidate) {
                break candidate;
            }
        };
        games.insert(id, Arc::new(Mutex::new(record)));
        drop(games);

        info!("created game {id:#x}");
        (id, snapshot)
    }

    /// Subscribe to the applied-move event stream for every game.
    pub fn subscribe(&self) -> Receiver<MoveEvent> {
        self.events.subscribe()
    }

    pub fn get_state(
        &self,
        id: GameId,
        viewer: Option<Color>,
    ) -> Result<GameSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let record = lock_record(&entry);
        Ok(GameSnapshot::of_record(
            &record,
            viewer.unwrap_or(Color::White),
        ))
    }

    /// Validate and apply a move on behalf of `proposer`, broadcasting an
    /// event on success. The whole exchange runs under the game's lock.
    pub fn propose_move(
        &self,
        id: GameId,
        from: Square,
        to: Square,
        proposer: Color,
    ) -> Result<GameSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let mut record = lock_record(&entry);
        if record.side_to_move != proposer {
            return Err(RejectReason::NoPieceOrWrongTurn.into());
        }
        let applied = record.propose(from, to).map_err(MoveError::from)?;

        self.events.broadcast(&MoveEvent {
            game_id: id,
            from: applied.from,
            to: applied.to,
            board: oriented_grid(&record.board, Color::White),
            status: record.status,
        });
        Ok(GameSnapshot::of_record(&record, proposer))
    }

    /// Apply a move returned by the external engine. Engine output is
    /// untrusted and goes through exactly the same validation as a user
    /// move; an underpromotion request is noted and coerced to the queen.
    pub fn propose_engine_move(
        &self,
        id: GameId,
        best: &BestMove,
        proposer: Color,
    ) -> Result<GameSnapshot, ServiceError> {
        if let Some(kind) = best.promotion {
            if kind != PieceKind::Queen {
                warn!(
                    "game {id:#x}: engine requested {kind:?} promotion, promoting to queen"
                );
            }
        }
        self.propose_move(id, best.from, best.to, proposer)
    }

    pub fn resign(&self, id: GameId, loser: Color) -> Result<GameSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let mut record = lock_record(&entry);
        record.resign(loser)?;
        Ok(GameSnapshot::of_record(&record, loser))
    }

    pub fn draw_by_agreement(&self, id: GameId) -> Result<GameSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let mut record = lock_record(&entry);
        record.draw_by_agreement()?;
        Ok(GameSnapshot::of_record(&record, Color::White))
    }

    /// Every legal move for the side to move, for client move hints.
    pub fn legal_moves(&self, id: GameId) -> Result<Vec<CheckedMove>, ServiceError> {
        let entry = self.entry(id)?;
        let record = lock_record(&entry);
        Ok(crate::rules::validate::legal_moves(&record).map_err(MoveError::from)?)
    }

    pub fn get_fen(&self, id: GameId) -> Result<String, ServiceError> {
        let entry = self.entry(id)?;
        let record = lock_record(&entry);
        Ok(record.get_fen())
    }

    fn entry(&self, id: GameId) -> Result<Arc<Mutex<GameRecord>>, ServiceError> {
        self.lock_games()
            .get(&id)
            .cloned()
            .ok_or(ServiceError::GameNotFound(id))
    }

    fn lock_games(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<GameId, Arc<Mutex<GameRecord>>>> {
        self.games
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn lock_record(entry: &Arc<Mutex<GameRecord>>) -> std::sync::MutexGuard<'_, GameRecord> {
    entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
