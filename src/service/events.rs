//! Broadcast of applied-move events to subscribers.
//!
//! Subscribers receive every successfully applied move; rejected proposals
//! never produce an event. Delivery uses plain mpsc channels and a sender
//! list that drops entries whose receiver has gone away.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use serde::Serialize;

use crate::game_state::chess_types::{Piece, Square, Status};

/// Rank-major grid of optional pieces as sent over the wire. Row 0 is the
/// top rank from the viewer's perspective.
pub type BoardGrid = Vec<Vec<Option<Piece>>>;

/// Published after each committed move, carrying the post-move position.
#[derive(Debug, Clone, Serialize)]
pub struct MoveEvent {
    pub game_id: u64,
    pub from: Square,
    pub to: Square,
    pub board: BoardGrid,
    pub status: Status,
}

/// Fan-out hub for [`MoveEvent`]s.
#[derive(Debug, Default)]
pub struct EventHub {
    senders: Mutex<Vec<Sender<MoveEvent>>>,
}

impl EventHub {
    pub fn new() -> Self {
        EventHub::default()
    }

    pub fn subscribe(&self) -> Receiver<MoveEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Deliver to every live subscriber, pruning the ones that hung up.
    pub fn broadcast(&self, event: &MoveEvent) {
        self.senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::{Color, PieceKind};

    fn sample_event() -> MoveEvent {
        MoveEvent {
            game_id: 7,
            from: "e2".parse().expect("square parses"),
            to: "e4".parse().expect("square parses"),
            board: vec![vec![Some(Piece::new(Color::White, PieceKind::Pawn)); 8]; 8],
            status: Status::Ongoing,
        }
    }

    #[test]
    fn every_subscriber_receives_each_event() {
        let hub = EventHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();
        hub.broadcast(&sample_event());
        assert_eq!(a.recv().expect("event delivered").game_id, 7);
        assert_eq!(b.recv().expect("event delivered").game_id, 7);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let hub = EventHub::new();
        let keep = hub.subscribe();
        drop(hub.subscribe());
        hub.broadcast(&sample_event());
        hub.broadcast(&sample_event());
        assert_eq!(keep.try_iter().count(), 2);
    }

    #[test]
    fn event_serializes_with_wire_tokens() {
        let json = serde_json::to_value(sample_event()).expect("event serializes");
        assert_eq!(json["from"], "e2");
        assert_eq!(json["board"][0][0], "wp");
        assert_eq!(json["status"], "ongoing");
    }
}
