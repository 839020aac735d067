//! Crate root module declarations for the rookery game-service core.
//!
//! This file exposes all top-level subsystems (game state, rule validation,
//! the game store and event fan-out, external engine integration, and utility
//! helpers) so binaries, tests, and a surrounding transport layer can import
//! stable module paths.

pub mod game_state {
    pub mod board;
    pub mod chess_types;
    pub mod game_record;
}

pub mod rules {
    pub mod check;
    pub mod geometry;
    pub mod validate;
}

pub mod service {
    pub mod events;
    pub mod snapshot;
    pub mod store;
}

pub mod engine {
    pub mod process;
    pub mod protocol;
}

pub mod utils {
    pub mod fen;
    pub mod render;
}

pub mod errors;
