//! Demo binary: self-play a random game through the service layer, then
//! print the move list, the final board, and the final snapshot as JSON.

use std::process::ExitCode;

use log::error;
use rand::prelude::IndexedRandom;

use rookery::service::store::{GameStore, ServiceError};
use rookery::utils::render::render_board;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("self-play failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServiceError> {
    let store = GameStore::new();
    let events = store.subscribe();
    let (id, _) = store.create_game();
    println!("game {id:#x}");

    let mut rng = rand::rng();
    loop {
        let state = store.get_state(id, None)?;
        if state.status.is_terminal() {
            break;
        }
        let candidates = store.legal_moves(id)?;
        let Some(choice) = candidates.choose(&mut rng) else {
            break;
        };
        store.propose_move(id, choice.from, choice.to, state.side_to_move)?;
    }

    let moves: Vec<String> = events
        .try_iter()
        .map(|event| format!("{}{}", event.from, event.to))
        .collect();
    println!("{}", moves.join(" "));

    let final_state = store.get_state(id, None)?;
    let last_board = {
        use rookery::game_state::game_record::GameRecord;
        GameRecord::replay(
            &final_state
                .moves
                .iter()
                .map(|mv| (mv.from, mv.to))
                .collect::<Vec<_>>(),
        )
        .map_err(ServiceError::from)?
        .board
    };
    println!("{}", render_board(&last_board));
    println!("{}", store.get_fen(id)?);

    match serde_json::to_string_pretty(&final_state) {
        Ok(json) => println!("{json}"),
        Err(err) => error!("snapshot serialization failed: {err}"),
    }
    Ok(())
}
