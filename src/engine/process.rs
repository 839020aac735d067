//! External engine child process management.
//!
//! Spawns the engine binary with piped stdio, runs the `uci`/`isready`
//! handshake, and exposes the per-position query. The process is asked to
//! quit on drop; a wedged engine is killed rather than waited on forever.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::debug;

use crate::engine::protocol::{query_best_move, BestMove, EngineError, SearchLimit};

pub struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl EngineProcess {
    /// Spawn `program` and complete the startup handshake.
    pub fn spawn(program: &str) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdin = child.stdin.take().ok_or(EngineError::StdioUnavailable)?;
        let stdout = child.stdout.take().ok_or(EngineError::StdioUnavailable)?;

        let mut process = EngineProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        process.send("uci")?;
        process.wait_for("uciok")?;
        process.send("isready")?;
        process.wait_for("readyok")?;
        Ok(process)
    }

    /// Reset the engine between games.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send("ucinewgame")?;
        self.send("isready")?;
        self.wait_for("readyok")
    }

    /// Set the engine's playing-strength option, for engines that expose it.
    pub fn set_skill_level(&mut self, level: u8) -> Result<(), EngineError> {
        self.send(&format!("setoption name Skill Level value {level}"))
    }

    /// Ask for the best move in a position. The reply is untrusted and must
    /// be re-validated before being applied to any game.
    pub fn best_move(&mut self, fen: &str, limit: SearchLimit) -> Result<BestMove, EngineError> {
        query_best_move(&mut self.stdout, &mut self.stdin, fen, limit)
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        debug!("engine <- {command}");
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn wait_for(&mut self, expected: &'static str) -> Result<(), EngineError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(EngineError::HandshakeFailed(expected));
            }
            let trimmed = line.trim();
            debug!("engine -> {trimmed}");
            if trimmed == expected {
                return Ok(());
            }
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // Polite shutdown first; reap the child either way.
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                let _ = self.child.kill();
                let _ = self.child.wait();
            }
        }
    }
}
