//! Chess engine integration
//!
//! Provides interface to UCI-compatible engines like Stockfish.

pub mod analysis;
pub mod stockfish;

use shakmaty::Chess;
use thiserror::Error;

/// A position reached during a game, together with how the game got there.
///
/// Engines need the moves, not just the final board, to recognise
/// repetitions.
#[derive(Debug, Clone, Copy)]
pub struct GameLine<'a> {
    /// Where the game started
    pub start: &'a Chess,
    /// Moves played from `start`, in UCI notation
    pub moves: &'a [String],
    /// The position those moves lead to
    pub position: &'a Chess,
}

pub use analysis::{Evaluation, PositionAnalysis, MATE_SCORE};
pub use stockfish::{StockfishEngine, StockfishLauncher};

/// Error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    #[error("Failed to start engine: {0}")]
    Spawn(String),
    /// Failed to communicate with engine
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Engine returned unexpected response
    #[error("Engine protocol error: {0}")]
    Protocol(String),
    /// Engine closed its output before answering
    #[error("Engine terminated unexpectedly")]
    Terminated,
}

/// One open engine session.
///
/// Sessions are stateful; a single session must only ever be driven by one
/// analysis at a time. Dropping the session shuts the engine down.
pub trait Evaluator {
    /// Scores the position at the end of `line` relative to its side to
    /// move, searching to `depth`.
    ///
    /// Returns `Ok(None)` when the engine answered without a score.
    fn evaluate(&mut self, line: &GameLine<'_>, depth: u32) -> Result<Option<Evaluation>, EngineError>;
}

/// Starts engine sessions. Each call to `launch` owns a fresh engine.
pub trait EngineLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn Evaluator + Send>, EngineError>;
}
