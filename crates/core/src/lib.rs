//! Chess Review Core Library
//!
//! Replays PGN games against a UCI engine and flags the moves that cost
//! the mover the most.

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod parser;

pub use analyzer::{
    classify, AnalysisResult, FlaggedMove, GameAnalyzer, MoveClass, MoveEvaluation, DEFAULT_DEPTH,
};
pub use engine::{EngineError, EngineLauncher, Evaluation, Evaluator, GameLine, StockfishLauncher};
pub use error::{Error, Result};
