//! Error types for chess-review-core

use thiserror::Error;

use crate::engine::EngineError;
use crate::parser::PgnError;

#[derive(Error, Debug)]
pub enum Error {
    /// The caller sent something we can't analyze (bad PGN, bad depth).
    #[error("{0}")]
    InvalidInput(String),

    /// The engine could not be started or stopped talking sensibly.
    #[error("{0}")]
    EngineUnavailable(#[from] EngineError),

    #[error("{0}")]
    Unexpected(String),
}

impl From<PgnError> for Error {
    fn from(error: PgnError) -> Self {
        Error::InvalidInput(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
