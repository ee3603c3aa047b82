//! PGN parsing and move replay

pub mod moves;
pub mod pgn;

pub use moves::{move_to_uci, play_and_notate};
pub use pgn::{parse_game, ParsedGame, PgnError};
