//! Whole-game analysis: replays a PGN against an engine and flags
//! mistakes and blunders by how much each move costs the mover.

use serde::Serialize;

use crate::engine::{EngineLauncher, Evaluator, GameLine};
use crate::error::{Error, Result};
use crate::parser::{move_to_uci, parse_game, play_and_notate};

/// Depth used when the caller doesn't ask for one
pub const DEFAULT_DEPTH: u32 = 10;

/// A move losing at least this many centipawns is a mistake
pub const MISTAKE_THRESHOLD: i32 = -150;

/// A move losing at least this many centipawns is a blunder
pub const BLUNDER_THRESHOLD: i32 = -300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveClass {
    Mistake,
    Blunder,
}

/// Classifies a score change (from the mover's point of view).
pub fn classify(score_change: i32) -> Option<MoveClass> {
    if score_change <= BLUNDER_THRESHOLD {
        Some(MoveClass::Blunder)
    } else if score_change <= MISTAKE_THRESHOLD {
        Some(MoveClass::Mistake)
    } else {
        None
    }
}

/// Engine verdict for one ply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEvaluation {
    /// 1-based ply number
    pub ply: usize,
    /// Move in UCI notation (e.g., "e2e4")
    #[serde(rename = "move")]
    pub mv: String,
    /// Move in SAN notation (e.g., "Nf3+")
    pub san: String,
    /// Score before the move, side to move's view
    pub score_before: i32,
    /// Score after the move, mover's view
    pub score_after: i32,
    pub score_change: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedMove {
    pub ply: usize,
    #[serde(rename = "move")]
    pub mv: String,
    pub san: String,
    pub score_change: i32,
    #[serde(rename = "type")]
    pub class: MoveClass,
}

impl FlaggedMove {
    fn new(evaluation: &MoveEvaluation, class: MoveClass) -> Self {
        Self {
            ply: evaluation.ply,
            mv: evaluation.mv.clone(),
            san: evaluation.san.clone(),
            score_change: evaluation.score_change,
            class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub evaluations: Vec<MoveEvaluation>,
    pub mistakes: Vec<FlaggedMove>,
    pub blunders: Vec<FlaggedMove>,
    pub total_moves: usize,
}

/// Runs games through an engine, one engine session per game
pub struct GameAnalyzer<'a> {
    launcher: &'a dyn EngineLauncher,
    max_depth: Option<u32>,
}

impl<'a> GameAnalyzer<'a> {
    pub fn new(launcher: &'a dyn EngineLauncher) -> Self {
        Self {
            launcher,
            max_depth: None,
        }
    }

    /// Rejects requests searching deeper than `max_depth`
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Analyzes every mainline move of the first game in `pgn`.
    ///
    /// Each ply costs two engine searches: one on the position before the
    /// move and one after it. Either the whole game is analyzed or an error
    /// is returned; there are no partial results.
    pub fn analyze(&self, pgn: &str, depth: u32) -> Result<AnalysisResult> {
        self.check_depth(depth)?;

        let game = parse_game(pgn)?;
        tracing::info!(
            game = %game.summary(),
            plies = game.move_count(),
            depth,
            "Analyzing game"
        );

        // Dropped on every return path below, which shuts the engine down.
        let mut engine = self.launcher.launch()?;

        let start = game.initial_position;
        let mut board = start.clone();
        let total_moves = game.moves.len();
        let mut played: Vec<String> = Vec::with_capacity(total_moves);
        let mut evaluations = Vec::with_capacity(total_moves);
        let mut mistakes = Vec::new();
        let mut blunders = Vec::new();

        for (i, mv) in game.moves.into_iter().enumerate() {
            let before = GameLine {
                start: &start,
                moves: &played,
                position: &board,
            };
            let score_before = score(engine.as_mut(), &before, depth)?;

            let uci = move_to_uci(&mv);
            let san = play_and_notate(&mut board, mv);
            played.push(uci.clone());

            // The side to move flipped; negate back to the mover's view.
            let after = GameLine {
                start: &start,
                moves: &played,
                position: &board,
            };
            let score_after = -score(engine.as_mut(), &after, depth)?;

            let evaluation = MoveEvaluation {
                ply: i + 1,
                mv: uci,
                san,
                score_before,
                score_after,
                score_change: score_after - score_before,
            };
            tracing::debug!(
                ply = evaluation.ply,
                san = %evaluation.san,
                change = evaluation.score_change,
                "Move scored"
            );

            match classify(evaluation.score_change) {
                Some(MoveClass::Blunder) => blunders.push(FlaggedMove::new(&evaluation, MoveClass::Blunder)),
                Some(MoveClass::Mistake) => mistakes.push(FlaggedMove::new(&evaluation, MoveClass::Mistake)),
                None => {}
            }
            evaluations.push(evaluation);
        }

        tracing::info!(
            plies = total_moves,
            mistakes = mistakes.len(),
            blunders = blunders.len(),
            "Analysis complete"
        );

        Ok(AnalysisResult {
            success: true,
            evaluations,
            mistakes,
            blunders,
            total_moves,
        })
    }

    fn check_depth(&self, depth: u32) -> Result<()> {
        if depth == 0 {
            return Err(Error::InvalidInput("Depth must be a positive integer".into()));
        }
        match self.max_depth {
            Some(max) if depth > max => Err(Error::InvalidInput(format!(
                "Depth must be at most {}",
                max
            ))),
            _ => Ok(()),
        }
    }
}

/// Engine score in centipawns for the side to move, 0 when unscored
fn score(engine: &mut (dyn Evaluator + Send), line: &GameLine<'_>, depth: u32) -> Result<i32> {
    let evaluation = engine.evaluate(line, depth)?;
    Ok(evaluation.map(|e| e.centipawns()).unwrap_or(0))
}
