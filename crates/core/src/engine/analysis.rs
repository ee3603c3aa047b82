//! Types for representing engine output

use std::fmt;

/// Centipawn magnitude assigned to a forced mate.
pub const MATE_SCORE: i32 = 10_000;

/// An engine score, relative to the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn score (positive = side to move is better)
    Centipawns(i32),
    /// Forced mate in N moves (positive = side to move mates).
    /// `Mate(0)` means the side to move is already mated.
    Mate(i32),
}

impl Evaluation {
    /// Converts the score to centipawns, mapping mates to `MATE_SCORE`
    /// minus the distance so that quicker mates score higher.
    pub fn centipawns(&self) -> i32 {
        match *self {
            Evaluation::Centipawns(cp) => cp,
            Evaluation::Mate(moves) if moves > 0 => MATE_SCORE - moves,
            Evaluation::Mate(moves) => -MATE_SCORE - moves,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// Complete engine answer for one position
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    /// Best move found, empty when the position has no legal moves
    pub best_move: String,
    /// Score from the last `info` line carrying one
    pub evaluation: Option<Evaluation>,
    /// Analysis depth reached
    pub depth: u32,
    /// Principal variation (best line of play)
    pub pv: Vec<String>,
    /// Time spent analyzing (milliseconds)
    pub time_ms: u64,
    /// Nodes searched
    pub nodes: u64,
}

impl PositionAnalysis {
    /// Returns a brief summary of the analysis
    pub fn summary(&self) -> String {
        let eval = self
            .evaluation
            .map(|e| e.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "Eval: {} | Best: {} | Depth: {} | PV: {}",
            eval,
            self.best_move,
            self.depth,
            self.pv.iter().take(5).cloned().collect::<Vec<_>>().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centipawns_pass_through() {
        assert_eq!(Evaluation::Centipawns(35).centipawns(), 35);
        assert_eq!(Evaluation::Centipawns(-120).centipawns(), -120);
    }

    #[test]
    fn test_mate_scores() {
        assert_eq!(Evaluation::Mate(1).centipawns(), 9_999);
        assert_eq!(Evaluation::Mate(3).centipawns(), 9_997);
        assert_eq!(Evaluation::Mate(-2).centipawns(), -9_998);
        assert_eq!(Evaluation::Mate(0).centipawns(), -MATE_SCORE);
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Centipawns(-150).to_string(), "-1.50");
        assert_eq!(Evaluation::Mate(-4).to_string(), "M-4");
    }
}
