//! Move notation helpers

use shakmaty::{san::SanPlus, Chess, File, Move, Role, Square};

/// Convert shakmaty Move to UCI string
///
/// Castling is written as the king's two-square step (`e1g1`), which is what
/// engines expect in standard chess.
pub fn move_to_uci(mv: &Move) -> String {
    match mv {
        Move::Normal { from, to, promotion, .. } => {
            let promo = promotion
                .map(|r| match r {
                    Role::Queen => "q",
                    Role::Rook => "r",
                    Role::Bishop => "b",
                    Role::Knight => "n",
                    _ => "",
                })
                .unwrap_or("");
            format!("{}{}{}", from, to, promo)
        }
        Move::EnPassant { from, to, .. } => format!("{}{}", from, to),
        Move::Castle { king, rook } => {
            let king_to = if rook.file() > king.file() {
                Square::from_coords(File::G, king.rank())
            } else {
                Square::from_coords(File::C, king.rank())
            };
            format!("{}{}", king, king_to)
        }
        Move::Put { .. } => String::new(),
    }
}

/// Plays `mv` on `position` and returns its SAN (with `+`/`#` suffix)
/// as seen from the position before the move.
///
/// `mv` must be legal in `position`; moves coming out of the PGN parser
/// already are.
pub fn play_and_notate(position: &mut Chess, mv: Move) -> String {
    SanPlus::from_move_and_play_unchecked(position, mv).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, san::San, CastlingMode, Position};

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn san_move(position: &Chess, san: &str) -> Move {
        san.parse::<San>().unwrap().to_move(position).unwrap()
    }

    #[test]
    fn test_normal_move() {
        let mut pos = Chess::default();
        let mv = san_move(&pos, "Nf3");
        assert_eq!(move_to_uci(&mv), "g1f3");
        assert_eq!(play_and_notate(&mut pos, mv), "Nf3");
        assert_eq!(pos.turn(), shakmaty::Color::Black);
    }

    #[test]
    fn test_castling_uses_king_step() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(move_to_uci(&san_move(&pos, "O-O")), "e1g1");
        assert_eq!(move_to_uci(&san_move(&pos, "O-O-O")), "e1c1");
    }

    #[test]
    fn test_promotion() {
        let pos = position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert_eq!(move_to_uci(&san_move(&pos, "e8=N")), "e7e8n");
    }

    #[test]
    fn test_notation_carries_check_and_mate() {
        let mut pos = position("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        let mv = san_move(&pos, "Qxf7");
        assert_eq!(play_and_notate(&mut pos, mv), "Qxf7#");
        assert!(pos.is_checkmate());
    }
}
