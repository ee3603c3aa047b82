//! PGN parsing functionality

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, Move, Position};
use std::io::Cursor;
use std::ops::ControlFlow;

/// Header tags we keep from a game
#[derive(Debug, Clone, Default)]
pub struct GameTags {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub white_elo: Option<u16>,
    pub black_elo: Option<u16>,
    pub fen: Option<String>,
    /// Number of tag pairs seen, including ones we don't store
    count: usize,
}

/// A parsed game: the position it starts from and its mainline moves
#[derive(Debug, Clone)]
pub struct ParsedGame {
    pub tags: GameTags,
    pub initial_position: Chess,
    pub moves: Vec<Move>,
}

impl ParsedGame {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn summary(&self) -> String {
        let white = self.tags.white.as_deref().unwrap_or("Unknown");
        let black = self.tags.black.as_deref().unwrap_or("Unknown");
        let result = self.tags.result.as_deref().unwrap_or("*");
        format!("{} vs {} - {}", white, black, result)
    }
}

struct GameMoves {
    tags: GameTags,
    initial_position: Chess,
    position: Chess,
    moves: Vec<Move>,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Result<ParsedGame, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();
        tags.count += 1;

        match name_str.as_ref() {
            "Event" => tags.event = Some(value_str),
            "Site" => tags.site = Some(value_str),
            "Date" => tags.date = Some(value_str),
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            "WhiteElo" => tags.white_elo = value_str.parse().ok(),
            "BlackElo" => tags.black_elo = value_str.parse().ok(),
            "FEN" => tags.fen = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let initial_position = match tags.fen.as_deref() {
            Some(fen) => match position_from_fen(fen) {
                Ok(position) => position,
                Err(e) => return ControlFlow::Break(Err(e)),
            },
            None => Chess::default(),
        };

        ControlFlow::Continue(GameMoves {
            tags,
            position: initial_position.clone(),
            initial_position,
            moves: Vec::new(),
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        let ply = movetext.moves.len() + 1;
        let illegal = || PgnError::IllegalMove {
            ply,
            san: san.to_string(),
        };

        let m = match san.san.to_move(&movetext.position) {
            Ok(m) => m,
            Err(_) => return ControlFlow::Break(Err(illegal())),
        };

        match movetext.position.clone().play(m.clone()) {
            Ok(new_pos) => {
                movetext.position = new_pos;
                movetext.moves.push(m);
                ControlFlow::Continue(())
            }
            Err(_) => ControlFlow::Break(Err(illegal())),
        }
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        if movetext.tags.count == 0 && movetext.moves.is_empty() {
            return Err(PgnError::NoGamesFound);
        }

        Ok(ParsedGame {
            tags: movetext.tags,
            initial_position: movetext.initial_position,
            moves: movetext.moves,
        })
    }
}

fn position_from_fen(fen: &str) -> Result<Chess, PgnError> {
    let parsed: Fen = fen
        .parse()
        .map_err(|_| PgnError::InvalidFen(fen.to_string()))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|_| PgnError::InvalidFen(fen.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("Invalid PGN")]
    NoGamesFound,
    #[error("Illegal move {san} at ply {ply}")]
    IllegalMove { ply: usize, san: String },
    #[error("Invalid FEN tag: {0}")]
    InvalidFen(String),
    #[error("Invalid PGN: unexpected '{0}' in movetext")]
    UnexpectedToken(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Parses the first game found in `pgn`.
///
/// Only the mainline is kept; variations are skipped and comments dropped.
/// Anything in the mainline that is not a move, move number, annotation or
/// result rejects the whole game.
pub fn parse_game(pgn: &str) -> Result<ParsedGame, PgnError> {
    check_movetext(pgn)?;

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    match reader.read_game(&mut GameParser) {
        Ok(Some(game)) => game,
        Ok(None) => Err(PgnError::NoGamesFound),
        Err(e) => Err(PgnError::ParseError(e.to_string())),
    }
}

/// Finds the first mainline token of the first game that the reader would
/// skip without telling the visitor.
fn check_movetext(pgn: &str) -> Result<(), PgnError> {
    let bytes = pgn.trim_start_matches('\u{feff}').as_bytes();
    let mut i = 0;
    let mut in_movetext = false;
    let mut line_start = true;
    let mut depth = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if line_start && b == b'%' {
            i = skip_past(bytes, i, b'\n');
            continue;
        }
        line_start = false;

        match b {
            b'\n' => {
                // A blank line or the next tag section ends the game.
                let next = &bytes[i + 1..];
                if in_movetext && (next.starts_with(b"\n") || next.starts_with(b"\r\n") || next.starts_with(b"[")) {
                    break;
                }
                line_start = true;
                i += 1;
            }
            b' ' | b'\t' | b'\r' => i += 1,
            b'[' if !in_movetext => i = skip_tag(bytes, i),
            b'{' => {
                in_movetext = true;
                i = skip_past(bytes, i, b'}');
            }
            b';' => {
                in_movetext = true;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'(' => {
                in_movetext = true;
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            _ => {
                in_movetext = true;
                let start = i;
                while i < bytes.len() && !matches!(bytes[i], b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'(' | b')' | b';') {
                    i += 1;
                }
                let token = String::from_utf8_lossy(&bytes[start..i]);
                if depth == 0 && !is_movetext_token(&token) {
                    return Err(PgnError::UnexpectedToken(token.into_owned()));
                }
            }
        }
    }

    Ok(())
}

/// Index just past the next `end` byte after `i`, or the end of input
fn skip_past(bytes: &[u8], i: usize, end: u8) -> usize {
    bytes[i + 1..]
        .iter()
        .position(|&b| b == end)
        .map_or(bytes.len(), |offset| i + offset + 2)
}

/// Skips a `[Name "value"]` tag pair; brackets inside the quoted value don't count.
fn skip_tag(bytes: &[u8], mut i: usize) -> usize {
    let mut quoted = false;
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quoted => i += 1,
            b'"' => quoted = !quoted,
            b']' if !quoted => return i + 1,
            b'\n' => return i,
            _ => {}
        }
        i += 1;
    }
    i
}

fn is_movetext_token(token: &str) -> bool {
    if matches!(token, "1-0" | "0-1" | "1/2-1/2" | "½-½" | "*") {
        return true;
    }
    if let Some(nag) = token.strip_prefix('$') {
        return !nag.is_empty() && nag.bytes().all(|b| b.is_ascii_digit());
    }

    // Move numbers, alone ("12.", "12...") or glued to the move ("12.Nf3")
    let unnumbered = token.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = if unnumbered.len() < token.len() && (unnumbered.is_empty() || unnumbered.starts_with('.')) {
        unnumbered
    } else {
        token
    };
    let rest = rest.trim_start_matches('.');

    // Suffix annotations such as "!?" or "$1"
    let end = rest.find(['!', '?', '$', '*']).unwrap_or(rest.len());
    let (san, annotations) = rest.split_at(end);
    if !annotations
        .bytes()
        .all(|b| matches!(b, b'!' | b'?' | b'$' | b'*' | b'0'..=b'9'))
    {
        return false;
    }

    let san = san.trim_end_matches('.');
    san.is_empty()
        || matches!(san.trim_end_matches(['+', '#']), "0-0" | "0-0-0")
        || SanPlus::from_ascii(san.as_bytes()).is_ok()
}
