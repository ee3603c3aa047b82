//! Stockfish chess engine interface
//!
//! Spawns Stockfish as a subprocess and communicates via UCI protocol.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use shakmaty::{fen::Fen, EnPassantMode};

use super::analysis::{Evaluation, PositionAnalysis};
use super::{EngineError, EngineLauncher, Evaluator, GameLine};

/// Maximum number of lines to read while waiting for a handshake reply.
pub const MAX_UCI_LINES: usize = 1000;

/// How long `quit` waits for the process to exit on its own.
const QUIT_GRACE: Duration = Duration::from_millis(100);

/// Wrapper around Stockfish chess engine
pub struct StockfishEngine {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout reader for receiving responses
    stdout: BufReader<ChildStdout>,
    /// Engine name reported by `id name`
    name: String,
    closed: bool,
}

impl StockfishEngine {
    /// Creates a new Stockfish engine instance
    ///
    /// # Arguments
    /// * `path` - Path to stockfish binary (or "stockfish" if in PATH)
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = StockfishEngine::new("stockfish")?;
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::from_command(Command::new(path.as_ref()))
    }

    /// Spawns the engine from a prepared command and performs the UCI
    /// handshake. Stdio is overridden.
    pub fn from_command(mut command: Command) -> Result<Self, EngineError> {
        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Spawn(e.to_string()))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdout".into()))?;

        let mut engine = StockfishEngine {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
            closed: false,
        };

        // A failed handshake still drops `engine`, which reaps the child.
        engine.init_uci()?;
        tracing::debug!(engine = %engine.name, pid = engine.process.id(), "Engine ready");

        Ok(engine)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends a command to the engine
    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads a line from the engine
    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::Terminated);
        }
        Ok(line.trim().to_string())
    }

    /// Reads lines until we get the expected response
    fn read_until(&mut self, expected: &str) -> Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        while lines.len() < MAX_UCI_LINES {
            let line = self.read_line()?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
        Err(EngineError::Protocol(format!(
            "no '{}' after {} lines",
            expected, MAX_UCI_LINES
        )))
    }

    /// Initialize UCI protocol
    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        let lines = self.read_until("uciok")?;
        self.name = lines
            .iter()
            .find_map(|l| l.strip_prefix("id name "))
            .unwrap_or("unknown")
            .to_string();

        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    /// Sets a position from a FEN string
    ///
    /// # Arguments
    /// * `fen` - FEN string, or None for starting position
    /// * `moves` - Optional list of moves to play from the position
    pub fn set_position(&mut self, fen: Option<&str>, moves: Option<&[String]>) -> Result<(), EngineError> {
        let pos_str = match fen {
            Some(f) => format!("position fen {}", f),
            None => "position startpos".to_string(),
        };

        let cmd = match moves {
            Some(m) if !m.is_empty() => format!("{} moves {}", pos_str, m.join(" ")),
            _ => pos_str,
        };

        self.send(&cmd)
    }

    /// Analyzes the current position
    ///
    /// # Arguments
    /// * `depth` - How many moves ahead to search
    ///
    /// # Returns
    /// Analysis results including best move and evaluation
    pub fn analyze(&mut self, depth: u32) -> Result<PositionAnalysis, EngineError> {
        self.send(&format!("go depth {}", depth))?;

        let mut analysis = PositionAnalysis {
            best_move: String::new(),
            evaluation: None,
            depth: 0,
            pv: Vec::new(),
            time_ms: 0,
            nodes: 0,
        };

        // Read until we get bestmove
        loop {
            let line = self.read_line()?;

            if line.starts_with("bestmove") {
                // Parse: "bestmove e2e4 ponder e7e5" or "bestmove (none)"
                match line.split_whitespace().nth(1) {
                    Some("(none)") | None => {}
                    Some(mv) => analysis.best_move = mv.to_string(),
                }
                break;
            } else if line.starts_with("info") && !line.starts_with("info string") {
                parse_info_line(&line, &mut analysis);
            }
        }

        Ok(analysis)
    }

    /// Quit the engine cleanly, killing it if it lingers
    pub fn quit(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // The engine may already be gone; we still need to reap it.
        let sent = self.send("quit");

        let mut waited = Duration::ZERO;
        let step = Duration::from_millis(10);
        while waited < QUIT_GRACE {
            if self.process.try_wait()?.is_some() {
                return sent;
            }
            thread::sleep(step);
            waited += step;
        }

        tracing::debug!(pid = self.process.id(), "Engine ignored quit, killing");
        let _ = self.process.kill();
        self.process.wait()?;
        sent
    }
}

/// Parses an info line from the engine into `analysis`
fn parse_info_line(line: &str, analysis: &mut PositionAnalysis) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                if i + 1 < parts.len() {
                    analysis.depth = parts[i + 1].parse().unwrap_or(analysis.depth);
                }
                i += 2;
            }
            "score" => {
                if i + 2 < parts.len() {
                    match (parts[i + 1], parts[i + 2].parse::<i32>()) {
                        ("cp", Ok(cp)) => analysis.evaluation = Some(Evaluation::Centipawns(cp)),
                        ("mate", Ok(m)) => analysis.evaluation = Some(Evaluation::Mate(m)),
                        _ => {}
                    }
                }
                i += 3;
            }
            "time" => {
                if i + 1 < parts.len() {
                    analysis.time_ms = parts[i + 1].parse().unwrap_or(0);
                }
                i += 2;
            }
            "nodes" => {
                if i + 1 < parts.len() {
                    analysis.nodes = parts[i + 1].parse().unwrap_or(0);
                }
                i += 2;
            }
            "pv" => {
                // Everything after "pv" is the principal variation
                analysis.pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                break;
            }
            _ => {
                i += 1;
            }
        }
    }
}

impl Evaluator for StockfishEngine {
    fn evaluate(&mut self, line: &GameLine<'_>, depth: u32) -> Result<Option<Evaluation>, EngineError> {
        let fen = Fen::from_position(line.start, EnPassantMode::Legal).to_string();
        self.set_position(Some(&fen), Some(line.moves))?;
        let analysis = self.analyze(depth)?;
        tracing::trace!(ply = line.moves.len(), "{}", analysis.summary());
        Ok(analysis.evaluation)
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            tracing::debug!(error = %e, "Engine shutdown was not clean");
        }
    }
}

/// Launches one Stockfish process per session from a fixed binary path
#[derive(Debug, Clone)]
pub struct StockfishLauncher {
    path: PathBuf,
}

impl StockfishLauncher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EngineLauncher for StockfishLauncher {
    fn launch(&self) -> Result<Box<dyn Evaluator + Send>, EngineError> {
        let engine = StockfishEngine::new(&self.path)?;
        Ok(Box::new(engine))
    }
}
