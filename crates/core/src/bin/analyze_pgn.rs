//! Analyze a PGN file from the command line and print the result as JSON

use chess_review_core::{GameAnalyzer, StockfishLauncher, DEFAULT_DEPTH};

fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| {
        eprintln!("Usage: analyze-pgn <game.pgn> [depth]");
        std::process::exit(1);
    });

    let depth = match args.next() {
        Some(d) => d.parse().unwrap_or_else(|_| {
            eprintln!("Depth must be a positive integer, got '{}'", d);
            std::process::exit(1);
        }),
        None => DEFAULT_DEPTH,
    };

    let pgn = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path, e);
        std::process::exit(1);
    });

    let engine_path = std::env::var("STOCKFISH_PATH").unwrap_or_else(|_| "stockfish".to_string());
    let launcher = StockfishLauncher::new(engine_path);

    match GameAnalyzer::new(&launcher).analyze(&pgn, depth) {
        Ok(result) => {
            eprintln!(
                "{} moves, {} mistakes, {} blunders",
                result.total_moves,
                result.mistakes.len(),
                result.blunders.len()
            );
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to encode result: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            std::process::exit(1);
        }
    }
}
