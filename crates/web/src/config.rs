use std::env;

use chess_review_core::DEFAULT_DEPTH;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub stockfish_path: String,
    pub default_depth: u32,
    pub max_depth: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            stockfish_path: env::var("STOCKFISH_PATH").unwrap_or_else(|_| "stockfish".to_string()),
            default_depth: env::var("DEFAULT_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|d| *d > 0)
                .unwrap_or(DEFAULT_DEPTH),
            max_depth: env::var("MAX_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|d| *d > 0)
                .unwrap_or(30),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            stockfish_path: "stockfish".to_string(),
            default_depth: DEFAULT_DEPTH,
            max_depth: 30,
        }
    }
}
