// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};

use dotenvy::dotenv;

use crate::error::AppError;

/// Number of records shown by "my results".
pub const HISTORY_LIMIT: usize = 5;

/// Number of attempts shown on the leaderboard.
pub const LEADERBOARD_LIMIT: usize = 5;

/// Upper bound on answer tokens in a single key or submission.
pub const MAX_ANSWER_TOKENS: usize = 500;

/// Undrained private messages kept per user; older ones are dropped.
pub const OUTBOX_LIMIT: usize = 50;

/// Where the keyed snapshots live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Config(format!("Unknown STORE_BACKEND '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Chat identity of the single administrator.
    pub admin_id: i64,
    pub jwt_secret: String,
    pub store_backend: StoreBackend,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let admin_id = required("ADMIN_ID")?
            .parse::<i64>()
            .map_err(|e| AppError::Config(format!("ADMIN_ID must be an integer: {}", e)))?;

        let jwt_secret = required("JWT_SECRET")?;

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "json".to_string())
            .parse::<StoreBackend>()?;

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Sqlite && database_url.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL must be set when STORE_BACKEND=sqlite".to_string(),
            ));
        }

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is not a socket address: {}", e)))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            admin_id,
            jwt_secret,
            store_backend,
            data_dir,
            database_url,
            bind_addr,
            rust_log,
        })
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{} must be set", name)))
}
