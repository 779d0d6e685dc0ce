/// Server configuration, read once from the environment at startup and
/// passed explicitly to everything that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub leaderboard_capacity: usize,
    pub busy_timeout_ms: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "umbral-spire.db".into()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            leaderboard_capacity: std::env::var("LEADERBOARD_CAPACITY")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(100),
            busy_timeout_ms: std::env::var("DB_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(5000),
        }
    }
}
