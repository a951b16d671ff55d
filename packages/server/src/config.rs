use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Shared secret the external scheduler must present as a Bearer token
    /// on every /cron endpoint.
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SettlementConfig {
    /// Picks must be submitted at least this many minutes before post time.
    pub close_margin_mins: i64,
    /// Delay between winner notifications during contest closing, to respect
    /// downstream dispatch rate limits.
    pub notify_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContestConfig {
    /// Minimum settled votes to be ranked in a weekly contest.
    pub weekly_min_votes: i32,
    /// Minimum settled votes to be ranked in a monthly contest.
    pub monthly_min_votes: i32,
    /// Chunk size for bulk writes (reset snapshots, audit rows, enrollment).
    pub batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub settlement: SettlementConfig,
    pub contest: ContestConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("settlement.close_margin_mins", 5)?
            .set_default("settlement.notify_delay_ms", 500)?
            .set_default("contest.weekly_min_votes", 3)?
            .set_default("contest.monthly_min_votes", 5)?
            .set_default("contest.batch_size", 500)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PADDOCK__SCHEDULER__SECRET)
            .add_source(Environment::with_prefix("PADDOCK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
