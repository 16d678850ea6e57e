use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, loaded once at startup and passed by
/// reference to every component. Defaults match the deployment the
/// worker was written for (broker host `redis`, paths under `/app`).
#[derive(Clone, Debug)]
pub struct Config {
    pub redis_url: String,
    pub queue: String,
    pub database_path: PathBuf,
    pub export_dir: PathBuf,
    pub connect_attempts: u32,
    pub connect_backoff: Duration,
    pub reconnect_delay: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let redis_url = env_or_fallback("RELATORIA_REDIS_URL", "REDIS_URL")
            .unwrap_or_else(|| "redis://redis:6379".to_string());

        let queue = env_or_fallback("RELATORIA_QUEUE", "QUEUE")
            .unwrap_or_else(|| "fila_relatorios".to_string());

        let database_path = env_or_fallback("RELATORIA_DATABASE_PATH", "DATABASE_PATH")
            .unwrap_or_else(|| "/app/data/empresa.db".to_string());

        let export_dir = env_or_fallback("RELATORIA_EXPORT_DIR", "EXPORT_DIR")
            .unwrap_or_else(|| "/app/export".to_string());

        let connect_attempts: u32 =
            env_or_fallback("RELATORIA_CONNECT_ATTEMPTS", "CONNECT_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5)
                .clamp(1, 100);

        let connect_backoff_secs: u64 =
            env_or_fallback("RELATORIA_CONNECT_BACKOFF_SECS", "CONNECT_BACKOFF_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5);

        let reconnect_delay_secs: u64 =
            env_or_fallback("RELATORIA_RECONNECT_DELAY_SECS", "RECONNECT_DELAY_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5);

        Ok(Self {
            redis_url,
            queue,
            database_path: PathBuf::from(database_path),
            export_dir: PathBuf::from(export_dir),
            connect_attempts,
            connect_backoff: Duration::from_secs(connect_backoff_secs),
            reconnect_delay: Duration::from_secs(reconnect_delay_secs),
        })
    }
}

fn env_or_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var(fallback).ok().filter(|s| !s.trim().is_empty()))
}
