use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::SchedulerConfig;
use crate::services::similarity::DEFAULT_TIMEOUT_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

impl StoreBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Directory for daily log files; `None` keeps logging on stdout only.
    pub log_dir: Option<PathBuf>,
    pub vocab_path: PathBuf,
    pub store_backend: StoreBackend,
    pub sqlite_path: PathBuf,
    pub similarity_endpoint: Option<String>,
    pub similarity_timeout: Duration,
    pub desktop_mode: bool,
    /// Bearer token -> user id.
    pub api_tokens: HashMap<String, String>,
    pub scheduler: SchedulerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(3000);

        let host = var("HOST")
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = var("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let log_dir = var("ENABLE_FILE_LOGS")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false)
            .then(|| {
                var("LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./logs"))
            });

        let store_backend = match var("STORE_BACKEND").map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "sqlite" => StoreBackend::Sqlite,
            _ => StoreBackend::Memory,
        };

        let defaults = SchedulerConfig::default();
        let scheduler = SchedulerConfig {
            batch_size: parse_var(&var, "BATCH_SIZE")
                .filter(|v: &usize| *v > 0)
                .unwrap_or(defaults.batch_size),
            queue_cap: parse_var(&var, "REVIEW_QUEUE_CAP")
                .filter(|v: &usize| *v > 0)
                .unwrap_or(defaults.queue_cap),
            max_batches_per_cycle: parse_var(&var, "MAX_BATCHES_PER_CYCLE")
                .filter(|v: &u32| *v > 0)
                .unwrap_or(defaults.max_batches_per_cycle),
            ..defaults
        };

        Self {
            host,
            port,
            log_level,
            log_dir,
            vocab_path: var("VOCAB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/vocab.json")),
            store_backend,
            sqlite_path: var("SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/vocab-cycle.db")),
            similarity_endpoint: var("SIMILARITY_ENDPOINT").map(|v| v.trim().to_string()),
            similarity_timeout: Duration::from_millis(
                parse_var(&var, "SIMILARITY_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS),
            ),
            desktop_mode: var("DESKTOP_MODE").and_then(|v| parse_bool(&v)).unwrap_or(false),
            api_tokens: var("API_TOKENS")
                .map(|v| parse_api_tokens(&v))
                .unwrap_or_default(),
            scheduler,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)?.trim().parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `token:user_id` pairs separated by commas. Malformed pairs are
/// skipped.
pub fn parse_api_tokens(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (token, user) = pair.split_once(':')?;
            let (token, user) = (token.trim(), user.trim());
            (!token.is_empty() && !user.is_empty()).then(|| (token.to_string(), user.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.similarity_endpoint, None);
        assert_eq!(config.similarity_timeout, Duration::from_millis(5000));
        assert!(!config.desktop_mode);
        assert!(config.api_tokens.is_empty());
        assert_eq!(config.scheduler.batch_size, 30);
        assert_eq!(config.scheduler.queue_cap, 150);
        assert_eq!(config.scheduler.max_batches_per_cycle, 5);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("STORE_BACKEND", "SQLite"),
            ("DESKTOP_MODE", "1"),
            ("ENABLE_FILE_LOGS", "true"),
            ("LOG_DIR", "/var/log/vocab"),
            ("BATCH_SIZE", "12"),
            ("REVIEW_QUEUE_CAP", "0"),
            ("SIMILARITY_ENDPOINT", " http://localhost:5001/similarity "),
            ("API_TOKENS", "abc:alice, def:bob,broken,:nobody"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert!(config.desktop_mode);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/vocab")));
        assert_eq!(config.scheduler.batch_size, 12);
        assert_eq!(config.scheduler.queue_cap, 150);
        assert_eq!(
            config.similarity_endpoint.as_deref(),
            Some("http://localhost:5001/similarity")
        );
        assert_eq!(config.api_tokens.len(), 2);
        assert_eq!(config.api_tokens.get("def").map(String::as_str), Some("bob"));
    }
}
