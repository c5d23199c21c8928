//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::pricing::calculators::DEFAULT_PREVIEW_BASE_RATE;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    pub rule_cache_ttl: Duration,
    /// Base rate for preview scenarios that do not carry their own
    pub preview_base_rate: Decimal,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            rule_cache_ttl: Duration::from_secs(parse_or(&lookup, "RULE_CACHE_TTL_SECS", 300)?),
            preview_base_rate: parse_or(&lookup, "PREVIEW_BASE_RATE", DEFAULT_PREVIEW_BASE_RATE)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/pricing")])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.rule_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.preview_base_rate, dec!(100));
        assert!(config.run_migrations);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/pricing"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("PREVIEW_BASE_RATE", "250.50"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.preview_base_rate, dec!(250.50));
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_value() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/pricing"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
    }
}
