use chrono::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
/// Ten years
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be between 1 and {max} hours, got '{value}'", max = MAX_TOKEN_TTL_HOURS)]
    InvalidTtl { name: &'static str, value: String },

    #[error("{name} must be true or false, got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
}

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub bind_address: String,
    pub token_ttl: Duration,
    pub run_migrations: bool,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_ttl = match lookup("TOKEN_TTL_HOURS") {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => Duration::hours(hours),
                _ => {
                    return Err(ConfigError::InvalidTtl {
                        name: "TOKEN_TTL_HOURS",
                        value,
                    })
                }
            },
            None => Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        name: "RUN_MIGRATIONS",
                        value,
                    })
                }
            },
            None => true,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            token_ttl,
            run_migrations,
        })
    }
}
