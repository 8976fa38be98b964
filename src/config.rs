//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before any database
//! connection is opened.
//!
//! ## Variables
//!
//! - `DATABASE_URL` - SQLite URL (default: `sqlite://clicktrail.db`)
//! - `BASE_URL` - Public prefix for short links (default: `http://localhost:8080/`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `VISIT_QUEUE_CAPACITY` - Visit event buffer size (default: 10000, min: 100)
//! - `VISIT_WORKER_CONCURRENCY` - Concurrent visit writes (default: 4)
//! - `VISIT_RETRY_ATTEMPTS` - Retries for failed visit writes (default: 3)
//! - `IP_HASH_SALT` - Salt mixed into anonymized caller identities
//! - `SHORT_CODE_LENGTH` - Length of generated short codes (default: 6)
//! - `DB_MAX_CONNECTIONS`, `DB_BUSY_TIMEOUT`, `DB_CONNECT_TIMEOUT` - pool settings

use anyhow::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
    pub visit_queue_capacity: usize,
    /// Maximum number of visits written concurrently by the background worker.
    pub visit_worker_concurrency: usize,
    /// Extra attempts for a visit write that failed with a storage error.
    pub visit_retry_attempts: usize,
    /// Salt prepended to caller IPs before hashing. Empty disables salting.
    pub ip_hash_salt: String,
    pub short_code_length: usize,

    // ── SqlitePool settings ─────────────────────────────────────────────────
    /// Maximum number of connections in the pool (`DB_MAX_CONNECTIONS`, default: 5).
    pub db_max_connections: u32,
    /// How long a writer waits on a locked database, in seconds
    /// (`DB_BUSY_TIMEOUT`, default: 5).
    pub db_busy_timeout: u64,
    /// Timeout for acquiring a connection from the pool in seconds
    /// (`DB_CONNECT_TIMEOUT`, default: 30).
    pub db_connect_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://clicktrail.db".to_string(),
            base_url: "http://localhost:8080/".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            visit_queue_capacity: 10_000,
            visit_worker_concurrency: 4,
            visit_retry_attempts: 3,
            ip_hash_salt: String::new(),
            short_code_length: 6,
            db_max_connections: 5,
            db_busy_timeout: 5,
            db_connect_timeout: 30,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible so new required variables can be added.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            base_url: env::var("BASE_URL").unwrap_or(defaults.base_url),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            visit_queue_capacity: parse_var("VISIT_QUEUE_CAPACITY", defaults.visit_queue_capacity),
            visit_worker_concurrency: parse_var(
                "VISIT_WORKER_CONCURRENCY",
                defaults.visit_worker_concurrency,
            ),
            visit_retry_attempts: parse_var("VISIT_RETRY_ATTEMPTS", defaults.visit_retry_attempts),
            ip_hash_salt: env::var("IP_HASH_SALT").unwrap_or(defaults.ip_hash_salt),
            short_code_length: parse_var("SHORT_CODE_LENGTH", defaults.short_code_length),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_busy_timeout: parse_var("DB_BUSY_TIMEOUT", defaults.db_busy_timeout),
            db_connect_timeout: parse_var("DB_CONNECT_TIMEOUT", defaults.db_connect_timeout),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            anyhow::bail!(
                "DATABASE_URL must start with 'sqlite:', got '{}'",
                self.database_url
            );
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.visit_queue_capacity < 100 {
            anyhow::bail!(
                "VISIT_QUEUE_CAPACITY must be at least 100, got {}",
                self.visit_queue_capacity
            );
        }

        if self.visit_queue_capacity > 1_000_000 {
            anyhow::bail!(
                "VISIT_QUEUE_CAPACITY is too large (max: 1000000), got {}",
                self.visit_queue_capacity
            );
        }

        if self.visit_worker_concurrency == 0 || self.visit_worker_concurrency > 256 {
            anyhow::bail!(
                "VISIT_WORKER_CONCURRENCY must be between 1 and 256, got {}",
                self.visit_worker_concurrency
            );
        }

        if self.visit_retry_attempts > 10 {
            anyhow::bail!(
                "VISIT_RETRY_ATTEMPTS must be at most 10, got {}",
                self.visit_retry_attempts
            );
        }

        if !(4..=32).contains(&self.short_code_length) {
            anyhow::bail!(
                "SHORT_CODE_LENGTH must be between 4 and 32, got {}",
                self.short_code_length
            );
        }

        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.db_connect_timeout == 0 {
            anyhow::bail!("DB_CONNECT_TIMEOUT must be greater than 0");
        }

        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.db_busy_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Database: {}", self.database_url);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!("  Visit queue capacity: {}", self.visit_queue_capacity);
        tracing::info!(
            "  Visit worker concurrency: {}",
            self.visit_worker_concurrency
        );

        if self.ip_hash_salt.is_empty() {
            tracing::warn!("  IP_HASH_SALT is empty; caller identities are hashed unsalted");
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Loads and validates configuration from environment variables.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.visit_queue_capacity = 50;
        assert!(config.validate().is_err());
        config.visit_queue_capacity = 10_000;

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.database_url = "postgres://localhost/test".to_string();
        assert!(config.validate().is_err());
        config.database_url = "sqlite::memory:".to_string();
        assert!(config.validate().is_ok());

        config.visit_worker_concurrency = 0;
        assert!(config.validate().is_err());
        config.visit_worker_concurrency = 4;

        config.short_code_length = 2;
        assert!(config.validate().is_err());
        config.short_code_length = 6;

        config.base_url = "ftp://x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("DATABASE_URL", "sqlite://custom.db");
            env::set_var("VISIT_WORKER_CONCURRENCY", "8");
            env::set_var("SHORT_CODE_LENGTH", "not-a-number");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "sqlite://custom.db");
        assert_eq!(config.visit_worker_concurrency, 8);
        // Unparseable values fall back to defaults
        assert_eq!(config.short_code_length, 6);

        unsafe {
            env::remove_var("DATABASE_URL");
            env::remove_var("VISIT_WORKER_CONCURRENCY");
            env::remove_var("SHORT_CODE_LENGTH");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        unsafe {
            env::remove_var("DATABASE_URL");
            env::remove_var("LOG_FORMAT");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite://clicktrail.db");
        assert_eq!(config.log_format, "text");
        assert_eq!(config.visit_queue_capacity, 10_000);
    }
}
