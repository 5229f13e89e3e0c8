use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::feed::DEFAULT_PER_PAGE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub secure_cookies: bool,

    // Media
    pub media_dir: PathBuf,

    // Feeds
    pub posts_per_page: usize,
    pub home_feed_cache_ttl: Duration,

    // Sessions
    pub session_cleanup_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default, so an empty environment yields a usable
    /// development configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Database
            database_path: PathBuf::from(env_or_default(
                "DATABASE_PATH",
                "./data/blogfeed.sqlite",
            )),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,
            static_dir: PathBuf::from(env_or_default("STATIC_DIR", "./static")),
            max_upload_bytes: parse_env_usize("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            secure_cookies: parse_env_bool("SECURE_COOKIES", false)?,

            // Media
            media_dir: PathBuf::from(env_or_default("MEDIA_DIR", "./data/media")),

            // Feeds
            posts_per_page: parse_env_usize("POSTS_PER_PAGE", DEFAULT_PER_PAGE)?,
            home_feed_cache_ttl: Duration::from_secs(parse_env_u64("HOME_FEED_CACHE_SECS", 20)?),

            // Sessions
            session_cleanup_interval: Duration::from_secs(parse_env_u64(
                "SESSION_CLEANUP_INTERVAL_SECS",
                3600,
            )?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                name: "POSTS_PER_PAGE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_UPLOAD_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session_cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_CLEANUP_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.web_host.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "WEB_HOST".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the home feed listing should be cached at all.
    #[must_use]
    pub fn home_feed_cache_enabled(&self) -> bool {
        !self.home_feed_cache_ttl.is_zero()
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => parse_bool(name, &val),
        _ => Ok(default),
    }
}

fn parse_bool(name: &str, val: &str) -> Result<bool, ConfigError> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseBool {
            name: name.to_string(),
            value: val.to_string(),
        }),
    }
}
