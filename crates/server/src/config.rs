//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Local, Offset};
use clap::Parser;
use habitual_ai::{GeminiConfig, GenerationPolicy, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};

/// Where goals are kept.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    /// JSON files under a directory
    Json(PathBuf),
    /// Process memory; lost on exit
    Memory,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Offset outside ±24h
    #[error("invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    /// Zero attempts would never call the generator
    #[error("generation max attempts must be at least 1")]
    NoAttempts,
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,

    /// Goal store
    pub storage: StorageBackend,

    /// Gemini client settings
    pub gemini: GeminiConfig,

    /// Plan generation timeout and retry settings
    pub generation: GenerationPolicy,

    /// Reference timezone for calendar days
    pub utc_offset: FixedOffset,
}

/// Command line, with environment fallbacks.
#[derive(Debug, Parser)]
#[command(name = "habitual")]
#[command(about = "Habit and goal planning service", long_about = None)]
pub struct Cli {
    /// Listen address
    #[arg(long, env = "HABITUAL_BIND", default_value = "0.0.0.0:3001")]
    pub bind: String,

    /// Directory of the JSON goal store
    #[arg(long, env = "HABITUAL_STORAGE", default_value = ".habitual")]
    pub storage: PathBuf,

    /// Keep goals in memory instead of on disk
    #[arg(long)]
    pub memory: bool,

    /// Gemini API key; plan generation fails without one
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = DEFAULT_GEMINI_ENDPOINT)]
    pub gemini_endpoint: String,

    /// Upper bound for one generation attempt
    #[arg(long, default_value = "60")]
    pub generation_timeout_secs: u64,

    /// Generation attempts before giving up
    #[arg(long, default_value = "1")]
    pub generation_max_attempts: u32,

    /// Delay before the first retry; doubles after each
    #[arg(long, default_value = "500")]
    pub retry_backoff_ms: u64,

    /// Reference timezone as minutes east of UTC (default: host offset)
    #[arg(long, env = "HABITUAL_UTC_OFFSET_MINUTES", allow_hyphen_values = true)]
    pub utc_offset_minutes: Option<i32>,
}

impl Cli {
    /// Build the server configuration.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        if self.generation_max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }

        let utc_offset = match self.utc_offset_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or(ConfigError::InvalidOffset(minutes))?,
            None => Local::now().offset().fix(),
        };

        let timeout = Duration::from_secs(self.generation_timeout_secs);
        Ok(ServerConfig {
            bind: self.bind,
            storage: if self.memory {
                StorageBackend::Memory
            } else {
                StorageBackend::Json(self.storage)
            },
            gemini: GeminiConfig {
                api_key: self.gemini_api_key,
                model: self.gemini_model,
                endpoint: self.gemini_endpoint,
                request_timeout: timeout,
            },
            generation: GenerationPolicy {
                timeout,
                max_attempts: self.generation_max_attempts,
                retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            },
            utc_offset,
        })
    }
}
