use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::health::PollPolicy;
use crate::i18n::{negotiate, Language};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
/// Stored interviews live at most a year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

/// Client configuration loaded from environment variables.
/// Every setting has a default; malformed numeric values are a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub language: Language,
    pub health_retry_delay_ms: u64,
    pub health_max_retries: u32,
    pub health_recheck_secs: u64,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub session_ttl_hours: i64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let language = negotiate(
            std::env::var("JOBMATE_LANGUAGE").ok().as_deref(),
            std::env::var("LANG").ok().as_deref(),
        );

        Ok(Config {
            api_url: std::env::var("JOBMATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            language,
            health_retry_delay_ms: parse_env("JOBMATE_HEALTH_RETRY_DELAY_MS", 2000)?,
            health_max_retries: parse_env("JOBMATE_HEALTH_MAX_RETRIES", 30)?,
            health_recheck_secs: parse_env("JOBMATE_HEALTH_RECHECK_SECS", 30)?,
            request_timeout_secs: parse_env("JOBMATE_REQUEST_TIMEOUT_SECS", 120)?,
            data_dir: std::env::var("JOBMATE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".jobmate")),
            session_ttl_hours: parse_ttl_hours(
                "JOBMATE_SESSION_TTL_HOURS",
                DEFAULT_SESSION_TTL_HOURS,
            )?,
            log_level: std::env::var("JOBMATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            retry_delay: Duration::from_millis(self.health_retry_delay_ms),
            max_retries: self.health_max_retries,
            recheck_interval: Duration::from_secs(self.health_recheck_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Out-of-range values (only possible for a hand-built `Config`) fall
    /// back to the default.
    pub fn session_ttl(&self) -> chrono::Duration {
        Some(self.session_ttl_hours)
            .filter(|h| (1..=MAX_SESSION_TTL_HOURS).contains(h))
            .and_then(chrono::Duration::try_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("Environment variable '{key}' must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_ttl_hours(key: &str, default: i64) -> Result<i64> {
    let hours: i64 = parse_env(key, default)?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        bail!(
            "Environment variable '{key}' must be between 1 and {MAX_SESSION_TTL_HOURS} hours, got {hours}"
        );
    }
    chrono::Duration::try_hours(hours)
        .with_context(|| format!("Environment variable '{key}' is out of range"))?;
    Ok(hours)
}
