//! Process configuration loaded from the environment.
//!
//! `main` calls `dotenvy::dotenv()` first, so a `.env` file in the working
//! directory is honored.

use std::time::Duration;

use url::Url;

use crate::monitor::{DEFAULT_YOUTUBE_API_BASE_URL, RateLimiterConfig, ReconcilerConfig};
use crate::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:livesync.db?mode=rwc";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_CONCURRENT_CHECKS: usize = 4;
const DEFAULT_PROVIDER_RPS: f64 = 5.0;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Directory for daily-rolling log files. Console only when `None`.
    pub dir: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub youtube_api_key: String,
    pub youtube_api_base_url: Url,
    pub probe_timeout: Duration,
    pub store_timeout: Duration,
    pub max_concurrent_checks: usize,
    pub provider_rps: f64,
    /// Pause between passes. A single pass is run when `None`.
    pub interval: Option<Duration>,
    pub log: LogSettings,
}

impl AppConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let youtube_api_key = get("YOUTUBE_API_KEY")
            .ok_or_else(|| Error::config("YOUTUBE_API_KEY must be set"))?;

        let base_url = get("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string());
        let youtube_api_base_url = Url::parse(&base_url).map_err(|e| {
            Error::config(format!("Invalid YOUTUBE_API_BASE_URL '{}': {}", base_url, e))
        })?;

        let probe_timeout_secs: u64 = parse_var(
            "LIVESYNC_PROBE_TIMEOUT_SECS",
            get("LIVESYNC_PROBE_TIMEOUT_SECS"),
            DEFAULT_PROBE_TIMEOUT_SECS,
        )?;
        let store_timeout_secs: u64 = parse_var(
            "LIVESYNC_STORE_TIMEOUT_SECS",
            get("LIVESYNC_STORE_TIMEOUT_SECS"),
            DEFAULT_STORE_TIMEOUT_SECS,
        )?;
        let max_concurrent_checks: usize = parse_var(
            "LIVESYNC_MAX_CONCURRENT_CHECKS",
            get("LIVESYNC_MAX_CONCURRENT_CHECKS"),
            DEFAULT_MAX_CONCURRENT_CHECKS,
        )?;
        let provider_rps: f64 = parse_var(
            "LIVESYNC_PROVIDER_RPS",
            get("LIVESYNC_PROVIDER_RPS"),
            DEFAULT_PROVIDER_RPS,
        )?;

        if probe_timeout_secs == 0 || store_timeout_secs == 0 {
            return Err(Error::config("timeouts must be at least one second"));
        }
        if max_concurrent_checks == 0 {
            return Err(Error::config("LIVESYNC_MAX_CONCURRENT_CHECKS must be positive"));
        }
        if !provider_rps.is_finite() || provider_rps <= 0.0 {
            return Err(Error::config("LIVESYNC_PROVIDER_RPS must be positive"));
        }

        let interval = match get("LIVESYNC_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = parse_var("LIVESYNC_INTERVAL_SECS", Some(raw), 0)?;
                if secs == 0 {
                    return Err(Error::config("LIVESYNC_INTERVAL_SECS must be positive"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let format = match get("LIVESYNC_LOG_FORMAT").as_deref() {
            None | Some("pretty") | Some("text") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::config(format!(
                    "Unknown LIVESYNC_LOG_FORMAT '{}'",
                    other
                )));
            }
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            youtube_api_key,
            youtube_api_base_url,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            store_timeout: Duration::from_secs(store_timeout_secs),
            max_concurrent_checks,
            provider_rps,
            interval,
            log: LogSettings {
                format,
                dir: get("LIVESYNC_LOG_DIR"),
            },
        })
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            probe_timeout: self.probe_timeout,
            store_timeout: self.store_timeout,
            max_concurrent_checks: self.max_concurrent_checks,
        }
    }

    pub fn rate_limiter_config(&self) -> Result<RateLimiterConfig> {
        RateLimiterConfig::with_rps(self.provider_rps)
    }
}

fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| Error::config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("YOUTUBE_API_KEY", "key")]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.youtube_api_key, "key");
        assert_eq!(
            config.youtube_api_base_url.as_str(),
            "https://www.googleapis.com/youtube/v3"
        );
        assert_eq!(config.probe_timeout, Duration::from_secs(15));
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert_eq!(config.max_concurrent_checks, 4);
        assert_eq!(config.provider_rps, 5.0);
        assert_eq!(config.interval, None);
        assert_eq!(config.log, LogSettings::default());
    }

    #[test]
    fn test_missing_api_key() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = load(&[("YOUTUBE_API_KEY", "   ")]).unwrap_err();
        assert!(err.to_string().contains("YOUTUBE_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("YOUTUBE_API_KEY", "key"),
            ("DATABASE_URL", "sqlite:/tmp/x.db"),
            ("YOUTUBE_API_BASE_URL", "http://127.0.0.1:8080/youtube/v3"),
            ("LIVESYNC_PROBE_TIMEOUT_SECS", "3"),
            ("LIVESYNC_STORE_TIMEOUT_SECS", "2"),
            ("LIVESYNC_MAX_CONCURRENT_CHECKS", "8"),
            ("LIVESYNC_PROVIDER_RPS", "0.5"),
            ("LIVESYNC_INTERVAL_SECS", "300"),
            ("LIVESYNC_LOG_FORMAT", "json"),
            ("LIVESYNC_LOG_DIR", "/var/log/livesync"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite:/tmp/x.db");
        assert_eq!(config.youtube_api_base_url.port(), Some(8080));
        assert_eq!(config.interval, Some(Duration::from_secs(300)));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.dir.as_deref(), Some("/var/log/livesync"));

        let reconciler = config.reconciler_config();
        assert_eq!(reconciler.probe_timeout, Duration::from_secs(3));
        assert_eq!(reconciler.store_timeout, Duration::from_secs(2));
        assert_eq!(reconciler.max_concurrent_checks, 8);
        assert!(config.rate_limiter_config().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("LIVESYNC_PROBE_TIMEOUT_SECS", "abc"),
            ("LIVESYNC_PROBE_TIMEOUT_SECS", "0"),
            ("LIVESYNC_MAX_CONCURRENT_CHECKS", "0"),
            ("LIVESYNC_PROVIDER_RPS", "-1"),
            ("LIVESYNC_INTERVAL_SECS", "0"),
            ("LIVESYNC_LOG_FORMAT", "xml"),
            ("YOUTUBE_API_BASE_URL", "not a url"),
        ] {
            let result = load(&[("YOUTUBE_API_KEY", "key"), (key, value)]);
            assert!(
                matches!(result, Err(Error::Configuration(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }
}
