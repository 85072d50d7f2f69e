//! Configuration management module
//!
//! Timing and traversal settings for the facade. Every field has a default,
//! so a config file only needs the values it changes.

use std::env;

use capability_engine::SearchOptions;
use serde::{Deserialize, Serialize};
use tracing::warn;
use wait_gate::WaitOptions;

use crate::errors::AppError;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxConfig {
    /// Forces debug-level logging
    pub debug: bool,
    pub logging: LoggingConfig,
    pub wait: WaitConfig,
    pub app: AppConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Defaults for generic waits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            poll_interval_ms: 100,
        }
    }
}

/// Application lifecycle timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How long hide/unhide/terminate wait for the new state
    pub state_change_timeout_ms: u64,
    pub launch_attempts: u32,
    pub launch_retry_delay_ms: u64,
    /// How long to wait for a window to appear after a triggering action
    pub window_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_change_timeout_ms: 250,
            launch_attempts: 10,
            launch_retry_delay_ms: 1_000,
            window_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_depth: Option<usize>,
}

impl AxConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.wait.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "wait.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.app.launch_attempts == 0 {
            return Err(AppError::Config(
                "app.launch_attempts must be at least 1".to_string(),
            ));
        }
        if self.search.max_depth == Some(0) {
            return Err(AppError::Config(
                "search.max_depth must be at least 1 when set".to_string(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(AppError::Config(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Apply `AXKIT_*` environment overrides. Unparsable values are skipped.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("AXKIT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(debug) = parsed_env::<bool>("AXKIT_DEBUG") {
            self.debug = debug;
        }
        if let Some(timeout) = parsed_env::<u64>("AXKIT_WAIT_TIMEOUT_MS") {
            self.wait.timeout_ms = timeout;
        }
        if let Some(interval) = parsed_env::<u64>("AXKIT_POLL_INTERVAL_MS") {
            self.wait.poll_interval_ms = interval;
        }
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::from_millis(self.wait.timeout_ms, self.wait.poll_interval_ms)
    }

    pub fn state_change_options(&self) -> WaitOptions {
        WaitOptions::from_millis(self.app.state_change_timeout_ms, self.wait.poll_interval_ms)
    }

    pub fn window_options(&self) -> WaitOptions {
        WaitOptions::from_millis(self.app.window_timeout_ms, self.wait.poll_interval_ms)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_depth: self.search.max_depth,
        }
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = AxConfig::default();
        assert_eq!(config.wait_options().timeout, Duration::from_secs(5));
        assert_eq!(config.state_change_options().timeout, Duration::from_millis(250));
        assert_eq!(config.app.launch_attempts, 10);
        assert_eq!(config.search_options(), SearchOptions::unbounded());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AxConfig = serde_yaml::from_str("app:\n  launch_attempts: 3\n").unwrap();
        assert_eq!(config.app.launch_attempts, 3);
        assert_eq!(config.app.state_change_timeout_ms, 250);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AxConfig::default();
        config.wait.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AxConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());

        let mut config = AxConfig::default();
        config.search.max_depth = Some(0);
        assert!(config.validate().is_err());
    }
}
