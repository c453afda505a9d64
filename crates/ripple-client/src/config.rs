//! Client configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (RIPPLE_*)
//! - TOML configuration file

use anyhow::{Context, Result};
use ripple_feed::BackoffConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Change-feed settings.
    #[serde(default)]
    pub feed: FeedSettings,

    /// Toast settings.
    #[serde(default)]
    pub toast: ToastSettings,

    /// Reconnect backoff settings.
    #[serde(default)]
    pub reconnect: ReconnectSettings,
}

/// Change-feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Per-subscription buffer capacity, passed to the feed constructors.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Toast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastSettings {
    /// Auto-dismiss duration in milliseconds.
    #[serde(default = "default_toast_duration")]
    pub duration_ms: u64,
}

/// Reconnect backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectSettings {
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_reconnect_initial")]
    pub initial_ms: u64,

    /// Upper bound on any retry delay, in milliseconds.
    #[serde(default = "default_reconnect_max")]
    pub max_ms: u64,

    /// Growth factor between attempts.
    #[serde(default = "default_reconnect_multiplier")]
    pub multiplier: f64,

    /// Apply full jitter to delays.
    #[serde(default = "default_true")]
    pub jitter: bool,
}

// Default value functions
fn default_channel_capacity() -> usize {
    std::env::var("RIPPLE_CHANNEL_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(256)
}

fn default_toast_duration() -> u64 {
    5_000
}

fn default_reconnect_initial() -> u64 {
    250
}

fn default_reconnect_max() -> u64 {
    30_000
}

fn default_reconnect_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedSettings::default(),
            toast: ToastSettings::default(),
            reconnect: ReconnectSettings::default(),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_toast_duration(),
        }
    }
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_ms: default_reconnect_initial(),
            max_ms: default_reconnect_max(),
            multiplier: default_reconnect_multiplier(),
            jitter: true,
        }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "ripple.toml",
            "/etc/ripple/ripple.toml",
            "~/.config/ripple/ripple.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// The reconnect settings as a feed backoff policy.
    #[must_use]
    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial: Duration::from_millis(self.reconnect.initial_ms),
            max: Duration::from_millis(self.reconnect.max_ms),
            multiplier: self.reconnect.multiplier,
            jitter: self.reconnect.jitter,
        }
    }

    /// The toast auto-dismiss duration.
    #[must_use]
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast.duration_ms)
    }

    /// The per-subscription buffer capacity for feed constructors.
    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.feed.channel_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.toast.duration_ms, 5_000);
        assert_eq!(config.channel_capacity(), 256);
        assert_eq!(config.reconnect.initial_ms, 250);
        assert!(config.reconnect.jitter);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [feed]
            channel_capacity = 64

            [reconnect]
            initial_ms = 100
            jitter = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.channel_capacity(), 64);
        assert_eq!(config.reconnect.initial_ms, 100);
        assert!(!config.reconnect.jitter);
        // Unspecified sections keep their defaults.
        assert_eq!(config.toast.duration_ms, 5_000);
    }

    #[test]
    fn test_backoff_conversion() {
        let config = Config::default();
        let backoff = config.backoff();
        assert_eq!(backoff.initial, Duration::from_millis(250));
        assert_eq!(backoff.max, Duration::from_secs(30));
        assert_eq!(config.toast_duration(), Duration::from_secs(5));
    }
}
