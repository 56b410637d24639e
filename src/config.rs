//! Timer configuration.
//!
//! Configuration can be built programmatically, merged from CLI flags, or
//! loaded from a JSON file. Duration fields use human-readable strings such
//! as `"500ms"`, `"2s"` or `"5m"`; a bare number is read as milliseconds.

use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AwakeError, Result};

/// Key pressed when none is configured.
pub const DEFAULT_KEY: &str = "shift";

/// Default press interval: 210 seconds, short enough to beat common
/// screen-lock timeouts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(210);

/// Timer configuration.
///
/// `run_time == None` means the timer runs until explicitly stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key to press each cycle.
    pub key: String,

    /// Duration between key presses.
    #[serde(with = "duration_str")]
    pub interval: Duration,

    /// Total run time; `None` runs unbounded.
    #[serde(with = "opt_duration_str")]
    pub run_time: Option<Duration>,

    /// Global hotkey toggling pause/resume, e.g. `"ctrl+alt+p"`.
    pub pause_hotkey: Option<String>,

    /// Enable debug logging.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            interval: DEFAULT_INTERVAL,
            run_time: None,
            pause_hotkey: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).map_err(|e| AwakeError::config_load(path, e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| AwakeError::config_load(path, e.to_string()))
    }

    /// Write configuration to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| AwakeError::config_save(path, e.to_string()))
    }

    /// Validate the configuration, failing fast on values that would make
    /// the timer loop misbehave (a zero interval would busy-spin).
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(AwakeError::config_validation("key cannot be empty"));
        }
        if self.interval.is_zero() {
            return Err(AwakeError::config_validation("interval must be positive"));
        }
        if let Some(run_time) = self.run_time {
            if run_time.is_zero() {
                return Err(AwakeError::config_validation("run time must be positive"));
            }
        }
        if let Some(hotkey) = &self.pause_hotkey {
            if hotkey.trim().is_empty() {
                return Err(AwakeError::config_validation("pause hotkey cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Parse a duration string: `"1500ms"`, `"2s"`, `"5m"`, or a bare number of
/// milliseconds. Case-insensitive, surrounding whitespace tolerated.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(AwakeError::invalid_duration(value, "empty duration"));
    }

    let (number, unit) = if let Some(n) = normalized.strip_suffix("ms") {
        (n, "ms")
    } else if let Some(n) = normalized.strip_suffix('s') {
        (n, "s")
    } else if let Some(n) = normalized.strip_suffix('m') {
        (n, "m")
    } else {
        (normalized.as_str(), "ms")
    };

    let amount: u64 = number.trim().parse().map_err(|_| {
        AwakeError::invalid_duration(value, "expected a non-negative integer amount")
    })?;

    Ok(match unit {
        "s" => Duration::from_secs(amount),
        "m" => Duration::from_secs(amount.saturating_mul(60)),
        _ => Duration::from_millis(amount),
    })
}

/// Format a duration the way [`parse_duration`] reads it back.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

mod duration_str {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse_duration(&value).map_err(serde::de::Error::custom)
    }
}

mod opt_duration_str {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => serializer.serialize_some(&format_duration(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        value
            .map(|v| parse_duration(&v).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.key, "shift");
        assert_eq!(config.interval, Duration::from_secs(210));
        assert_eq!(config.run_time, None);
        assert_eq!(config.pause_hotkey, None);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1000").unwrap(), Duration::from_millis(1000));
    }

    #[test]
    fn test_format_duration_round_trip() {
        for duration in [
            Duration::from_millis(500),
            Duration::from_secs(1),
            Duration::from_secs(210),
            Duration::from_secs(3600),
        ] {
            let formatted = format_duration(duration);
            assert_eq!(parse_duration(&formatted).unwrap(), duration);
        }
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_run_time() {
        let config = Config {
            run_time: Some(Duration::ZERO),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
