//! Engine configuration
//!
//! Defaults suit a local author setup. `EngineConfig::from_env()` overlays
//! `VIEWTREE_*` environment variables; unparsable values are logged and ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Whether the engine accepts mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Author,
    Publish,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" => Ok(Mode::Author),
            "publish" => Ok(Mode::Publish),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Author => f.write_str("author"),
            Mode::Publish => f.write_str("publish"),
        }
    }
}

/// Default for [`EngineConfig::max_resolution_depth`]
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest node level resolution will expand, and mutations may create
    pub max_resolution_depth: usize,

    /// Buffer size of the domain event broadcast channel
    pub event_channel_capacity: usize,

    /// Upper bound on one persistence call
    pub persist_timeout_ms: u64,

    pub mode: Mode,

    /// Deepest heading level listed in tables of contents
    pub toc_max_level: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            event_channel_capacity: 128,
            persist_timeout_ms: 5000,
            mode: Mode::Author,
            toc_max_level: 3,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `VIEWTREE_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary key lookup
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: FromStr>(key: &str, raw: Option<String>, target: &mut T)
        where
            T::Err: fmt::Display,
        {
            let Some(raw) = raw else {
                return;
            };
            match raw.trim().parse::<T>() {
                Ok(value) => *target = value,
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", key, raw, e),
            }
        }

        parse(
            "VIEWTREE_MAX_DEPTH",
            lookup("VIEWTREE_MAX_DEPTH"),
            &mut self.max_resolution_depth,
        );
        parse(
            "VIEWTREE_EVENT_CAPACITY",
            lookup("VIEWTREE_EVENT_CAPACITY"),
            &mut self.event_channel_capacity,
        );
        parse(
            "VIEWTREE_PERSIST_TIMEOUT_MS",
            lookup("VIEWTREE_PERSIST_TIMEOUT_MS"),
            &mut self.persist_timeout_ms,
        );
        parse("VIEWTREE_MODE", lookup("VIEWTREE_MODE"), &mut self.mode);
        parse(
            "VIEWTREE_TOC_MAX_LEVEL",
            lookup("VIEWTREE_TOC_MAX_LEVEL"),
            &mut self.toc_max_level,
        );

        // broadcast::channel panics on zero capacity
        self.event_channel_capacity = self.event_channel_capacity.max(1);
        self
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == Mode::Publish
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_resolution_depth, 64);
        assert_eq!(config.event_channel_capacity, 128);
        assert_eq!(config.persist_timeout(), Duration::from_secs(5));
        assert_eq!(config.mode, Mode::Author);
        assert_eq!(config.toc_max_level, 3);
        assert!(!config.is_read_only());
    }

    #[test]
    fn test_overlay_parses_values() {
        let env: HashMap<&str, &str> = [
            ("VIEWTREE_MAX_DEPTH", "8"),
            ("VIEWTREE_MODE", "Publish"),
            ("VIEWTREE_PERSIST_TIMEOUT_MS", "250"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::default().overlay(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.max_resolution_depth, 8);
        assert_eq!(config.mode, Mode::Publish);
        assert_eq!(config.persist_timeout_ms, 250);
        assert!(config.is_read_only());
    }

    #[test]
    fn test_overlay_ignores_garbage() {
        let config = EngineConfig::default().overlay(|k| match k {
            "VIEWTREE_MAX_DEPTH" => Some("deep".to_string()),
            "VIEWTREE_EVENT_CAPACITY" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.max_resolution_depth, 64);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"mode":"publish"}"#).unwrap();
        assert_eq!(config.mode, Mode::Publish);
        assert_eq!(config.max_resolution_depth, 64);
    }
}
