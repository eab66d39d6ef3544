//! Environment-driven configuration.
//!
//! # Invariants
//! - Reading configuration never fails: invalid or missing values fall back
//!   to defaults.

use crate::db::StoreLocator;
use std::path::PathBuf;

/// Minimum log severity variable.
pub const LOG_LEVEL_ENV: &str = "BEARLINK_LOG_LEVEL";
/// Optional store path checked before the platform candidates.
pub const DB_PATH_ENV: &str = "BEARLINK_DB_PATH";
/// URL scheme registered by the host app.
pub const DEFAULT_CALLBACK_SCHEME: &str = "bear";

/// Minimum severity written to the log side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses a level name case-insensitively; `warning` is accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Like [`LogLevel::parse`], falling back to `info`.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub log_level: LogLevel,
    /// Store path tried before the platform defaults.
    pub store_path: Option<PathBuf>,
    pub callback_scheme: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            store_path: None,
            callback_scheme: DEFAULT_CALLBACK_SCHEME.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup` (environment-style key/value).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = LogLevel::parse_or_default(lookup(LOG_LEVEL_ENV).as_deref());
        let store_path = lookup(DB_PATH_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Self {
            log_level,
            store_path,
            ..Self::default()
        }
    }

    /// Candidate store locations: the configured path first, then defaults.
    pub fn store_locator(&self) -> StoreLocator {
        StoreLocator::with_defaults(self.store_path.clone())
    }
}
