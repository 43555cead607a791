//! # Logging — Severity-Gated Message Emission
//!
//! doctect configs carry a `logLevel` with five ordered severities:
//!
//! ```text
//! silent < error < warning < info < debug
//! ```
//!
//! A message is emitted only if its severity is strictly greater than
//! `silent` and at or below the configured level. `warning` is normalized
//! to the native `warn` channel of `tracing`. Unrecognized level names
//! parse to `None` and cause a silent no-op at the call site.
//!
//! The content parser logs through this module so that a config-supplied
//! `logLevel` gates output independently of any `RUST_LOG` filter the CLI
//! installs for `tracing-subscriber`.

use serde::{Deserialize, Serialize};

/// Ordered log severity. The derive order gives `Silent < Error <
/// Warning < Info < Debug`, which is the gating order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Suppress all output.
    Silent,
    /// Failures only.
    Error,
    /// Failures and recoverable problems.
    Warning,
    /// Normal operational messages. The default.
    #[default]
    Info,
    /// Verbose diagnostics.
    Debug,
}

impl LogLevel {
    /// Parse a level name. Returns `None` for unrecognized names, which
    /// callers treat as a silent no-op rather than an error.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "silent" => Some(Self::Silent),
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    /// The canonical name of this level.
    pub fn name(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Emit `message` at `level` if the configured `config_level` admits it.
///
/// Messages at `Silent` are never emitted (there is no silent channel);
/// messages above the configured level are dropped.
pub fn log(config_level: LogLevel, level: LogLevel, message: &str) {
    if level == LogLevel::Silent || level > config_level {
        return;
    }
    match level {
        LogLevel::Error => tracing::error!("{message}"),
        LogLevel::Warning => tracing::warn!("{message}"),
        LogLevel::Info => tracing::info!("{message}"),
        LogLevel::Debug => tracing::debug!("{message}"),
        LogLevel::Silent => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(LogLevel::Silent < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_from_name_recognized() {
        assert_eq!(LogLevel::from_name("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_name("debug"), Some(LogLevel::Debug));
    }

    #[test]
    fn test_from_name_unrecognized_is_none() {
        assert_eq!(LogLevel::from_name("verbose"), None);
        assert_eq!(LogLevel::from_name(""), None);
        assert_eq!(LogLevel::from_name("WARNING"), None);
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_serde_round_trip() {
        let level: LogLevel = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, LogLevel::Warning);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"warning\"");
    }

    // log() gating itself is observable only through a tracing collector;
    // the dispatch arms are exercised here to catch panics.
    #[test]
    fn test_log_does_not_panic() {
        log(LogLevel::Debug, LogLevel::Error, "e");
        log(LogLevel::Debug, LogLevel::Warning, "w");
        log(LogLevel::Debug, LogLevel::Info, "i");
        log(LogLevel::Debug, LogLevel::Debug, "d");
        log(LogLevel::Silent, LogLevel::Error, "dropped");
        log(LogLevel::Info, LogLevel::Silent, "dropped");
    }
}
