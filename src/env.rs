//! Environment variable names used by this crate for convenient
//! configuration from services.
//!
//! These are purely helpers; the selector and the sinks never read the
//! environment themselves.

use crate::encoder::FormatFlag;
use crate::logger::LoggerOptions;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Primary output format selector, `console` or `json`.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Legacy encoder selector, `console` or `json`. Loses to `LOG_FORMAT`.
pub const LOG_ENCODER_ENV: &str = "LOG_ENCODER";

/// Minimum level, e.g. `info` or `debug`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// `true` or `1` enables development defaults.
pub const LOG_DEVELOPMENT_ENV: &str = "LOG_DEVELOPMENT";

/// Application frames the source decorator skips above the call site.
pub const LOG_CALLER_SKIP_ENV: &str = "LOG_CALLER_SKIP";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// A format flag that is explicit exactly when `key` is set.
pub fn format_flag(key: &str, default: &str) -> FormatFlag {
    match std::env::var(key) {
        Ok(value) => FormatFlag::explicit(value),
        Err(_) => FormatFlag::defaulted(default),
    }
}

/// Both format selectors as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFlags {
    pub format: FormatFlag,
    pub legacy_encoder: FormatFlag,
}

impl FormatFlags {
    pub fn from_env() -> Self {
        FormatFlags {
            format: format_flag(LOG_FORMAT_ENV, "console"),
            legacy_encoder: format_flag(LOG_ENCODER_ENV, "console"),
        }
    }
}

impl LoggerOptions {
    /// Options from `LOG_DEVELOPMENT`, `LOG_LEVEL` and `LOG_CALLER_SKIP`.
    ///
    /// Unparseable values keep the corresponding default. The encoder is
    /// left unset for [`configure_encoder`](crate::encoder::configure_encoder).
    pub fn from_env() -> Self {
        let development = matches!(
            env_or(LOG_DEVELOPMENT_ENV, "false").trim().to_ascii_lowercase().as_str(),
            "true" | "1"
        );
        let defaults = if development {
            LoggerOptions::development()
        } else {
            LoggerOptions::default()
        };

        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| LevelFilter::from_str(v.trim()).ok())
            .unwrap_or(defaults.level);
        let caller_skip = std::env::var(LOG_CALLER_SKIP_ENV)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.caller_skip);

        LoggerOptions {
            level,
            caller_skip,
            ..defaults
        }
    }
}
