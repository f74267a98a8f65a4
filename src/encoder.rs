//! Output format selection.
//!
//! Two inputs choose the output encoding: the primary `format` selector and
//! a legacy encoder selector kept for older deployments. Each may be set
//! explicitly or left at its default. [`resolve`] turns them into one
//! immutable [`EncoderConfig`] and reports a conflict as a warning.

use crate::logger::LoggerOptions;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Format used when neither selector is set explicitly.
pub const DEFAULT_FORMAT: LogFormat = LogFormat::Console;

/// Effective output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Console => "console",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidFormat {
                flag: "format",
                value: s.to_string(),
            }),
        }
    }
}

/// One format input and whether the operator set it explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFlag {
    pub value: String,
    pub explicit: bool,
}

impl FormatFlag {
    pub fn explicit(value: impl Into<String>) -> Self {
        FormatFlag {
            value: value.into(),
            explicit: true,
        }
    }

    pub fn defaulted(value: impl Into<String>) -> Self {
        FormatFlag {
            value: value.into(),
            explicit: false,
        }
    }

    /// Parse the value when explicit; defaulted values are never validated.
    fn parse(&self, flag: &'static str) -> Result<Option<LogFormat>, ConfigError> {
        if !self.explicit {
            return Ok(None);
        }
        self.value
            .parse::<LogFormat>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidFormat {
                flag,
                value: self.value.clone(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEncoding {
    /// RFC 3339 with exactly nine fractional digits, UTC.
    Rfc3339Nano,
    /// ISO 8601 with millisecond precision, UTC.
    Iso8601Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEncoding {
    Capital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerEncoding {
    /// `dir/file.rs:line`
    Short,
}

/// Immutable description of how entries are rendered.
///
/// An empty key leaves that element out of the rendered entry, in both
/// layouts. Console output shows values only, so its keys just select
/// which columns appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub format: LogFormat,
    pub time_key: &'static str,
    pub level_key: &'static str,
    pub caller_key: &'static str,
    pub message_key: &'static str,
    pub stacktrace_key: &'static str,
    pub time: TimeEncoding,
    pub level: LevelEncoding,
    pub caller: CallerEncoding,
}

impl EncoderConfig {
    /// Machine-parseable single-line JSON layout.
    pub fn json() -> Self {
        EncoderConfig {
            format: LogFormat::Json,
            time_key: "time",
            level_key: "level",
            caller_key: "caller",
            message_key: "msg",
            stacktrace_key: "stacktrace",
            time: TimeEncoding::Rfc3339Nano,
            level: LevelEncoding::Capital,
            caller: CallerEncoding::Short,
        }
    }

    /// Human-oriented tab-separated layout of the stream backend.
    pub fn console() -> Self {
        EncoderConfig {
            format: LogFormat::Console,
            time_key: "T",
            level_key: "L",
            caller_key: "C",
            message_key: "M",
            stacktrace_key: "S",
            time: TimeEncoding::Iso8601Millis,
            level: LevelEncoding::Capital,
            caller: CallerEncoding::Short,
        }
    }

    pub fn for_format(format: LogFormat) -> Self {
        match format {
            LogFormat::Console => Self::console(),
            LogFormat::Json => Self::json(),
        }
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub config: EncoderConfig,
    /// Set when both selectors were explicit and disagreed.
    pub warning: Option<String>,
}

/// Resolve the two format selectors into one effective encoding.
///
/// **Precedence**
/// - explicit `format` beats explicit `legacy`; a disagreement yields a
///   warning naming both values.
/// - a single explicit selector decides alone.
/// - with neither explicit, [`DEFAULT_FORMAT`] applies.
///
/// **Errors**
/// - [`ConfigError::InvalidFormat`] when an explicit value is not `console`
///   or `json`.
pub fn resolve(format: &FormatFlag, legacy: &FormatFlag) -> Result<Resolution, ConfigError> {
    let primary = format.parse("format")?;
    let secondary = legacy.parse("legacy encoder")?;

    let (effective, warning) = match (primary, secondary) {
        (Some(p), Some(s)) if p != s => (
            p,
            Some(format!(
                "warning: log format \"{}\" overrides legacy encoder \"{}\"",
                p, s
            )),
        ),
        (Some(p), _) => (p, None),
        (None, Some(s)) => (s, None),
        (None, None) => (DEFAULT_FORMAT, None),
    };

    Ok(Resolution {
        config: EncoderConfig::for_format(effective),
        warning,
    })
}

/// Resolve the selectors and install the result into `opts`, reporting a
/// conflict on standard error.
///
/// On error `opts` is left exactly as it was.
pub fn configure_encoder(
    format: &FormatFlag,
    legacy: &FormatFlag,
    opts: &mut LoggerOptions,
) -> Result<(), ConfigError> {
    configure_encoder_to(format, legacy, opts, &mut std::io::stderr())
}

/// Same as [`configure_encoder`], writing the conflict warning to `diag`.
pub fn configure_encoder_to<W: Write>(
    format: &FormatFlag,
    legacy: &FormatFlag,
    opts: &mut LoggerOptions,
    diag: &mut W,
) -> Result<(), ConfigError> {
    let resolution = resolve(format, legacy)?;
    if let Some(warning) = &resolution.warning {
        // Diagnostic channel only; failing to print it must not abort startup.
        let _ = writeln!(diag, "{}", warning);
    }
    opts.encoder = Some(resolution.config);
    Ok(())
}

/// Error type returned while resolving the output format.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported {flag} {value:?}: expected \"console\" or \"json\"")]
    InvalidFormat { flag: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_supported_format_resolves() {
        for (value, expected) in [("console", LogFormat::Console), ("json", LogFormat::Json)] {
            let resolution =
                resolve(&FormatFlag::explicit(value), &FormatFlag::defaulted("console")).unwrap();
            assert_eq!(resolution.config.format, expected);
            assert!(resolution.warning.is_none());
        }
    }

    #[test]
    fn format_value_is_case_insensitive() {
        let resolution =
            resolve(&FormatFlag::explicit(" JSON "), &FormatFlag::defaulted("")).unwrap();
        assert_eq!(resolution.config.format, LogFormat::Json);
    }

    #[test]
    fn unsupported_format_leaves_options_untouched() {
        let mut opts = LoggerOptions::default();
        let before = opts.clone();
        let mut diag = Vec::new();

        let err = configure_encoder_to(
            &FormatFlag::explicit("xml"),
            &FormatFlag::defaulted("console"),
            &mut opts,
            &mut diag,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidFormat {
                flag: "format",
                value: "xml".into()
            }
        );
        assert_eq!(opts, before);
        assert!(diag.is_empty());
    }

    #[test]
    fn unsupported_legacy_value_is_rejected() {
        let err = resolve(&FormatFlag::defaulted("console"), &FormatFlag::explicit("yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { flag: "legacy encoder", .. }));
    }

    #[test]
    fn defaulted_values_are_not_validated() {
        let resolution =
            resolve(&FormatFlag::defaulted("xml"), &FormatFlag::defaulted("json")).unwrap();
        assert_eq!(resolution.config, EncoderConfig::console());
    }

    #[test]
    fn explicit_format_overrides_legacy_with_one_warning() {
        let mut opts = LoggerOptions::default();
        let mut diag = Vec::new();

        configure_encoder_to(
            &FormatFlag::explicit("json"),
            &FormatFlag::explicit("console"),
            &mut opts,
            &mut diag,
        )
        .unwrap();

        let diag = String::from_utf8(diag).unwrap();
        assert_eq!(diag.lines().count(), 1);
        assert!(diag.contains("overrides"));
        assert_eq!(opts.encoder, Some(EncoderConfig::json()));
    }

    #[test]
    fn agreeing_selectors_do_not_warn() {
        let resolution =
            resolve(&FormatFlag::explicit("json"), &FormatFlag::explicit("json")).unwrap();
        assert!(resolution.warning.is_none());
    }

    #[test]
    fn lone_explicit_legacy_decides() {
        let resolution =
            resolve(&FormatFlag::defaulted("console"), &FormatFlag::explicit("json")).unwrap();
        assert_eq!(resolution.config.format, LogFormat::Json);
        assert!(resolution.warning.is_none());
    }

    #[test]
    fn neither_explicit_falls_back_to_console() {
        let resolution =
            resolve(&FormatFlag::defaulted("json"), &FormatFlag::defaulted("json")).unwrap();
        assert_eq!(resolution.config.format, DEFAULT_FORMAT);
    }

    #[test]
    fn json_layout_uses_fixed_keys() {
        let config = EncoderConfig::json();
        assert_eq!(config.time_key, "time");
        assert_eq!(config.level_key, "level");
        assert_eq!(config.message_key, "msg");
        assert_eq!(config.stacktrace_key, "stacktrace");
        assert_eq!(config.time, TimeEncoding::Rfc3339Nano);
        assert_eq!(config.level, LevelEncoding::Capital);
        assert_eq!(config.caller, CallerEncoding::Short);
    }
}
