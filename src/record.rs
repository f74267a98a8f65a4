use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Level;

/// A single log entry as it travels from a call site to a [`LogSink`].
///
/// Structured fields are passed next to the record (see
/// [`LogSink::write`]) so decorators can append to them without cloning
/// the record itself.
///
/// [`LogSink`]: crate::sink::LogSink
/// [`LogSink::write`]: crate::sink::LogSink::write
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    /// Compile-time location of the logging statement, when known.
    pub caller: Option<Caller>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            caller: None,
        }
    }

    pub fn with_caller(mut self, caller: Option<Caller>) -> Self {
        self.caller = caller;
        self
    }
}

/// File and line captured by `#[track_caller]` or by facade metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Caller { file: file.into(), line }
    }

    /// `dir/file.rs:line`, keeping only the last directory of the path.
    pub fn short(&self) -> String {
        let path = self.file.replace('\\', "/");
        let trimmed = match path.rfind('/') {
            Some(last) => match path[..last].rfind('/') {
                Some(prev) => &path[prev + 1..],
                None => path.as_str(),
            },
            None => path.as_str(),
        };
        format!("{}:{}", trimmed, self.line)
    }
}

impl From<&'static std::panic::Location<'static>> for Caller {
    fn from(location: &'static std::panic::Location<'static>) -> Self {
        Caller::new(location.file(), location.line())
    }
}

/// One structured key/value pair attached to an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: serde_json::Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Field {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Originating call site of an entry, rendered as the nested `source` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl SourceMetadata {
    pub const FIELD: &'static str = "source";

    pub fn into_field(self) -> Field {
        let value = serde_json::to_value(&self).unwrap_or_default();
        Field::new(Self::FIELD, value)
    }
}
