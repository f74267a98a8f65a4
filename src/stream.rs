use crate::encoder::{EncoderConfig, LogFormat, TimeEncoding};
use crate::record::{Field, LogRecord};
use crate::sink::{LogSink, SinkError};
use chrono::SecondsFormat;
use std::backtrace::Backtrace;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::Level;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Reference backend that renders entries through an [`EncoderConfig`]
/// into any byte stream.
///
/// Each entry is encoded into a buffer first and handed to the stream with
/// a single `write_all`, so concurrent writers never interleave lines.
/// Derived sinks (see [`LogSink::with`]) share the stream and the encoder.
#[derive(Clone)]
pub struct StreamSink {
    writer: SharedWriter,
    encoder: Arc<EncoderConfig>,
    level: LevelFilter,
    stacktrace_level: Option<Level>,
    bound: Arc<[Field]>,
}

impl StreamSink {
    pub fn new<W>(writer: W, encoder: EncoderConfig) -> Self
    where
        W: Write + Send + 'static,
    {
        StreamSink {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            encoder: Arc::new(encoder),
            level: LevelFilter::INFO,
            stacktrace_level: None,
            bound: Arc::from(Vec::new()),
        }
    }

    /// Minimum level admitted by this sink.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Attach a captured stack trace to entries at `level` or more severe.
    pub fn with_stacktrace_level(mut self, level: Option<Level>) -> Self {
        self.stacktrace_level = level;
        self
    }

    pub fn encoder(&self) -> &EncoderConfig {
        &self.encoder
    }

    fn wants_stacktrace(&self, level: Level) -> bool {
        matches!(self.stacktrace_level, Some(threshold) if level <= threshold)
    }

    fn encode(&self, record: &LogRecord, fields: Vec<Field>) -> Result<Vec<u8>, SinkError> {
        let stack = if self.wants_stacktrace(record.level) {
            Some(Backtrace::force_capture().to_string())
        } else {
            None
        };

        match self.encoder.format {
            LogFormat::Json => self.encode_json(record, fields, stack),
            LogFormat::Console => self.encode_console(record, fields, stack),
        }
    }

    fn encode_json(
        &self,
        record: &LogRecord,
        fields: Vec<Field>,
        stack: Option<String>,
    ) -> Result<Vec<u8>, SinkError> {
        let enc = &self.encoder;
        let mut object = serde_json::Map::new();
        let mut put = |key: &str, value: serde_json::Value| {
            if !key.is_empty() {
                object.insert(key.to_string(), value);
            }
        };
        put(enc.time_key, self.format_time(record).into());
        put(enc.level_key, record.level.as_str().into());
        if let Some(caller) = &record.caller {
            put(enc.caller_key, caller.short().into());
        }
        put(enc.message_key, record.message.clone().into());
        // Later keys overwrite earlier ones in place: bound fields, then call-site fields.
        for field in self.bound.iter().cloned().chain(fields) {
            object.insert(field.key, field.value);
        }
        if let Some(stack) = stack {
            if !enc.stacktrace_key.is_empty() {
                object.insert(enc.stacktrace_key.to_string(), stack.into());
            }
        }

        let mut line = serde_json::to_vec(&serde_json::Value::Object(object))?;
        line.push(b'\n');
        Ok(line)
    }

    /// Tab-separated columns; a column whose key is empty is left out.
    fn encode_console(
        &self,
        record: &LogRecord,
        fields: Vec<Field>,
        stack: Option<String>,
    ) -> Result<Vec<u8>, SinkError> {
        let enc = &self.encoder;
        let mut columns: Vec<String> = Vec::with_capacity(5);
        if !enc.time_key.is_empty() {
            columns.push(self.format_time(record));
        }
        if !enc.level_key.is_empty() {
            columns.push(record.level.as_str().to_string());
        }
        if let Some(caller) = record.caller.as_ref().filter(|_| !enc.caller_key.is_empty()) {
            columns.push(caller.short());
        }
        if !enc.message_key.is_empty() {
            columns.push(record.message.clone());
        }

        let mut context = serde_json::Map::new();
        for field in self.bound.iter().cloned().chain(fields) {
            context.insert(field.key, field.value);
        }
        if !context.is_empty() {
            columns.push(serde_json::to_string(&context)?);
        }

        let mut line = columns.join("\t");
        line.push('\n');
        if let Some(stack) = stack.filter(|_| !enc.stacktrace_key.is_empty()) {
            line.push_str(&stack);
            if !stack.ends_with('\n') {
                line.push('\n');
            }
        }
        Ok(line.into_bytes())
    }

    fn format_time(&self, record: &LogRecord) -> String {
        match self.encoder.time {
            TimeEncoding::Rfc3339Nano => record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            TimeEncoding::Iso8601Millis => record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl LogSink for StreamSink {
    fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    fn write(&self, record: &LogRecord, fields: Vec<Field>) -> Result<(), SinkError> {
        let line = self.encode(record, fields)?;
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }

    fn with(&self, fields: Vec<Field>) -> Arc<dyn LogSink> {
        let mut bound = self.bound.to_vec();
        bound.extend(fields);
        Arc::new(StreamSink {
            writer: Arc::clone(&self.writer),
            encoder: Arc::clone(&self.encoder),
            level: self.level,
            stacktrace_level: self.stacktrace_level,
            bound: Arc::from(bound),
        })
    }
}
