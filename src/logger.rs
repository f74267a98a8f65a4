use crate::decorator::SourceDecorator;
use crate::encoder::EncoderConfig;
use crate::record::{Caller, Field, LogRecord};
use crate::sink::LogSink;
use crate::stream::StreamSink;
use std::io::Write;
use std::panic::Location;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Options the host assembles before building a [`Logger`].
///
/// `encoder` is filled in by
/// [`configure_encoder`](crate::encoder::configure_encoder); when left empty
/// [`build_logger`] falls back to console in development and JSON otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerOptions {
    pub development: bool,
    pub level: LevelFilter,
    /// Application frames the source decorator skips above the call site.
    pub caller_skip: usize,
    pub encoder: Option<EncoderConfig>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            development: false,
            level: LevelFilter::INFO,
            caller_skip: 0,
            encoder: None,
        }
    }
}

impl LoggerOptions {
    pub fn development() -> Self {
        Self {
            development: true,
            level: LevelFilter::DEBUG,
            ..Self::default()
        }
    }

    /// Entries at this level or more severe carry a `stacktrace`.
    pub fn stacktrace_level(&self) -> Level {
        if self.development {
            Level::WARN
        } else {
            Level::ERROR
        }
    }

    pub fn effective_encoder(&self) -> EncoderConfig {
        match &self.encoder {
            Some(encoder) => encoder.clone(),
            None if self.development => EncoderConfig::console(),
            None => EncoderConfig::json(),
        }
    }
}

/// Build a source-decorated logger writing to `writer`.
///
/// The stream backend is wrapped exactly once in a [`SourceDecorator`];
/// every logger derived from the result shares that decorator's skip depth.
pub fn build_logger<W>(opts: &LoggerOptions, writer: W) -> Logger
where
    W: Write + Send + 'static,
{
    let backend = StreamSink::new(writer, opts.effective_encoder())
        .with_level(opts.level)
        .with_stacktrace_level(Some(opts.stacktrace_level()));
    let decorated = SourceDecorator::new(Arc::new(backend), opts.caller_skip);
    Logger::new(Arc::new(decorated))
}

/// Cheap, cloneable handle for logging through a [`LogSink`].
///
/// Handles are immutable: [`Logger::with_values`] returns a new handle and
/// leaves the receiver as it was.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Logger { sink }
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Whether `other` logs through the very same sink instance.
    pub fn same_sink(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.sink, &other.sink)
    }

    /// Derive a logger that attaches `fields` to every entry.
    pub fn with_values<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = Field>,
    {
        Logger {
            sink: self.sink.with(fields.into_iter().collect()),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(level)
    }

    /// Emit one entry. Sink failures are reported on standard error; logging
    /// never fails the caller.
    #[track_caller]
    pub fn log<I>(&self, level: Level, message: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        let caller = Caller::from(Location::caller());
        let record = LogRecord::new(level, message).with_caller(Some(caller));
        if !self.sink.check(&record) {
            return;
        }
        if let Err(e) = self.sink.write(&record, fields.into_iter().collect()) {
            eprintln!("error writing log entry: {}", e);
        }
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::TRACE, message, None::<Field>)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message, None::<Field>)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message, None::<Field>)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::WARN, message, None::<Field>)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message, None::<Field>)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
