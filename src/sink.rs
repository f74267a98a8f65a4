use crate::record::{Field, LogRecord};
use std::sync::Arc;
use tracing::Level;

/// Synchronous destination for [`LogRecord`]s.
///
/// This is the capability every backend and every decorator implements.
/// Implementations must be cheap to share: a single sink is typically
/// built at startup and used from every thread for the process lifetime.
pub trait LogSink: Send + Sync {
    /// Whether entries at `level` would be emitted at all.
    fn enabled(&self, level: Level) -> bool;

    /// Whether this particular record is admitted.
    ///
    /// Callers check before building fields so disabled entries cost
    /// nothing. Default implementation only looks at the level.
    fn check(&self, record: &LogRecord) -> bool {
        self.enabled(record.level)
    }

    /// Render or forward a single record together with its call-site fields.
    ///
    /// **Parameters**
    /// - `record`: the entry produced by a [`Logger`] or a facade bridge.
    /// - `fields`: fields supplied at the call site, in order. Keys may
    ///   repeat; the last occurrence wins.
    ///
    /// **Returns**
    /// - `Ok(())` if the entry was accepted.
    /// - `Err(..)` on I/O or serialization failure.
    ///
    /// [`Logger`]: crate::logger::Logger
    fn write(&self, record: &LogRecord, fields: Vec<Field>) -> Result<(), SinkError>;

    /// Derive a new sink that attaches `fields` to every entry it writes.
    ///
    /// The receiver is left untouched.
    fn with(&self, fields: Vec<Field>) -> Arc<dyn LogSink>;
}

/// Error type returned by [`LogSink::write`].
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to write log entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("log output lock poisoned")]
    Poisoned,
}
