use crate::record::{Field, LogRecord};
use crate::sink::{LogSink, SinkError};
use std::sync::Arc;
use tracing::Level;

/// A sink that admits every entry and drops it.
///
/// Useful for measuring the overhead of source resolution without any
/// output I/O, and for tests that don't care about rendering.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn write(&self, _record: &LogRecord, _fields: Vec<Field>) -> Result<(), SinkError> {
        Ok(())
    }

    fn with(&self, _fields: Vec<Field>) -> Arc<dyn LogSink> {
        Arc::new(NoopSink)
    }
}
