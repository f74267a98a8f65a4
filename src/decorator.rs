use crate::frame::{BacktraceResolver, FrameResolver};
use crate::record::{Field, LogRecord};
use crate::sink::{LogSink, SinkError};
use std::sync::Arc;
use tracing::Level;

/// [`LogSink`] wrapper that appends the originating call site of every
/// entry as a nested `source` field.
///
/// The decorator is immutable. [`LogSink::with`] derives a new decorator
/// around the derived inner sink, carrying the same resolver and skip depth,
/// so one instance can be shared and derived from any number of threads.
#[derive(Clone)]
pub struct SourceDecorator {
    inner: Arc<dyn LogSink>,
    resolver: Arc<dyn FrameResolver>,
    caller_skip: usize,
}

impl SourceDecorator {
    /// Wrap `inner` using stack introspection through [`BacktraceResolver`].
    ///
    /// **Parameters**
    /// - `inner`: sink receiving the augmented entries.
    /// - `caller_skip`: application frames to ascend past the first
    ///   non-internal frame. `0` reports the function that issued the log
    ///   call; raise it when the host logs through its own helper functions.
    pub fn new(inner: Arc<dyn LogSink>, caller_skip: usize) -> Self {
        Self::with_resolver(inner, Arc::new(BacktraceResolver::new()), caller_skip)
    }

    /// Wrap `inner` with an explicit [`FrameResolver`].
    pub fn with_resolver(
        inner: Arc<dyn LogSink>,
        resolver: Arc<dyn FrameResolver>,
        caller_skip: usize,
    ) -> Self {
        SourceDecorator {
            inner,
            resolver,
            caller_skip,
        }
    }

    pub fn caller_skip(&self) -> usize {
        self.caller_skip
    }
}

impl LogSink for SourceDecorator {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn check(&self, record: &LogRecord) -> bool {
        self.inner.check(record)
    }

    fn write(&self, record: &LogRecord, mut fields: Vec<Field>) -> Result<(), SinkError> {
        let source = self
            .resolver
            .resolve(self.caller_skip)
            .and_then(|frame| frame.into_source(record.caller.as_ref()));
        if let Some(source) = source {
            fields.push(source.into_field());
        }
        self.inner.write(record, fields)
    }

    fn with(&self, fields: Vec<Field>) -> Arc<dyn LogSink> {
        Arc::new(SourceDecorator {
            inner: self.inner.with(fields),
            resolver: Arc::clone(&self.resolver),
            caller_skip: self.caller_skip,
        })
    }
}
