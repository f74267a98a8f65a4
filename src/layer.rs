use crate::logger::Logger;
use crate::record::{Caller, Field, LogRecord};
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that redirects `tracing` events into a
/// [`LogSink`].
///
/// Each enabled event becomes one [`LogRecord`] written synchronously on the
/// calling thread, so a [`SourceDecorator`] behind the sink still sees the
/// original call site on the stack.
///
/// [`SourceDecorator`]: crate::decorator::SourceDecorator
pub struct SinkLayer {
    sink: Arc<dyn LogSink>,
}

impl SinkLayer {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn for_logger(logger: &Logger) -> Self {
        Self::new(Arc::clone(logger.sink()))
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.sink.enabled(*metadata.level())
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let caller = match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => Some(Caller::new(file, line)),
            _ => None,
        };
        let record = LogRecord::new(*meta.level(), message.unwrap_or_default()).with_caller(caller);

        if !self.sink.check(&record) {
            return;
        }
        if let Err(e) = self.sink.write(&record, fields) {
            eprintln!("error writing tracing event: {}", e);
        }
    }
}

/// Collects `tracing` event fields in declaration order, pulling out
/// `message`.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Field>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.push(Field::new(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.fields.push(Field::new(field.name(), value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.fields.push(Field::new(field.name(), value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.fields.push(Field::new(field.name(), value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.fields.push(Field::new(field.name(), value));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(Field::new(field.name(), format!("{:?}", value)));
        }
    }
}
