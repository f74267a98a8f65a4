use crate::logger::Logger;
use crate::record::Field;
use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;

pub const TRACE_ID_KEY: &str = "traceid";
pub const SAMPLED_KEY: &str = "sampled";

/// Return a logger enriched with the trace carried by `ctx`.
///
/// When `ctx` holds a valid span context the derived logger attaches
/// `traceid` (32 lowercase hex digits) and `sampled` to every entry.
/// Otherwise `logger` is returned as is. Neither input is modified.
pub fn with_context(ctx: &Context, logger: &Logger) -> Logger {
    let span = ctx.span();
    let span_context = span.span_context();
    if !span_context.is_valid() {
        return logger.clone();
    }
    logger.with_values([
        Field::new(TRACE_ID_KEY, span_context.trace_id().to_string()),
        Field::new(SAMPLED_KEY, span_context.is_sampled()),
    ])
}

/// [`with_context`] against the context attached to the current thread.
pub fn with_current_context(logger: &Logger) -> Logger {
    with_context(&Context::current(), logger)
}
