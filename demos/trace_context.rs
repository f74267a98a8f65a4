use log_enricher::{build_logger, configure_encoder, with_context, FormatFlag, LoggerOptions};
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;

fn main() {
    let mut opts = LoggerOptions::default();
    if let Err(e) = configure_encoder(
        &FormatFlag::explicit("json"),
        &FormatFlag::defaulted("console"),
        &mut opts,
    ) {
        eprintln!("invalid log format: {}", e);
        std::process::exit(1);
    }
    let logger = build_logger(&opts, std::io::stdout());

    let span_context = SpanContext::new(
        TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap_or(TraceId::INVALID),
        SpanId::from_hex("00f067aa0ba902b7").unwrap_or(SpanId::INVALID),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    let ctx = Context::new().with_remote_span_context(span_context);

    let request_logger = with_context(&ctx, &logger);
    request_logger.info("handling request");
    logger.info("no trace attached");
}
