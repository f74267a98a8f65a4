use log_enricher::{with_context, Field};
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;

mod common;
use common::{assert_source, json_logger};

const WORKERS: u64 = 8;
const PER_WORKER: u64 = 25;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn derived_loggers_are_independent_across_threads() {
    let (logger, buf) = json_logger();

    let mut handles = Vec::new();
    for worker in 0..WORKERS {
        let logger = logger.clone();
        handles.push(tokio::spawn(async move {
            let scoped = logger.with_values([Field::new("worker", worker)]);
            for i in 0..PER_WORKER {
                scoped.log(tracing::Level::INFO, "tick", [Field::new("i", i)]);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let lines = buf.json_lines();
    assert_eq!(lines.len() as u64, WORKERS * PER_WORKER);
    for worker in 0..WORKERS {
        let count = lines.iter().filter(|l| l["worker"] == worker).count() as u64;
        assert_eq!(count, PER_WORKER);
    }
    for line in &lines {
        assert_source(line, "concurrency.rs");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn enrichment_is_per_request() {
    let (logger, buf) = json_logger();

    let mut handles = Vec::new();
    for n in 1..=4u8 {
        let logger = logger.clone();
        handles.push(tokio::spawn(async move {
            let span_context = SpanContext::new(
                TraceId::from_bytes([n; 16]),
                SpanId::from_bytes([n; 8]),
                TraceFlags::SAMPLED,
                true,
                TraceState::default(),
            );
            let ctx = Context::new().with_remote_span_context(span_context);
            with_context(&ctx, &logger).info("request handled");
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    logger.info("background");

    let lines = buf.json_lines();
    assert_eq!(lines.len(), 5);
    let mut trace_ids: Vec<String> = lines
        .iter()
        .filter_map(|l| l["traceid"].as_str().map(str::to_string))
        .collect();
    trace_ids.sort();
    assert_eq!(
        trace_ids,
        (1..=4u8).map(|n| format!("{:02x}", n).repeat(16)).collect::<Vec<_>>()
    );
    assert!(lines.last().unwrap().get("traceid").is_none());
}
