use crate::logger::Logger;
use crate::record::{Caller, LogRecord};
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::Level;

/// `log::Log` implementation that redirects records of the `log` facade into
/// a [`LogSink`].
pub struct LogBridge {
    sink: Arc<dyn LogSink>,
}

impl LogBridge {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn for_logger(logger: &Logger) -> Self {
        Self::new(Arc::clone(logger.sink()))
    }
}

/// Map a `log` level onto the `tracing` level the sinks work with.
pub fn to_tracing_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::ERROR,
        log::Level::Warn => Level::WARN,
        log::Level::Info => Level::INFO,
        log::Level::Debug => Level::DEBUG,
        log::Level::Trace => Level::TRACE,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.sink.enabled(to_tracing_level(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(Caller::new(file, line)),
            _ => None,
        };
        let entry = LogRecord::new(to_tracing_level(record.level()), record.args().to_string())
            .with_caller(caller);

        if !self.sink.check(&entry) {
            return;
        }
        if let Err(e) = self.sink.write(&entry, Vec::new()) {
            eprintln!("error writing log record: {}", e);
        }
    }

    fn flush(&self) {}
}

impl std::fmt::Debug for LogBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBridge").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncoderConfig;
    use crate::stream::StreamSink;
    use log::Log;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn levels_map_one_to_one() {
        assert_eq!(to_tracing_level(log::Level::Error), Level::ERROR);
        assert_eq!(to_tracing_level(log::Level::Warn), Level::WARN);
        assert_eq!(to_tracing_level(log::Level::Trace), Level::TRACE);
    }

    #[test]
    fn enablement_follows_sink() {
        let sink = StreamSink::new(std::io::sink(), EncoderConfig::json()).with_level(LevelFilter::WARN);
        let bridge = LogBridge::new(Arc::new(sink));

        let warn = log::Metadata::builder().level(log::Level::Warn).build();
        let info = log::Metadata::builder().level(log::Level::Info).build();
        assert!(bridge.enabled(&warn));
        assert!(!bridge.enabled(&info));
    }
}
