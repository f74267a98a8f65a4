//! Process-wide wiring, performed once by the host.
//!
//! Nothing here runs implicitly: building a [`Logger`] never touches global
//! state. A host opts into redirecting the `tracing` and `log` facades by
//! calling these functions during startup.

use crate::encoder::{configure_encoder, ConfigError};
use crate::env::FormatFlags;
use crate::layer::SinkLayer;
use crate::logger::{build_logger, Logger, LoggerOptions};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error type returned by the wiring functions.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("global tracing subscriber already set: {0}")]
    Tracing(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("global logger already set: {0}")]
    Log(#[from] log::SetLoggerError),
}

/// Install a [`Registry`] with a [`SinkLayer`] for `logger` as the global
/// default `tracing` subscriber.
pub fn install_tracing(logger: &Logger) -> Result<(), InitError> {
    let subscriber = Registry::default().with(SinkLayer::for_logger(logger));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Install a [`LogBridge`](crate::log_bridge::LogBridge) for `logger` as the
/// global `log` logger.
pub fn install_log_bridge(logger: &Logger, max_level: log::LevelFilter) -> Result<(), InitError> {
    log::set_boxed_logger(Box::new(crate::log_bridge::LogBridge::for_logger(logger)))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Configure from the environment, build a logger on standard error and
/// redirect both facades into it.
///
/// **Errors**
/// - [`InitError::Config`] for an unsupported explicit format; nothing has
///   been installed at that point.
/// - [`InitError::Tracing`] / `InitError::Log` when a global logger was
///   already installed.
pub fn init_logging() -> Result<Logger, InitError> {
    let flags = FormatFlags::from_env();
    let mut opts = LoggerOptions::from_env();
    configure_encoder(&flags.format, &flags.legacy_encoder, &mut opts)?;

    let logger = build_logger(&opts, std::io::stderr());
    install_tracing(&logger)?;
    install_log_bridge(&logger, to_log_filter(opts.level))?;
    Ok(logger)
}

fn to_log_filter(level: LevelFilter) -> log::LevelFilter {
    match level.into_level() {
        None => log::LevelFilter::Off,
        Some(level) if level == Level::ERROR => log::LevelFilter::Error,
        Some(level) if level == Level::WARN => log::LevelFilter::Warn,
        Some(level) if level == Level::INFO => log::LevelFilter::Info,
        Some(level) if level == Level::DEBUG => log::LevelFilter::Debug,
        Some(_) => log::LevelFilter::Trace,
    }
}
