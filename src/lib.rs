pub mod record;
pub mod sink;
pub mod frame;
pub mod decorator;
pub mod encoder;
pub mod stream;
pub mod logger;
pub mod trace;
pub mod layer;
pub mod log_bridge;

pub mod env;
pub mod init;
pub mod noop_sink;

pub use decorator::SourceDecorator;
pub use encoder::{configure_encoder, resolve, ConfigError, EncoderConfig, FormatFlag, LogFormat};
pub use frame::{Frame, FrameResolver};
pub use logger::{build_logger, Logger, LoggerOptions};
pub use record::{Field, LogRecord, SourceMetadata};
pub use sink::{LogSink, SinkError};
pub use trace::with_context;
