use log_enricher::init::init_logging;
use log_enricher::Field;
use tracing::{error, info};

/// Run with e.g. `LOG_FORMAT=json LOG_ENCODER=console cargo run --example basic`
/// to see the conflict warning followed by JSON output.
fn main() {
    let logger = match init_logging() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    logger.info("starting service");
    logger.log(
        tracing::Level::WARN,
        "cache miss ratio high",
        [Field::new("ratio", 0.42)],
    );

    info!(port = 8080, "listening");
    error!(user_id = 42, reason = "invalid password", "authentication failed");
    log::info!("message from a dependency using the log crate");
}
