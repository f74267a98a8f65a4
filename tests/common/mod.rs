#![allow(dead_code)]

use log_enricher::encoder::configure_encoder_to;
use log_enricher::{build_logger, FormatFlag, Logger, LoggerOptions};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// In-memory output stream shared between the logger and the test.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Every output line parsed as a JSON object.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .map(|line| serde_json::from_str(line).expect("log line is not JSON"))
            .collect()
    }
}

/// Production options resolved to JSON, as a host would build them.
pub fn json_options() -> LoggerOptions {
    let mut opts = LoggerOptions::default();
    configure_encoder_to(
        &FormatFlag::explicit("json"),
        &FormatFlag::explicit("json"),
        &mut opts,
        &mut std::io::sink(),
    )
    .unwrap();
    opts
}

pub fn json_logger() -> (Logger, SharedBuffer) {
    let buf = SharedBuffer::default();
    let logger = build_logger(&json_options(), buf.clone());
    (logger, buf)
}

/// Assert the shape of the nested `source` object and return its function.
pub fn assert_source(entry: &serde_json::Value, file_suffix: &str) -> String {
    let source = entry["source"].as_object().expect("missing source field");
    let function = source["function"].as_str().unwrap();
    assert!(!function.is_empty());
    let file = source["file"].as_str().unwrap();
    assert!(file.ends_with(file_suffix), "unexpected source file {}", file);
    assert!(source["line"].as_u64().unwrap() > 0);
    function.to_string()
}
