//! Structured engine logging through an injected sink.

pub mod jsonl;
pub mod sink;

use crate::core::config::Config;
use jsonl::{JsonlConfig, JsonlSink};
use sink::{LogSink, NullSink, StderrSink};

/// Build the sink selected by `config.logging`.
#[must_use]
pub fn sink_from_config(config: &Config) -> Box<dyn LogSink> {
    if config.logging.enabled {
        Box::new(JsonlSink::open(JsonlConfig {
            path: config.paths.jsonl_log.clone(),
            fallback_path: None,
            echo_stderr: config.logging.echo_stderr,
        }))
    } else if config.logging.echo_stderr {
        Box::new(StderrSink)
    } else {
        Box::new(NullSink)
    }
}
