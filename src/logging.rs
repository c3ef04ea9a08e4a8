//! Tracing setup.
//!
//! The terminal belongs to the editor, so logs only go to a daily rolling
//! file under the data directory. Filtering follows `RUST_LOG`
//! (`RUST_LOG=tsmodal::app=debug`), defaulting to `info`.

use std::fs;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match Config::logs_dir().and_then(|dir| {
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }) {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "tsmodal.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(filter),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {e:#}");
            None
        }
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(file_layer).try_init();
}
