use std::env;

use tracing_appender::{
    non_blocking,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "gitsearch=info,warn";

/// Console output on stderr plus a daily JSON log in `log_dir`. Keep the guard
/// alive for the life of the process or buffered lines are lost.
pub fn setup_logging(log_dir: &str) -> non_blocking::WorkerGuard {
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.into());

    // Results go to stdout, so the console layer stays off it.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_level(true);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "gitsearch.log");
    let (file_writer, guard) = non_blocking(file_appender);
    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_current_span(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
