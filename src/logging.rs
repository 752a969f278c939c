use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

// RUST_LOG, when set, replaces these
const STDOUT_FILTER: &str = "info,engine=info,pipeline=warn,http=info,classify=warn";
const FILE_FILTER: &str = "info,engine=debug,pipeline=debug,http=debug,classify=debug";
const STDERR_FILTER: &str = "warn,engine=info";

fn env_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Server logging: stdout plus a daily rolling file under `logs/`.
pub fn configure_logging() {
    // Stdout log configuration
    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(env_or(STDOUT_FILTER));

    // File log configuration
    let file_appender = rolling::daily("logs", "newsthreads.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(env_or(FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}

/// Batch command logging: stderr only, so stdout carries nothing but JSON.
pub fn configure_cli_logging() {
    let stderr_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(env_or(STDERR_FILTER));

    tracing_subscriber::Registry::default()
        .with(stderr_log)
        .init();
}
