pub mod article;
pub mod batch;
pub mod classify;
pub mod clustering;
pub mod config;
pub mod document;
pub mod engine;
pub mod environment;
pub mod logging;
pub mod pipeline;
pub mod ranking;
pub mod server;
pub mod storage;
pub mod store;
pub mod text;
pub mod util;

pub const TARGET_ENGINE: &str = "engine";
pub const TARGET_PIPELINE: &str = "pipeline";
pub const TARGET_HTTP: &str = "http";
