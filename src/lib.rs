pub mod app;
pub mod audio;
pub mod config;
pub mod dataset;
pub mod error;
pub mod navigator;
pub mod playback;
pub mod prompts;
pub mod session;
pub mod store;
mod telemetry;
pub mod terminal_restore;

pub use telemetry::{init_tracing, trace_log_path};
