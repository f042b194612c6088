pub mod app;
pub mod app_dirs;
pub mod config;
pub mod diff;
pub mod error;
pub mod passages;
pub mod probe;
pub mod report;
pub mod runtime;
pub mod score;
pub mod session;
pub mod splitter;
pub mod ui;

/// Redraw interval of the event loop
pub const TICK_RATE_MS: u64 = 100;
