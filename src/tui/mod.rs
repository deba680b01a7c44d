//! Terminal user interface for browsing messages
//!
//! Built on Ratatui.

mod app;
mod backend;
mod debug_log;
mod help;
mod log_capture;
mod messages;
mod ui;

pub use app::run;
pub use log_capture::LogBuffer;
