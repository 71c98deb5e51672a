pub mod config;
pub mod logging;
pub mod output;
pub mod race;
pub mod scoring;
pub mod stderr_buffer;
pub mod tui;
