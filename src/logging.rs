use std::io::IsTerminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::stderr_buffer;

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// Output goes through `stderr_buffer`, so anything logged while the TUI
/// owns the terminal shows up after it exits.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "furlong=debug" } else { "furlong=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(stderr_buffer::writer)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time();

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
