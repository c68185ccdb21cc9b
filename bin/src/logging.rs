//! Tracing subscriber set-up shared by the binaries.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Maps `-v` occurrences to a default level.
pub(crate) const fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the `-v` level when set.
pub(crate) fn init(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level_for(verbose).into())
                .from_env_lossy(),
        )
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        .with_writer(std::io::stderr)
        .init();
}
