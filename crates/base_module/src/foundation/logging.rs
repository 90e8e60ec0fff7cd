//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system at the given level
///
/// The level is a global cap that [`set_level`] can change later, so a host
/// can start logging before its configuration is loaded. `RUST_LOG` module
/// directives still apply underneath it. Safe to call more than once; later
/// calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let installed = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Trace)
        .try_init();

    if installed.is_ok() {
        set_level(level);
    }
}

/// Change the global log level
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Parse a config-style level name ("info", "debug", ...) into a filter
///
/// Unknown names fall back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}
