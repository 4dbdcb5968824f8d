//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Reads the filter from `RUST_LOG`; nothing is logged when it is unset.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default level
///
/// `level` is an `env_logger` filter string such as `"info"` or
/// `"native_window=debug"`. `RUST_LOG` still wins when it is set. Calling this
/// twice is harmless; the second call is ignored.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
