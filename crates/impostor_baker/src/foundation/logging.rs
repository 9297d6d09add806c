//! Logging utilities
//!
//! The library only emits through the `log` facade; binaries decide where the
//! records go by calling [`init`].

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system, honouring `RUST_LOG`
///
/// Defaults to `info` for the baker's own targets when `RUST_LOG` is unset.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Initialize logging for tests, ignoring repeated initialization
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
