use env_logger::{Builder, Env};
use std::env;

/// Starts the global logger at `level`. `RUST_LOG` still wins when it is set.
pub fn init_logging(level: &str) {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
