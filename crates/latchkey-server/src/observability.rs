//! Tracing setup.
//!
//! The configured `logging.level` applies to the latchkey crates and to the
//! HTTP trace layer. Everything else (hyper, tokio internals) stays at
//! `warn` so request logs are not drowned out. `RUST_LOG`, when set,
//! replaces these directives entirely.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Targets that follow the configured level.
const APP_TARGETS: [&str; 3] = ["latchkey_auth", "latchkey_server", "tower_http"];

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Applies the configured level once the config file has been read.
///
/// Does nothing when `RUST_LOG` is set.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let directives = filter_directives(level);
        if handle.modify(|f| *f = EnvFilter::new(&directives)).is_ok() {
            tracing::debug!(%directives, "Log filter updated");
        }
    }
}

/// Builds the filter directives for `level`.
fn filter_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    if level == "off" {
        return level;
    }
    let mut directives = String::from("warn");
    for target in APP_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}
