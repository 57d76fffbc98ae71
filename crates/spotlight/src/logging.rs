//! Logging initialization.
//!
//! Logs go to stderr through `tracing-subscriber`; stdout carries only the
//! report. `RUST_LOG` overrides the level chosen here.

use spotlight_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: String,
    json: bool,
}

impl LogSettings {
    /// Merge config with CLI flags; the flags only ever raise verbosity or
    /// switch to JSON.
    fn resolve(config: &LoggingConfig, verbose: bool, json_logs: bool) -> Self {
        let level = if verbose && !matches!(config.level.as_str(), "debug" | "trace") {
            "debug".to_string()
        } else {
            config.level.clone()
        };
        Self {
            level,
            json: json_logs || config.format == "json",
        }
    }
}

/// Install the global subscriber.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` section plus CLI overrides.
pub fn init_from_config(config: &spotlight_core::Config, verbose: bool, json_logs: bool) {
    let settings = LogSettings::resolve(&config.logging, verbose, json_logs);
    init(&settings.level, settings.json);
}
