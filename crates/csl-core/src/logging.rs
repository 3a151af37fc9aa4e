//! Tracing subscriber setup for binaries and drivers embedding the engine.
//!
//! `RUST_LOG` wins when set; otherwise the level from [`LoggingConfig`]
//! applies.

use csl_schema::LoggingConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Install the global subscriber with the default `info` level.
pub fn init() -> Result<(), InitError> {
    init_with(&LoggingConfig::default())
}

/// Install the global subscriber for `config`.
///
/// Fails if a subscriber is already installed or the directive is invalid.
pub fn init_with(config: &LoggingConfig) -> Result<(), InitError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(env.as_deref(), config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_file(true).with_line_number(true).compact())
        .try_init()?;

    tracing::debug!(level = %config.level, "logging initialized");
    Ok(())
}

/// Build the filter from an environment directive, falling back to the
/// configured level when the directive is absent or empty.
fn filter_for(env: Option<&str>, config: &LoggingConfig) -> Result<EnvFilter, ParseError> {
    match env.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_new(&config.level),
    }
}
