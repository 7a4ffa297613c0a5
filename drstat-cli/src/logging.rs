//! Logging initialization for the drstat CLI.
//!
//! Configures `tracing-subscriber` based on the `[general]` section
//! of `DrstatConfig`. Events are written to stderr so stdout only
//! carries reports.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use drstat_core::config::GeneralConfig;

/// Build the event filter.
///
/// Precedence: `RUST_LOG`, then `level_override` (`--log-level`), then `config.log_level`.
pub fn build_filter(config: &GeneralConfig, level_override: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = level_override.unwrap_or(&config.log_level);
    EnvFilter::try_new(level).map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", level, e))
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable colored output (default)
pub fn init_tracing(config: &GeneralConfig, level_override: Option<&str>) -> Result<()> {
    let env_filter = build_filter(config, level_override)?;

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(())
}
